//! Presentation-side helpers: the flip-driven log queue, effect cues and the
//! in-flight animation counter that gates log advancement.

use crate::battle::state::{BattleEvent, SideNames};
use crate::config::TimingConfig;
use crate::skills::Skill;
use schema::{ConditionKind, EffectKey, Side, SkillCategory};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// FIFO of log lines. Lines are shown one at a time, only on `flip`.
#[derive(Debug, Clone, Default)]
pub struct BattleLog {
    queued: VecDeque<String>,
    current: Option<String>,
}

impl BattleLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, line: impl Into<String>) {
        self.queued.push_back(line.into());
    }

    /// Queues the rendered lines of every event, in order.
    pub fn push_events(&mut self, events: &[BattleEvent], names: &impl SideNames) {
        for event in events {
            self.queued.extend(event.log_lines(names));
        }
    }

    /// Advances to the next queued line and returns it.
    pub fn flip(&mut self) -> Option<&str> {
        self.current = self.queued.pop_front();
        self.current.as_deref()
    }

    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    pub fn pending(&self) -> usize {
        self.queued.len()
    }

    pub fn is_drained(&self) -> bool {
        self.queued.is_empty()
    }
}

/// What to play and where.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EffectCue {
    pub effect: EffectKey,
    pub target: Side,
}

/// Derives the effect cues for a batch of events.
pub fn effect_cues(events: &[BattleEvent]) -> Vec<EffectCue> {
    events
        .iter()
        .filter_map(|event| match *event {
            BattleEvent::Attacked {
                defender, damage, ..
            } => Some(EffectCue {
                effect: if damage == 0 {
                    EffectKey::Dodge
                } else {
                    EffectKey::Slash
                },
                target: defender,
            }),
            BattleEvent::SkillUsed {
                user, skill, effect, ..
            } => {
                let target = match Skill::get(skill).category {
                    SkillCategory::Damage => user.opponent(),
                    SkillCategory::Heal | SkillCategory::Buff => user,
                };
                Some(EffectCue { effect, target })
            }
            BattleEvent::ConditionTriggered { side, kind, .. } => {
                let effect = match kind {
                    ConditionKind::Poison => EffectKey::Poisoned,
                    ConditionKind::Fire => EffectKey::Burning,
                    ConditionKind::Regen => EffectKey::Regenerating,
                    ConditionKind::Stun | ConditionKind::None => return None,
                };
                Some(EffectCue {
                    effect,
                    target: side,
                })
            }
            BattleEvent::StunPending { side } | BattleEvent::TurnSkipped { side } => {
                Some(EffectCue {
                    effect: EffectKey::Stunned,
                    target: side,
                })
            }
            _ => None,
        })
        .collect()
}

/// Counts value-change animations in flight. Clones share the counter.
#[derive(Debug, Clone, Default)]
pub struct AnimationTracker {
    in_flight: Arc<AtomicUsize>,
}

impl AnimationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers one animation. It counts until the guard drops.
    pub fn begin(&self) -> AnimationGuard {
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        AnimationGuard {
            in_flight: Arc::clone(&self.in_flight),
        }
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    pub fn is_settled(&self) -> bool {
        self.in_flight() == 0
    }
}

#[derive(Debug)]
pub struct AnimationGuard {
    in_flight: Arc<AtomicUsize>,
}

impl Drop for AnimationGuard {
    fn drop(&mut self) {
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Polls until no animation is in flight.
pub async fn wait_until_settled(tracker: &AnimationTracker, poll_interval: Duration) {
    while !tracker.is_settled() {
        tokio::time::sleep(poll_interval).await;
    }
}

/// Waits out the post-action delay, then for animations to settle. The log
/// may be flipped once this returns.
pub async fn flip_gate(tracker: &AnimationTracker, timing: &TimingConfig) {
    tokio::time::sleep(timing.post_action_delay()).await;
    wait_until_settled(tracker, timing.poll_interval()).await;
    tracing::trace!("flip gate open");
}
