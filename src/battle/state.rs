use crate::battle::rewards::{RewardKind, RewardOption};
use crate::entity::{Entity, StateChange};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use schema::{ConditionKind, EffectKey, Side, SkillId};
use serde::{Deserialize, Serialize};

/// Top-level battle state machine status.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BattleStatus {
    /// The acting entity has to submit an attack or skill.
    BeforeAction,
    /// An action resolved; waiting for presentation before the win check.
    AfterAction,
    /// A turn-boundary condition fired; waiting for presentation.
    CheckAbnormalCondition,
    LeftWin,
    RightWin,
    /// The final boss was defeated. Terminal.
    GameClear,
    /// Waiting for the winning player to pick a reward.
    SelectReward,
    /// Battle over, entities go back to the field. Terminal.
    BattleEnding,
}

impl BattleStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, BattleStatus::GameClear | BattleStatus::BattleEnding)
    }
}

/// Identifier of one battle session, unique within its field.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(pub u64);

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum BattleEvent {
    // Turn Management
    TurnStarted {
        turn_count: u32,
        acting: Side,
    },
    TurnSkipped {
        side: Side,
    },

    // Actions
    Attacked {
        attacker: Side,
        defender: Side,
        damage: i32,
    },
    SkillUsed {
        user: Side,
        skill: SkillId,
        effect: EffectKey,
        logs: Vec<String>,
    },
    StateChanged {
        side: Side,
        change: StateChange,
    },

    // Turn-boundary conditions
    ConditionTriggered {
        side: Side,
        kind: ConditionKind,
        amount: i32,
    },
    StunPending {
        side: Side,
    },

    // Battle End
    BattleDecided {
        status: BattleStatus,
        winner: Side,
        loser: Side,
    },
    RewardOffered {
        winner: Side,
        options: Vec<RewardOption>,
    },
    RewardSelected {
        winner: Side,
        option: RewardOption,
    },
    BattleEnded {
        status: BattleStatus,
    },
}

/// Resolves a side to the display name of the entity occupying it.
pub trait SideNames {
    fn side_name(&self, side: Side) -> &str;
}

impl BattleEvent {
    /// Formats the event into the log lines shown one at a time on flip.
    /// Silent events return no lines.
    pub fn log_lines(&self, names: &impl SideNames) -> Vec<String> {
        match self {
            BattleEvent::TurnStarted { turn_count, acting } => {
                vec![format!(
                    "=== Turn {} : {} ===",
                    turn_count + 1,
                    names.side_name(*acting)
                )]
            }
            BattleEvent::TurnSkipped { side } => {
                vec![format!("{} is stunned and cannot move!", names.side_name(*side))]
            }
            BattleEvent::Attacked {
                attacker,
                defender,
                damage,
            } => {
                if *damage == 0 {
                    vec![format!("{} dodged the attack!", names.side_name(*defender))]
                } else {
                    vec![format!(
                        "{} attacked {} for {} damage!",
                        names.side_name(*attacker),
                        names.side_name(*defender),
                        damage
                    )]
                }
            }
            BattleEvent::SkillUsed {
                user, skill, logs, ..
            } => {
                let mut lines = vec![format!("{} used {}!", names.side_name(*user), skill)];
                lines.extend(logs.iter().cloned());
                lines
            }
            BattleEvent::StateChanged { .. } => Vec::new(), // Silent - rendered as animation
            BattleEvent::ConditionTriggered { side, kind, amount } => {
                let name = names.side_name(*side);
                match (kind, *amount) {
                    (ConditionKind::Poison, amount) => {
                        vec![format!("{} is hurt by poison! ({} damage)", name, amount)]
                    }
                    (ConditionKind::Fire, 0) => vec![format!("{} shrugged off the flames.", name)],
                    (ConditionKind::Fire, amount) => {
                        vec![format!("{} is burned for {} damage!", name, amount)]
                    }
                    (ConditionKind::Regen, 0) => {
                        vec![format!("{}'s regeneration faltered.", name)]
                    }
                    (ConditionKind::Regen, amount) => {
                        vec![format!("{} regenerated {} HP!", name, amount)]
                    }
                    (ConditionKind::Stun, _) | (ConditionKind::None, _) => Vec::new(),
                }
            }
            BattleEvent::StunPending { side } => {
                vec![format!(
                    "{} is stunned and will lose the next turn!",
                    names.side_name(*side)
                )]
            }
            BattleEvent::BattleDecided {
                status,
                winner,
                loser,
            } => {
                let winner_name = names.side_name(*winner);
                let loser_name = names.side_name(*loser);
                if *status == BattleStatus::GameClear {
                    vec![format!("{} defeated the final boss {}!", winner_name, loser_name)]
                } else {
                    vec![format!("{} defeated {}!", winner_name, loser_name)]
                }
            }
            BattleEvent::RewardOffered { winner, options } => {
                let mut lines = vec![format!("{} may choose a reward:", names.side_name(*winner))];
                for (i, option) in options.iter().enumerate() {
                    let marker = if option.enabled { "" } else { " (already known)" };
                    lines.push(format!("  {}. {}{}", i + 1, option.kind, marker));
                }
                lines
            }
            BattleEvent::RewardSelected { winner, option } => {
                let name = names.side_name(*winner);
                match option.kind {
                    RewardKind::StatusBoost {
                        hit_point,
                        mana_point,
                    } => vec![format!(
                        "{} gained {} HP and {} MP!",
                        name, hit_point, mana_point
                    )],
                    RewardKind::Skill(skill) => vec![format!("{} learned {}!", name, skill)],
                }
            }
            BattleEvent::BattleEnded { status } => match status {
                BattleStatus::GameClear => {
                    vec!["The final boss has fallen. Game clear!".to_string()]
                }
                _ => vec!["The battle is over.".to_string()],
            },
        }
    }
}

/// Event bus for collecting battle events in application order.
#[derive(Debug, Clone, Default)]
pub struct EventBus {
    events: Vec<BattleEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn push(&mut self, event: BattleEvent) {
        self.events.push(event);
    }

    pub fn extend(&mut self, other: EventBus) {
        self.events.extend(other.events);
    }

    pub fn events(&self) -> &[BattleEvent] {
        &self.events
    }

    pub fn into_events(self) -> Vec<BattleEvent> {
        self.events
    }

    /// All log lines of all events, in order.
    pub fn log_lines(&self, names: &impl SideNames) -> Vec<String> {
        self.events.iter().flat_map(|e| e.log_lines(names)).collect()
    }

    /// Emit every event at debug level, prefixed by `message`.
    pub fn trace_debug(&self, message: &str) {
        tracing::debug!(events = self.events.len(), "{}", message);
        for event in &self.events {
            tracing::debug!(?event, "  event");
        }
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }
}

impl std::fmt::Display for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for event in &self.events {
            writeln!(f, "  {:?}", event)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
enum RngSource {
    Seeded(StdRng),
    Scripted { outcomes: Vec<i32>, index: usize },
}

/// The single source of randomness for a battle.
///
/// Scripted outcomes are returned verbatim (clamped into the requested range)
/// so tests can force exact rolls.
#[derive(Debug, Clone)]
pub struct TurnRng {
    source: RngSource,
}

impl TurnRng {
    pub fn new_for_test(outcomes: Vec<i32>) -> Self {
        Self {
            source: RngSource::Scripted { outcomes, index: 0 },
        }
    }

    /// Reproducible stream for a given seed.
    pub fn seeded(seed: u64) -> Self {
        Self {
            source: RngSource::Seeded(StdRng::seed_from_u64(seed)),
        }
    }

    pub fn new_random() -> Self {
        Self {
            source: RngSource::Seeded(StdRng::from_os_rng()),
        }
    }

    /// Uniform integer in `[low, high]`. An empty range collapses to `low`,
    /// but a draw is still consumed.
    pub fn range_inclusive(&mut self, low: i32, high: i32, reason: &str) -> i32 {
        let high = high.max(low);
        let outcome = match &mut self.source {
            RngSource::Seeded(rng) => rng.random_range(low..=high),
            RngSource::Scripted { outcomes, index } => {
                if *index >= outcomes.len() {
                    panic!(
                        "TurnRng exhausted! Tried to get a value for: '{}'. \
                         Need more random values.",
                        reason
                    );
                }
                let outcome = outcomes[*index];
                *index += 1;
                outcome.clamp(low, high)
            }
        };
        tracing::trace!(reason, low, high, outcome, "rng draw");
        outcome
    }

    /// Uniform index into a collection of `len` items. `len` must be non-zero.
    pub fn pick_index(&mut self, len: usize, reason: &str) -> usize {
        let last = len.saturating_sub(1) as i32;
        self.range_inclusive(0, last, reason) as usize
    }
}

/// Serializable view of a session, carried by replication messages.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub session_id: SessionId,
    pub status: BattleStatus,
    pub turn_count: u32,
    pub acting: Option<Side>,
    pub entities: [Entity; 2],
}

impl SessionSnapshot {
    pub fn entity(&self, side: Side) -> &Entity {
        &self.entities[side.to_index()]
    }
}

impl SideNames for SessionSnapshot {
    fn side_name(&self, side: Side) -> &str {
        self.entities[side.to_index()].name()
    }
}

#[cfg(test)]
mod event_formatting_tests {
    use super::*;
    use crate::entity::EntityId;
    use pretty_assertions::assert_eq;

    struct Names;

    impl SideNames for Names {
        fn side_name(&self, side: Side) -> &str {
            match side {
                Side::Left => "Hero",
                Side::Right => "Wolf",
            }
        }
    }

    #[test]
    fn test_attack_lines_distinguish_hits_and_dodges() {
        let hit = BattleEvent::Attacked {
            attacker: Side::Left,
            defender: Side::Right,
            damage: 10,
        };
        let dodge = BattleEvent::Attacked {
            attacker: Side::Left,
            defender: Side::Right,
            damage: 0,
        };
        assert_eq!(hit.log_lines(&Names), vec!["Hero attacked Wolf for 10 damage!"]);
        assert_eq!(dodge.log_lines(&Names), vec!["Wolf dodged the attack!"]);
    }

    #[test]
    fn test_state_changes_are_silent() {
        let event = BattleEvent::StateChanged {
            side: Side::Left,
            change: StateChange::HitPoint {
                entity: EntityId(1),
                old: 5,
                new: 3,
            },
        };
        assert!(event.log_lines(&Names).is_empty());
    }

    #[test]
    fn test_skill_lines_keep_order() {
        let event = BattleEvent::SkillUsed {
            user: Side::Right,
            skill: SkillId::PoisonMushroom,
            effect: EffectKey::Spores,
            logs: vec!["first".to_string(), "second".to_string()],
        };
        assert_eq!(
            event.log_lines(&Names),
            vec!["Wolf used Poison Mushroom!", "first", "second"]
        );
    }

    #[test]
    fn test_event_bus_collects_lines() {
        let mut bus = EventBus::new();
        bus.push(BattleEvent::TurnStarted {
            turn_count: 0,
            acting: Side::Left,
        });
        bus.push(BattleEvent::TurnSkipped { side: Side::Left });
        assert_eq!(bus.len(), 2);
        assert_eq!(
            bus.log_lines(&Names),
            vec!["=== Turn 1 : Hero ===", "Hero is stunned and cannot move!"]
        );
        assert!(format!("{}", bus).contains("TurnSkipped"));
    }

    #[test]
    fn test_seeded_rng_is_reproducible() {
        let mut a = TurnRng::seeded(7);
        let mut b = TurnRng::seeded(7);
        let xs: Vec<i32> = (0..16).map(|_| a.range_inclusive(0, 99, "a")).collect();
        let ys: Vec<i32> = (0..16).map(|_| b.range_inclusive(0, 99, "b")).collect();
        assert_eq!(xs, ys);
    }

    #[test]
    #[should_panic(expected = "TurnRng exhausted")]
    fn test_scripted_rng_panics_when_exhausted() {
        let mut rng = TurnRng::new_for_test(vec![1]);
        rng.range_inclusive(0, 10, "first");
        rng.range_inclusive(0, 10, "second");
    }
}
