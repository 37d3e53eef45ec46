//! Turn-boundary condition resolution.
//!
//! After an action, the entity that just acted takes at most one tick of its
//! condition (poison, fire or regeneration) and the entity about to act is
//! checked for stun.

use crate::battle::state::{BattleEvent, EventBus, TurnRng};
use crate::config::BattleConfig;
use crate::entity::Entity;
use crate::skills::randomized_with_offset;
use schema::{ConditionKind, Side};

#[derive(Debug, Clone, Default)]
pub struct ConditionReport {
    pub events: EventBus,
    /// Whether any condition fired. Drives the `CheckAbnormalCondition` state.
    pub triggered: bool,
}

pub fn poison_damage(hit_point: i32, rate_percent: i32) -> i32 {
    (hit_point * rate_percent).div_euclid(100)
}

pub fn resolve_turn_boundary(
    entities: &mut [Entity; 2],
    acting: Side,
    waiting: Side,
    config: &BattleConfig,
    rng: &mut TurnRng,
) -> ConditionReport {
    let mut report = ConditionReport::default();

    let actor = &mut entities[acting.to_index()];
    let kind = actor.condition().kind;
    let change = match kind {
        ConditionKind::Poison => {
            let damage = poison_damage(actor.hit_point(), config.poison_rate_percent);
            Some((damage, actor.set_hit_point(actor.hit_point() - damage)))
        }
        ConditionKind::Fire => {
            let fire = config.fire;
            let damage =
                randomized_with_offset(fire.base, fire.offset_percent, fire.miss_percent, rng);
            Some((damage, actor.set_hit_point(actor.hit_point() - damage)))
        }
        ConditionKind::Regen => {
            let regen = config.regen;
            let amount =
                randomized_with_offset(regen.base, regen.offset_percent, regen.miss_percent, rng);
            Some((amount, actor.set_hit_point(actor.hit_point() + amount)))
        }
        // Stun is consumed when its owner's turn starts.
        ConditionKind::Stun | ConditionKind::None => None,
    };

    if let Some((amount, change)) = change {
        tracing::debug!(side = %acting, ?kind, amount, "condition ticked");
        report.events.push(BattleEvent::ConditionTriggered {
            side: acting,
            kind,
            amount,
        });
        report.events.push(BattleEvent::StateChanged {
            side: acting,
            change,
        });
        report.triggered = true;
    }

    if entities[waiting.to_index()].condition().kind == ConditionKind::Stun {
        report.events.push(BattleEvent::StunPending { side: waiting });
        report.triggered = true;
    }

    report
}
