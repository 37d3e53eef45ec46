//! Skill registry: a fixed table mapping each `SkillId` to its cost, category
//! and effect recipe, plus the variance function every amount goes through.

use crate::battle::state::TurnRng;
use crate::entity::{Entity, StateChange};
use schema::{ConditionKind, EffectKey, SkillCategory, SkillId};
use serde::{Deserialize, Serialize};

/// Rolls a value around `base` with a miss chance.
///
/// The roll is drawn first and the miss check second; both draws are always
/// consumed so scripted outcomes line up. Returns 0 on a miss, otherwise a
/// value in `[max(1, base - offset), base + offset]`.
pub fn randomized_with_offset(
    base: i32,
    offset_percent: i32,
    miss_percent: i32,
    rng: &mut TurnRng,
) -> i32 {
    let offset = (base * offset_percent).div_euclid(100);
    let low = (base - offset).max(1);
    let high = base + offset;
    let roll = rng.range_inclusive(low, high, "variance roll").max(1);
    if rng.range_inclusive(0, 99, "miss check") < miss_percent {
        0
    } else {
        roll
    }
}

/// What a skill did: log lines in display order, a presentation key and the
/// state changes in application order.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SkillResult {
    pub skill: SkillId,
    pub logs: Vec<String>,
    pub effect: EffectKey,
    pub changes: Vec<StateChange>,
}

impl SkillResult {
    fn new(skill: SkillId, effect: EffectKey) -> Self {
        Self {
            skill,
            logs: Vec::new(),
            effect,
            changes: Vec::new(),
        }
    }

    fn log(&mut self, line: String) {
        self.logs.push(line);
    }

    fn change(&mut self, change: StateChange) {
        self.changes.push(change);
    }
}

type SkillAction = fn(&mut Entity, &mut Entity, &mut TurnRng, &mut SkillResult);

/// Immutable skill definition.
#[derive(Clone, Copy)]
pub struct Skill {
    pub id: SkillId,
    pub description: &'static str,
    pub mana_cost: i32,
    pub category: SkillCategory,
    action: SkillAction,
}

impl std::fmt::Debug for Skill {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Skill")
            .field("id", &self.id)
            .field("mana_cost", &self.mana_cost)
            .field("category", &self.category)
            .finish()
    }
}

impl Skill {
    /// Looks up the definition for a skill identifier.
    pub fn get(id: SkillId) -> Skill {
        let (description, mana_cost, category, action): (&str, i32, SkillCategory, SkillAction) =
            match id {
                SkillId::Heal => ("Restores a little HP.", 3, SkillCategory::Heal, heal),
                SkillId::SuperHeal => ("Restores a lot of HP.", 6, SkillCategory::Heal, super_heal),
                SkillId::Bite => ("A cheap, vicious bite.", 1, SkillCategory::Damage, bite),
                SkillId::Ignition => (
                    "Deals damage and sets the target on fire.",
                    2,
                    SkillCategory::Damage,
                    ignition,
                ),
                SkillId::Drain => (
                    "Deals damage and recovers HP from it.",
                    3,
                    SkillCategory::Damage,
                    drain,
                ),
                SkillId::Destroy => (
                    "A reckless blow that often misses.",
                    8,
                    SkillCategory::Damage,
                    destroy,
                ),
                SkillId::Strike => (
                    "Deals damage and stuns the target.",
                    3,
                    SkillCategory::Damage,
                    strike,
                ),
                SkillId::PoisonMushroom => (
                    "Deals light damage and poisons the target.",
                    2,
                    SkillCategory::Damage,
                    poison_mushroom,
                ),
                SkillId::Regen => (
                    "Regenerates HP at the end of each turn.",
                    4,
                    SkillCategory::Buff,
                    regen,
                ),
                SkillId::Training => (
                    "Raises power for the rest of the battle.",
                    3,
                    SkillCategory::Buff,
                    training,
                ),
            };
        Skill {
            id,
            description,
            mana_cost,
            category,
            action,
        }
    }

    pub fn name(&self) -> &'static str {
        self.id.display_name()
    }

    pub fn is_affordable_by(&self, entity: &Entity) -> bool {
        entity.mana_point() >= self.mana_cost
    }

    /// Deducts the mana cost and runs the effect recipe. An unaffordable skill
    /// fizzles without spending mana; callers are expected to check first.
    pub fn invoke(
        &self,
        actor: &mut Entity,
        target: &mut Entity,
        rng: &mut TurnRng,
    ) -> SkillResult {
        if !self.is_affordable_by(actor) {
            let mut result = SkillResult::new(self.id, EffectKey::Fizzle);
            result.log(format!(
                "{} tried to use {}, but lacked the mana!",
                actor.name(),
                self.name()
            ));
            return result;
        }

        let mut result = SkillResult::new(self.id, EffectKey::Fizzle);
        result.change(actor.set_mana_point(actor.mana_point() - self.mana_cost));
        (self.action)(actor, target, rng, &mut result);
        tracing::debug!(
            skill = ?self.id,
            actor = %actor.id(),
            effect = ?result.effect,
            "skill resolved"
        );
        result
    }
}

// --- Effect recipes ---

fn restore(actor: &mut Entity, base: i32, miss: i32, rng: &mut TurnRng, result: &mut SkillResult) {
    let amount = randomized_with_offset(base, 30, miss, rng);
    if amount == 0 {
        result.effect = EffectKey::Fizzle;
        result.log(format!("{} tried to heal, but nothing happened.", actor.name()));
        return;
    }
    result.effect = EffectKey::Heal;
    result.change(actor.set_hit_point(actor.hit_point() + amount));
    result.log(format!("{} recovered {} HP!", actor.name(), amount));
}

fn heal(actor: &mut Entity, _target: &mut Entity, rng: &mut TurnRng, result: &mut SkillResult) {
    restore(actor, 15, 10, rng, result);
}

fn super_heal(
    actor: &mut Entity,
    _target: &mut Entity,
    rng: &mut TurnRng,
    result: &mut SkillResult,
) {
    restore(actor, 35, 5, rng, result);
}

/// Shared damage step. Returns the dealt damage, 0 on a miss.
fn strike_target(
    actor: &Entity,
    target: &mut Entity,
    base: i32,
    miss: i32,
    rng: &mut TurnRng,
    result: &mut SkillResult,
) -> i32 {
    let damage = randomized_with_offset(base, 50, miss, rng);
    if damage == 0 {
        result.effect = EffectKey::Dodge;
        result.log(format!(
            "{} dodged {}'s {}!",
            target.name(),
            actor.name(),
            result.skill.display_name()
        ));
        return 0;
    }
    result.change(target.set_hit_point(target.hit_point() - damage));
    result.log(format!(
        "{}'s {} dealt {} damage to {}!",
        actor.name(),
        result.skill.display_name(),
        damage,
        target.name()
    ));
    damage
}

fn bite(actor: &mut Entity, target: &mut Entity, rng: &mut TurnRng, result: &mut SkillResult) {
    if strike_target(actor, target, actor.attack_power() + 2, 20, rng, result) > 0 {
        result.effect = EffectKey::Bite;
    }
}

fn ignition(actor: &mut Entity, target: &mut Entity, rng: &mut TurnRng, result: &mut SkillResult) {
    if strike_target(actor, target, actor.attack_power(), 30, rng, result) > 0 {
        result.effect = EffectKey::Flame;
        result.change(target.inflict(ConditionKind::Fire));
        result.log(format!("{} caught fire!", target.name()));
    }
}

fn drain(actor: &mut Entity, target: &mut Entity, rng: &mut TurnRng, result: &mut SkillResult) {
    let damage = strike_target(actor, target, actor.attack_power(), 20, rng, result);
    if damage == 0 {
        return;
    }
    result.effect = EffectKey::Drain;
    let recovered = randomized_with_offset((damage / 2).max(1), 20, 0, rng);
    result.change(actor.set_hit_point(actor.hit_point() + recovered));
    result.log(format!("{} absorbed {} HP!", actor.name(), recovered));
}

fn destroy(actor: &mut Entity, target: &mut Entity, rng: &mut TurnRng, result: &mut SkillResult) {
    if strike_target(actor, target, actor.attack_power() * 2, 40, rng, result) > 0 {
        result.effect = EffectKey::Explosion;
    }
}

fn strike(actor: &mut Entity, target: &mut Entity, rng: &mut TurnRng, result: &mut SkillResult) {
    if strike_target(actor, target, actor.attack_power(), 40, rng, result) > 0 {
        result.effect = EffectKey::Impact;
        result.change(target.inflict(ConditionKind::Stun));
        result.log(format!("{} is stunned!", target.name()));
    }
}

fn poison_mushroom(
    actor: &mut Entity,
    target: &mut Entity,
    rng: &mut TurnRng,
    result: &mut SkillResult,
) {
    let base = (actor.attack_power() / 2).max(1);
    if strike_target(actor, target, base, 20, rng, result) > 0 {
        result.effect = EffectKey::Spores;
        result.change(target.inflict(ConditionKind::Poison));
        result.log(format!("{} was poisoned!", target.name()));
    }
}

fn regen(actor: &mut Entity, _target: &mut Entity, rng: &mut TurnRng, result: &mut SkillResult) {
    if randomized_with_offset(1, 0, 10, rng) == 0 {
        result.log(format!("{}'s body refused to regenerate.", actor.name()));
        return;
    }
    result.effect = EffectKey::Sparkle;
    result.change(actor.inflict(ConditionKind::Regen));
    result.log(format!("{} began to regenerate!", actor.name()));
}

fn training(actor: &mut Entity, _target: &mut Entity, rng: &mut TurnRng, result: &mut SkillResult) {
    let gain = randomized_with_offset(5, 40, 10, rng);
    if gain == 0 {
        result.log(format!("{} trained, but learned nothing.", actor.name()));
        return;
    }
    result.effect = EffectKey::PowerUp;
    let kind = actor.condition().kind;
    result.change(actor.set_abnormal_condition(kind, gain));
    result.log(format!("{}'s power rose by {}!", actor.name(), gain));
}
