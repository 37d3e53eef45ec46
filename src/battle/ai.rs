//! A module for defining AI behaviors for battle opponents.

use crate::battle::engine::BattleAction;
use crate::battle::state::TurnRng;
use crate::entity::Entity;
use crate::skills::Skill;
use schema::{ConditionKind, SkillCategory, SkillId};

/// A trait for any system that can decide on a battle action.
pub trait Behavior {
    /// Inspects both combatants and decides on the next action for `actor`.
    fn decide_action(&self, actor: &Entity, opponent: &Entity, rng: &mut TurnRng) -> BattleAction;
}

/// Priority-ordered probabilistic policy used by every NPC.
///
/// 1. Coin flip between attacking and considering a skill.
/// 2. Buff (1 in 3, only if not already regenerating), else Heal when HP is
///    below 1.5x the opponent's power, else Damage, else attack.
/// 3. Unaffordable picks fall back to attack.
#[derive(Debug, Clone, Copy, Default)]
pub struct PriorityPolicy;

impl PriorityPolicy {
    pub fn new() -> Self {
        Self
    }

    fn skills_in(actor: &Entity, category: SkillCategory) -> Vec<SkillId> {
        actor
            .skills()
            .iter()
            .copied()
            .filter(|id| Skill::get(*id).category == category)
            .collect()
    }

    fn pick(skills: &[SkillId], rng: &mut TurnRng, reason: &str) -> SkillId {
        skills[rng.pick_index(skills.len(), reason)]
    }

    fn choose_skill(
        &self,
        actor: &Entity,
        opponent: &Entity,
        rng: &mut TurnRng,
    ) -> Option<SkillId> {
        let heals = Self::skills_in(actor, SkillCategory::Heal);
        let damages = Self::skills_in(actor, SkillCategory::Damage);
        let buffs = Self::skills_in(actor, SkillCategory::Buff);

        let regenerating = actor.condition().kind == ConditionKind::Regen;
        if !buffs.is_empty() && !regenerating && rng.range_inclusive(0, 2, "npc buff chance") == 0 {
            return Some(Self::pick(&buffs, rng, "npc buff pick"));
        }
        // hp < opponent power * 1.5, kept in integers.
        if !heals.is_empty() && actor.hit_point() * 2 < opponent.attack_power() * 3 {
            return Some(Self::pick(&heals, rng, "npc heal pick"));
        }
        if !damages.is_empty() {
            return Some(Self::pick(&damages, rng, "npc damage pick"));
        }
        None
    }
}

impl Behavior for PriorityPolicy {
    fn decide_action(&self, actor: &Entity, opponent: &Entity, rng: &mut TurnRng) -> BattleAction {
        if rng.range_inclusive(0, 1, "npc attack or skill") == 0 {
            return BattleAction::Attack;
        }

        let action = match self.choose_skill(actor, opponent, rng) {
            Some(skill) if Skill::get(skill).is_affordable_by(actor) => {
                BattleAction::UseSkill(skill)
            }
            _ => BattleAction::Attack,
        };
        tracing::debug!(actor = %actor.id(), ?action, "npc chose action");
        action
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::EntityId;
    use pretty_assertions::assert_eq;
    use schema::{EntityRole, NpcSpecies};

    fn npc(skills: &[SkillId]) -> Entity {
        Entity::new(EntityId(9), "Wolf", EntityRole::Npc(NpcSpecies::Wolf), 40, 20, 8)
            .with_skills(skills.iter().copied())
    }

    fn hero(power: i32) -> Entity {
        Entity::new(EntityId(1), "Hero", EntityRole::Player, 60, 10, power)
    }

    #[test]
    fn coin_flip_zero_attacks() {
        let actor = npc(&[SkillId::Bite]);
        let mut rng = TurnRng::new_for_test(vec![0]);
        assert_eq!(PriorityPolicy.decide_action(&actor, &hero(10), &mut rng), BattleAction::Attack);
    }

    #[test]
    fn buff_wins_one_in_three() {
        let actor = npc(&[SkillId::Bite, SkillId::Regen, SkillId::Heal]);
        let mut rng = TurnRng::new_for_test(vec![1, 0, 0]);
        assert_eq!(
            PriorityPolicy.decide_action(&actor, &hero(10), &mut rng),
            BattleAction::UseSkill(SkillId::Regen)
        );
    }

    #[test]
    fn regenerating_npc_skips_buff_roll() {
        let mut actor = npc(&[SkillId::Bite, SkillId::Regen]);
        actor.inflict(ConditionKind::Regen);
        // No buff-chance draw is consumed: next draw is the damage pick.
        let mut rng = TurnRng::new_for_test(vec![1, 0]);
        assert_eq!(
            PriorityPolicy.decide_action(&actor, &hero(10), &mut rng),
            BattleAction::UseSkill(SkillId::Bite)
        );
    }

    #[test]
    fn low_hp_prefers_heal_after_failed_buff_roll() {
        let mut actor = npc(&[SkillId::Bite, SkillId::Training, SkillId::Heal]);
        actor.set_hit_point(14); // 14 < 10 * 1.5
        let mut rng = TurnRng::new_for_test(vec![1, 2, 0]);
        assert_eq!(
            PriorityPolicy.decide_action(&actor, &hero(10), &mut rng),
            BattleAction::UseSkill(SkillId::Heal)
        );
    }

    #[test]
    fn heal_threshold_is_strict() {
        let mut actor = npc(&[SkillId::Bite, SkillId::Heal]);
        actor.set_hit_point(15); // not below 15
        let mut rng = TurnRng::new_for_test(vec![1, 0]);
        assert_eq!(
            PriorityPolicy.decide_action(&actor, &hero(10), &mut rng),
            BattleAction::UseSkill(SkillId::Bite)
        );
    }

    #[test]
    fn unaffordable_choice_falls_back_to_attack() {
        let mut actor = npc(&[SkillId::Destroy]);
        actor.set_mana_point(3);
        let mut rng = TurnRng::new_for_test(vec![1, 0]);
        assert_eq!(PriorityPolicy.decide_action(&actor, &hero(10), &mut rng), BattleAction::Attack);
    }

    #[test]
    fn no_skills_means_attack() {
        let actor = npc(&[]);
        let mut rng = TurnRng::new_for_test(vec![1]);
        assert_eq!(PriorityPolicy.decide_action(&actor, &hero(10), &mut rng), BattleAction::Attack);
    }
}
