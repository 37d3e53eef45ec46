//! Post-battle rewards for a winning player-controlled entity.

use crate::battle::state::TurnRng;
use crate::config::{BattleConfig, MAX_SKILL_REWARDS};
use crate::entity::{Entity, StateChange};
use crate::errors::RewardError;
use schema::{Side, SkillId};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RewardKind {
    /// Flat HP/MP grant.
    StatusBoost { hit_point: i32, mana_point: i32 },
    /// A skill taken from the defeated entity.
    Skill(SkillId),
}

impl fmt::Display for RewardKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RewardKind::StatusBoost {
                hit_point,
                mana_point,
            } => write!(f, "+{} HP / +{} MP", hit_point, mana_point),
            RewardKind::Skill(skill) => write!(f, "Learn {}", skill),
        }
    }
}

/// One displayed option. Disabled options are shown but cannot be picked.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct RewardOption {
    pub kind: RewardKind,
    pub enabled: bool,
}

/// The options offered to the winner once a battle concludes.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct RewardOffer {
    winner: Side,
    options: Vec<RewardOption>,
}

impl RewardOffer {
    /// Builds the offer: the status boost first, then up to
    /// `max_skill_rewards` skills sampled without replacement from the loser.
    /// Skills the winner already knows stay in the list, disabled.
    pub fn generate(
        winner_side: Side,
        winner: &Entity,
        loser: &Entity,
        config: &BattleConfig,
        rng: &mut TurnRng,
    ) -> Self {
        let mut options = vec![RewardOption {
            kind: RewardKind::StatusBoost {
                hit_point: config.reward_hit_point,
                mana_point: config.reward_mana_point,
            },
            enabled: true,
        }];

        let mut pool: Vec<SkillId> = loser.skills().to_vec();
        let draws = config
            .max_skill_rewards
            .min(MAX_SKILL_REWARDS)
            .min(pool.len());
        for _ in 0..draws {
            let index = rng.pick_index(pool.len(), "reward skill sample");
            let skill = pool.remove(index);
            options.push(RewardOption {
                kind: RewardKind::Skill(skill),
                enabled: !winner.has_skill(skill),
            });
        }

        tracing::debug!(winner = %winner_side, options = options.len(), "reward offer generated");
        Self {
            winner: winner_side,
            options,
        }
    }

    pub fn winner(&self) -> Side {
        self.winner
    }

    pub fn options(&self) -> &[RewardOption] {
        &self.options
    }

    pub fn skill_options(&self) -> impl Iterator<Item = SkillId> + '_ {
        self.options.iter().filter_map(|option| match option.kind {
            RewardKind::Skill(skill) => Some(skill),
            RewardKind::StatusBoost { .. } => None,
        })
    }

    /// Validates a player's pick.
    pub fn choose(&self, index: usize) -> Result<RewardOption, RewardError> {
        let option = self
            .options
            .get(index)
            .copied()
            .ok_or(RewardError::InvalidOption(index))?;
        if !option.enabled {
            return Err(RewardError::OptionDisabled(index));
        }
        Ok(option)
    }

    /// Uniform pick among enabled options. The status boost is always enabled.
    pub fn auto_pick(&self, rng: &mut TurnRng) -> usize {
        let enabled: Vec<usize> = self
            .options
            .iter()
            .enumerate()
            .filter(|(_, option)| option.enabled)
            .map(|(i, _)| i)
            .collect();
        enabled[rng.pick_index(enabled.len(), "reward auto pick")]
    }
}

/// Applies a chosen reward to the winner. Learning a skill is not a vital
/// change, so it reports nothing.
pub fn apply_reward(option: RewardOption, winner: &mut Entity) -> Vec<StateChange> {
    match option.kind {
        RewardKind::StatusBoost {
            hit_point,
            mana_point,
        } => vec![
            winner.set_hit_point(winner.hit_point() + hit_point),
            winner.set_mana_point(winner.mana_point() + mana_point),
        ],
        RewardKind::Skill(skill) => {
            winner.learn_skill(skill);
            Vec::new()
        }
    }
}
