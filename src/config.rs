//! Battle tuning and presentation timing, loadable from a RON file.

use crate::errors::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Upper bound on skill options in one reward offer.
pub const MAX_SKILL_REWARDS: usize = 2;

/// Parameters of one `randomized_with_offset` draw.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct VarianceSpec {
    pub base: i32,
    pub offset_percent: i32,
    pub miss_percent: i32,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct TimingConfig {
    /// Delay after an action before the log may be flipped.
    pub post_action_delay_ms: u64,
    /// Sleep between "are all animations settled" checks.
    pub poll_interval_ms: u64,
    /// How long a reward offer waits for input before auto-picking.
    pub reward_auto_pick_delay_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            post_action_delay_ms: 400,
            poll_interval_ms: 50,
            reward_auto_pick_delay_ms: 3000,
        }
    }
}

impl TimingConfig {
    pub fn post_action_delay(&self) -> Duration {
        Duration::from_millis(self.post_action_delay_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn reward_auto_pick_delay(&self) -> Duration {
        Duration::from_millis(self.reward_auto_pick_delay_ms)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct BattleConfig {
    pub attack_offset_percent: i32,
    pub attack_miss_percent: i32,
    /// Poison damage is `floor(hp * poison_rate_percent / 100)`.
    pub poison_rate_percent: i32,
    pub fire: VarianceSpec,
    pub regen: VarianceSpec,
    pub reward_hit_point: i32,
    pub reward_mana_point: i32,
    pub max_skill_rewards: usize,
    pub timing: TimingConfig,
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self {
            attack_offset_percent: 50,
            attack_miss_percent: 10,
            poison_rate_percent: 10,
            fire: VarianceSpec {
                base: 6,
                offset_percent: 50,
                miss_percent: 20,
            },
            regen: VarianceSpec {
                base: 8,
                offset_percent: 50,
                miss_percent: 0,
            },
            reward_hit_point: 20,
            reward_mana_point: 10,
            max_skill_rewards: 2,
            timing: TimingConfig::default(),
        }
    }
}

impl BattleConfig {
    pub fn from_ron_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = ron::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects values that would break reward or variance bounds.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_skill_rewards > MAX_SKILL_REWARDS {
            return Err(ConfigError::OutOfRange {
                field: "max_skill_rewards",
                reason: format!("at most {} skills may be offered", MAX_SKILL_REWARDS),
            });
        }
        if !(0..=100).contains(&self.poison_rate_percent) {
            return Err(ConfigError::OutOfRange {
                field: "poison_rate_percent",
                reason: "must be a percentage".to_string(),
            });
        }
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_ron_str(&text)?;
        tracing::debug!(path = %path.display(), "loaded battle config");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_ron_struct_yields_defaults() {
        let config = BattleConfig::from_ron_str("()").unwrap();
        assert_eq!(config, BattleConfig::default());
    }

    #[test]
    fn partial_override_keeps_other_defaults() {
        let config = BattleConfig::from_ron_str(
            "(poison_rate_percent: 25, timing: (poll_interval_ms: 5))",
        )
        .unwrap();
        assert_eq!(config.poison_rate_percent, 25);
        assert_eq!(config.timing.poll_interval_ms, 5);
        assert_eq!(config.timing.post_action_delay_ms, 400);
        assert_eq!(config.attack_miss_percent, 10);
    }

    #[test]
    fn malformed_config_is_a_parse_error() {
        let err = BattleConfig::from_ron_str("(poison_rate_percent: \"lots\")").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn too_many_skill_rewards_are_rejected() {
        let err = BattleConfig::from_ron_str("(max_skill_rewards: 5)").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::OutOfRange {
                field: "max_skill_rewards",
                ..
            }
        ));
        assert!(BattleConfig::from_ron_str("(max_skill_rewards: 1)").is_ok());
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = BattleConfig::load(Path::new("/nonexistent/netbattle.ron")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
