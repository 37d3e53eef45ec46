//! Netbattle Battle Core
//!
//! A turn-based two-entity battle state machine with host-authoritative
//! replication. One authority computes every outcome; proxies replay the
//! events it broadcasts.

// --- MODULE DECLARATIONS ---
pub mod battle;
pub mod config;
pub mod entity;
pub mod errors;
pub mod field;
pub mod net;
pub mod presentation;
pub mod roster;
pub mod skills;

// --- PUBLIC API RE-EXPORTS ---

// --- From the `schema` crate ---
pub use schema::{
    ConditionKind, EffectKey, EntityRole, NpcSpecies, Side, SkillCategory, SkillId,
};

// --- From this crate's modules (`src/`) ---

// Battle state machine and its step results.
pub use battle::engine::{BattleAction, BattleOutcome, BattleSession};
pub use battle::rewards::{RewardKind, RewardOffer, RewardOption};
pub use battle::state::{BattleEvent, BattleStatus, EventBus, SessionSnapshot, TurnRng};

// Entities and the world around a battle.
pub use entity::{AbnormalCondition, Entity, EntityId, StateChange};
pub use field::{Field, FieldReturn};
pub use roster::{EntityTemplate, Roster};
pub use skills::{randomized_with_offset, Skill, SkillResult};

pub use config::{BattleConfig, TimingConfig};

// Crate-specific error and result types.
pub use errors::{
    ActionError, BattleEngineError, BattleResult, BattleStateError, ConfigError, ContentError,
    GatewayError, GatewayResult, RewardError, SkillError,
};
