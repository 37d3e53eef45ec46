use crate::battle::state::BattleStatus;
use crate::entity::EntityId;
use schema::{Side, SkillId};
use thiserror::Error;

/// Main error type for the netbattle simulation core
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BattleEngineError {
    /// Error related to skill lookup or invocation
    #[error("Skill error: {0}")]
    Skill(#[from] SkillError),
    /// Error related to a submitted action
    #[error("Action error: {0}")]
    Action(#[from] ActionError),
    /// Error related to an illegal state machine transition
    #[error("Battle state error: {0}")]
    BattleState(#[from] BattleStateError),
    /// Error related to reward selection
    #[error("Reward error: {0}")]
    Reward(#[from] RewardError),
}

/// Errors related to skill operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SkillError {
    /// The entity does not hold the requested skill
    #[error("Entity {entity} does not know skill {skill:?}")]
    SkillNotFound { entity: EntityId, skill: SkillId },
}

/// Errors related to submitted actions
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    /// The submitting side is not the acting side
    #[error("It is not {0}'s turn")]
    NotYourTurn(Side),
    /// The skill costs more mana than the actor has
    #[error("Not enough mana for {skill:?}: costs {cost}, has {available}")]
    InsufficientMana {
        skill: SkillId,
        cost: i32,
        available: i32,
    },
    /// No turn is waiting for an action
    #[error("No action is pending")]
    NoActionPending,
}

/// Errors related to battle state transitions
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BattleStateError {
    /// The operation requires a different battle status
    #[error("Expected status {expected:?}, battle is in {actual:?}")]
    UnexpectedStatus {
        expected: BattleStatus,
        actual: BattleStatus,
    },
    /// The first turn has already been started
    #[error("The battle has already begun")]
    AlreadyStarted,
    /// The battle reached a terminal status
    #[error("The battle has already concluded")]
    AlreadyConcluded,
    /// The battle has not reached a terminal status yet
    #[error("The battle has not concluded yet")]
    NotConcluded,
    /// An entity id is not present where it was expected
    #[error("Entity {0} not found")]
    EntityNotFound(EntityId),
}

/// Errors related to reward selection
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RewardError {
    /// No reward offer is open
    #[error("No reward offer is open")]
    NoOffer,
    /// Option index is out of bounds
    #[error("Invalid reward option: {0}")]
    InvalidOption(usize),
    /// The option is displayed but cannot be chosen
    #[error("Reward option {0} is disabled")]
    OptionDisabled(usize),
}

/// Fatal content errors. Enum dispatch is exhaustive, so these only come from
/// parsing identifiers out of strings.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContentError {
    #[error("Unknown skill identifier: {0}")]
    UnknownSkill(String),
    #[error("Unknown condition identifier: {0}")]
    UnknownCondition(String),
}

/// Errors related to loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("Invalid content: {0}")]
    Content(#[from] ContentError),
    #[error("Invalid config value for {field}: {reason}")]
    OutOfRange { field: &'static str, reason: String },
}

/// Errors raised at the replication boundary
#[derive(Debug, Error)]
pub enum GatewayError {
    /// A host-only operation was attempted by a non-authority peer
    #[error("Peer {0} is not the authority")]
    NotAuthority(crate::net::PeerId),
    /// The sender does not control the side it tried to act for
    #[error("Peer {peer} may not act for {side}")]
    Unauthorized { peer: crate::net::PeerId, side: Side },
    #[error("Failed to encode message: {0}")]
    Encode(postcard::Error),
    #[error("Failed to decode message: {0}")]
    Decode(postcard::Error),
    #[error("Channel closed")]
    ChannelClosed,
    /// The authority rejected the command on simulation grounds
    #[error("Rejected by simulation: {0}")]
    Rejected(#[from] BattleEngineError),
}

/// Type alias for Results using BattleEngineError
pub type BattleResult<T> = Result<T, BattleEngineError>;

/// Type alias for Results using GatewayError
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Parses a stable skill identifier, e.g. from a content file or the wire.
pub fn parse_skill_id(raw: &str) -> Result<SkillId, ContentError> {
    raw.parse::<SkillId>()
        .map_err(|_| ContentError::UnknownSkill(raw.to_string()))
}

/// Parses a stable condition identifier.
pub fn parse_condition(raw: &str) -> Result<schema::ConditionKind, ContentError> {
    raw.parse::<schema::ConditionKind>()
        .map_err(|_| ContentError::UnknownCondition(raw.to_string()))
}

impl From<SkillError> for GatewayError {
    fn from(err: SkillError) -> Self {
        GatewayError::Rejected(err.into())
    }
}

impl From<ActionError> for GatewayError {
    fn from(err: ActionError) -> Self {
        GatewayError::Rejected(err.into())
    }
}

impl From<BattleStateError> for GatewayError {
    fn from(err: BattleStateError) -> Self {
        GatewayError::Rejected(err.into())
    }
}

impl From<RewardError> for GatewayError {
    fn from(err: RewardError) -> Self {
        GatewayError::Rejected(err.into())
    }
}
