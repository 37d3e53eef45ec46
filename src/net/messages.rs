//! Wire messages and their postcard codec.

use crate::battle::engine::BattleAction;
use crate::battle::state::{BattleEvent, SessionSnapshot};
use crate::errors::{GatewayError, GatewayResult};
use schema::Side;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Input sent toward the authority.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    SubmitAction { side: Side, action: BattleAction },
    SelectReward { index: usize },
}

/// One applied step, as computed by the authority. Proxies replay `events`
/// and adopt `snapshot`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ReplicationMessage {
    pub sequence: u64,
    pub snapshot: SessionSnapshot,
    pub events: Vec<BattleEvent>,
}

pub fn encode<T: Serialize>(message: &T) -> GatewayResult<Vec<u8>> {
    postcard::to_allocvec(message).map_err(GatewayError::Encode)
}

pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> GatewayResult<T> {
    postcard::from_bytes(bytes).map_err(GatewayError::Decode)
}
