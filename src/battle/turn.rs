//! Whose turn it is: alternation and the stun-skip rule.

use crate::entity::{Entity, StateChange};
use schema::{ConditionKind, Side};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnPhase {
    WaitingForFirstTurn,
    TurnInProgress(Side),
    Ended,
}

/// Result of starting a turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnStart {
    pub turn_count: u32,
    pub acting: Side,
    /// Set when the acting entity was stunned: the stun was cleared and the
    /// turn has no action phase.
    pub stun_cleared: Option<StateChange>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct TurnManager {
    acting: Side,
    waiting: Side,
    phase: TurnPhase,
}

impl Default for TurnManager {
    fn default() -> Self {
        Self::new()
    }
}

impl TurnManager {
    /// Left acts first.
    pub fn new() -> Self {
        Self {
            acting: Side::Left,
            waiting: Side::Right,
            phase: TurnPhase::WaitingForFirstTurn,
        }
    }

    pub fn acting(&self) -> Side {
        self.acting
    }

    pub fn waiting(&self) -> Side {
        self.waiting
    }

    pub fn phase(&self) -> TurnPhase {
        self.phase
    }

    /// Starts turn `turn_count`. Turn 0 keeps the initial pairing; every later
    /// turn swaps acting and waiting. A stunned actor has the stun cleared and
    /// loses the turn.
    pub fn start_new_turn(&mut self, turn_count: u32, entities: &mut [Entity; 2]) -> TurnStart {
        if turn_count != 0 {
            std::mem::swap(&mut self.acting, &mut self.waiting);
        }
        self.phase = TurnPhase::TurnInProgress(self.acting);

        let actor = &mut entities[self.acting.to_index()];
        let stun_cleared = if actor.condition().kind == ConditionKind::Stun {
            let power_gain = actor.condition().power_gain;
            Some(actor.set_abnormal_condition(ConditionKind::None, power_gain))
        } else {
            None
        };

        tracing::debug!(
            turn_count,
            acting = %self.acting,
            skipped = stun_cleared.is_some(),
            "turn started"
        );

        TurnStart {
            turn_count,
            acting: self.acting,
            stun_cleared,
        }
    }

    pub fn end(&mut self) {
        self.phase = TurnPhase::Ended;
    }
}
