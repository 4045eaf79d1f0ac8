//! Wire contract of the remote engine: two JSON POST operations with a
//! shared response shape. Field aliases keep the legacy engine's names
//! (`logs`, `community`) decodable next to the current ones.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cards::Card;
use crate::hand::{HandResult, Seat};

/// Errors raised while validating a player decision locally, before any
/// request is issued.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ActionError {
    #[error("raise requires an amount")]
    MissingRaiseAmount,
    #[error("raise amount must be at least 1")]
    RaiseTooSmall,
    #[error("{0} does not take a raise amount")]
    UnexpectedRaiseAmount(PlayerAction),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerAction {
    Fold,
    Call,
    Raise,
}

impl fmt::Display for PlayerAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PlayerAction::Fold => "fold",
            PlayerAction::Call => "call",
            PlayerAction::Raise => "raise",
        };
        f.write_str(name)
    }
}

/// A player decision as captured at the surface, not yet on the wire.
///
/// Invariant: `raise_amount` is present iff `action` is `Raise`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ActionRequest {
    pub action: PlayerAction,
    pub raise_amount: Option<u64>,
}

impl ActionRequest {
    pub fn fold() -> Self {
        Self {
            action: PlayerAction::Fold,
            raise_amount: None,
        }
    }

    pub fn call() -> Self {
        Self {
            action: PlayerAction::Call,
            raise_amount: None,
        }
    }

    pub fn raise(amount: u64) -> Self {
        Self {
            action: PlayerAction::Raise,
            raise_amount: Some(amount),
        }
    }

    /// Enforces the raise-amount invariant. A failed validation never
    /// reaches the network.
    pub fn validate(&self) -> Result<(), ActionError> {
        match (self.action, self.raise_amount) {
            (PlayerAction::Raise, None) => Err(ActionError::MissingRaiseAmount),
            (PlayerAction::Raise, Some(0)) => Err(ActionError::RaiseTooSmall),
            (PlayerAction::Raise, Some(_)) => Ok(()),
            (action, Some(_)) => Err(ActionError::UnexpectedRaiseAmount(action)),
            (_, None) => Ok(()),
        }
    }
}

/// Body of the start-hand operation.
#[derive(Debug, Serialize)]
pub struct StartHandRequest<'a> {
    pub session_id: &'a str,
}

/// Body of the submit-action operation. `raise_amount` serializes as
/// `null` for fold/call, which is what the legacy engine expects.
#[derive(Debug, Serialize)]
pub struct PlayerActionRequest<'a> {
    pub session_id: &'a str,
    pub action: PlayerAction,
    pub raise_amount: Option<u64>,
}

/// Response shape shared by both operations. Every field except the
/// narration is optional; a response that carries `error` had no effect
/// server-side and must not be applied.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct EngineResponse {
    pub error: Option<String>,
    pub result: HandResult,
    #[serde(alias = "logs")]
    pub log: Vec<String>,
    pub pot: Option<u64>,
    pub player_chips: Option<u64>,
    pub bot_chips: Option<u64>,
    pub current_bet: Option<u64>,
    pub street_index: Option<u8>,
    pub dealer: Option<Seat>,
    pub to_act: Option<Seat>,
    #[serde(alias = "community")]
    pub community_cards: Option<Vec<Card>>,
    pub player_hole: Option<Vec<Card>>,
    pub bot_hole: Option<Vec<Card>>,
    pub history: Option<String>,
    pub player_action: Option<String>,
    pub bot_action: Option<String>,
    pub bot_raise_amount: Option<u64>,
    pub sb: Option<u64>,
    pub bb: Option<u64>,
    pub hand_ended: Option<bool>,
}
