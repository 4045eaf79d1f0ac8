//! Common types for the railbird heads-up client: card codes, the
//! authoritative hand snapshot, the wire contract of the remote engine,
//! and the narration classifier. No IO lives here.

pub mod api;
pub mod cards;
pub mod constants;
pub mod hand;
pub mod narration;

pub use api::{
    ActionError, ActionRequest, EngineResponse, PlayerAction, PlayerActionRequest,
    StartHandRequest,
};
pub use cards::{Card, CardError};
pub use constants::*;
pub use hand::{HandResult, HandSnapshot, MergeReport, Seat};
pub use narration::{extract, Category, HandMessages, MarkerSet, NarrationLog};
