//! Hand-level state: seats, the discrete result signal, and the
//! authoritative snapshot slot that every engine response replaces.

use serde::{Deserialize, Serialize};

use crate::api::EngineResponse;
use crate::cards::Card;
use crate::constants::{DEFAULT_BIG_BLIND, DEFAULT_SMALL_BLIND, STARTING_CHIPS};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Seat {
    Player,
    Bot,
}

impl Seat {
    pub fn other(self) -> Self {
        match self {
            Seat::Player => Seat::Bot,
            Seat::Bot => Seat::Player,
        }
    }
}

/// The discrete result signal carried by an action response.
///
/// The legacy engine omits the field entirely while a betting round is
/// still open, so `Continuing` is the serde default.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandResult {
    #[default]
    Continuing,
    NewStreet,
    PlayerEnded,
    BotEnded,
    BotFolded,
    Showdown,
}

impl HandResult {
    /// Whether this result ends the hand.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            HandResult::PlayerEnded
                | HandResult::BotEnded
                | HandResult::BotFolded
                | HandResult::Showdown
        )
    }
}

/// Fields a merge refused to regress, so the caller can log them.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MergeReport {
    pub street_regressed: bool,
    pub board_shrunk: bool,
}

impl MergeReport {
    pub fn is_clean(&self) -> bool {
        !self.street_regressed && !self.board_shrunk
    }
}

/// The latest authoritative state of the current hand.
///
/// A snapshot is built from the start-hand response, replaced wholesale
/// by every subsequent response, and discarded when a new hand starts.
/// It is never mutated in place by callers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HandSnapshot {
    pub pot: u64,
    pub player_chips: u64,
    pub bot_chips: u64,
    /// Table-level bet to match in the current round, as reported.
    pub current_bet: u64,
    pub dealer: Seat,
    /// `None` once the hand is over.
    pub to_act: Option<Seat>,
    pub community_cards: Vec<Card>,
    pub player_hole: Vec<Card>,
    /// Populated only when the engine discloses the opponent's cards.
    pub bot_hole: Option<Vec<Card>>,
    /// 0 preflop, 1 flop, 2 turn, 3 river, 4 post-river.
    pub street_index: u8,
    pub result: HandResult,
    pub hand_ended: bool,
    pub small_blind: u64,
    pub big_blind: u64,
    /// Engine's compact action history, mirrored when present.
    pub history: String,
}

impl HandSnapshot {
    /// Builds the first snapshot of a hand from the start-hand response.
    pub fn from_start(response: &EngineResponse) -> Self {
        Self {
            pot: response.pot.unwrap_or(0),
            player_chips: response.player_chips.unwrap_or(STARTING_CHIPS),
            bot_chips: response.bot_chips.unwrap_or(STARTING_CHIPS),
            current_bet: response.current_bet.unwrap_or(0),
            dealer: response.dealer.unwrap_or(Seat::Player),
            to_act: response.to_act,
            community_cards: response.community_cards.clone().unwrap_or_default(),
            player_hole: response.player_hole.clone().unwrap_or_default(),
            bot_hole: response.bot_hole.clone(),
            street_index: response.street_index.unwrap_or(0),
            result: response.result,
            hand_ended: response.hand_ended.unwrap_or(false),
            small_blind: response.sb.unwrap_or(DEFAULT_SMALL_BLIND),
            big_blind: response.bb.unwrap_or(DEFAULT_BIG_BLIND),
            history: response.history.clone().unwrap_or_default(),
        }
    }

    /// Produces the next snapshot from this one and a response.
    ///
    /// Present fields replace, absent fields carry over. `street_index`
    /// and the board never regress within a hand, and a revealed
    /// `bot_hole` is never taken back; attempts to do either are
    /// reported instead of applied.
    pub fn merged_with(&self, response: &EngineResponse) -> (HandSnapshot, MergeReport) {
        let mut next = self.clone();
        let mut report = MergeReport::default();

        if let Some(pot) = response.pot {
            next.pot = pot;
        }
        if let Some(chips) = response.player_chips {
            next.player_chips = chips;
        }
        if let Some(chips) = response.bot_chips {
            next.bot_chips = chips;
        }
        if let Some(bet) = response.current_bet {
            next.current_bet = bet;
        }
        if let Some(dealer) = response.dealer {
            next.dealer = dealer;
        }
        if let Some(seat) = response.to_act {
            next.to_act = Some(seat);
        }
        if let Some(street) = response.street_index {
            if street >= next.street_index {
                next.street_index = street;
            } else {
                report.street_regressed = true;
            }
        }
        if let Some(cards) = &response.community_cards {
            if cards.len() >= next.community_cards.len() {
                next.community_cards = cards.clone();
            } else {
                report.board_shrunk = true;
            }
        }
        if let Some(hole) = &response.player_hole {
            next.player_hole = hole.clone();
        }
        if let Some(hole) = &response.bot_hole {
            next.bot_hole = Some(hole.clone());
        }
        if let Some(history) = &response.history {
            next.history = history.clone();
        }
        if let Some(sb) = response.sb {
            next.small_blind = sb;
        }
        if let Some(bb) = response.bb {
            next.big_blind = bb;
        }
        next.result = response.result;
        if let Some(ended) = response.hand_ended {
            next.hand_ended = ended;
        }

        (next, report)
    }

    /// Marks the hand over; `to_act` drains to keep the terminal
    /// invariant (`to_act` is empty iff the hand has ended).
    pub fn finish(&mut self) {
        self.hand_ended = true;
        self.to_act = None;
    }
}
