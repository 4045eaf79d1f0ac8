//! The hand-progression controller.
//!
//! One response in, one directive out: the controller reconciles each
//! engine response into the snapshot slot, classifies the narration,
//! updates the scoreboard, and tells the renderer exactly what changed
//! and whether the action surface may come back. It owns all hand
//! state and performs no IO, so every transition is testable without a
//! UI or a network.

use railbird_types::{
    extract, ActionRequest, EngineResponse, HandMessages, HandResult, HandSnapshot, MarkerSet,
    NarrationLog, Seat, SHOWDOWN_STREET,
};
use tracing::{debug, warn};

use crate::gate::{PacingToken, TurnGate};
use crate::score::{ScoreBoard, ScoreEvent};
use crate::{Error, Result};

/// Controller knobs. One configuration struct instead of forked
/// controller variants.
#[derive(Clone, Debug)]
pub struct ControllerConfig {
    /// Markers used to classify narration lines.
    pub markers: MarkerSet,
    /// Track session win counters and blind escalation.
    pub track_score: bool,
    /// Delay reopening the surface after an opponent action. The delay
    /// itself is owned by the caller; this only selects whether reopen
    /// directives are paced.
    pub pace_reopen: bool,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            markers: MarkerSet::default(),
            track_score: true,
            pace_reopen: true,
        }
    }
}

/// What should happen to the action surface after a response.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GateDirective {
    /// Render the surface now (it only renders for the player seat).
    Open(Seat),
    /// Reopen after the pacing delay; fire the token when it elapses.
    OpenDelayed(PacingToken),
    /// Stay closed and wait for the next response.
    Remain,
    /// The hand is over; only the new-hand control applies.
    ClosedForHand,
}

/// Instruction set for the renderer after one response is applied.
#[derive(Clone, Debug)]
pub struct Directive {
    pub result: HandResult,
    pub terminal: bool,
    pub repaint_board: bool,
    pub reveal_bot_hole: bool,
    /// A street closed: both transient action messages go away.
    pub clear_action_messages: bool,
    pub messages: HandMessages,
    pub gate: GateDirective,
    pub score_event: Option<ScoreEvent>,
    /// Engine-reported rejection. When set, nothing was applied and no
    /// other field of the directive is meaningful.
    pub engine_error: Option<String>,
}

impl Directive {
    fn rejected(message: String) -> Self {
        Self {
            result: HandResult::Continuing,
            terminal: false,
            repaint_board: false,
            reveal_bot_hole: false,
            clear_action_messages: false,
            messages: HandMessages::default(),
            gate: GateDirective::Remain,
            score_event: None,
            engine_error: Some(message),
        }
    }
}

/// Owns the snapshot slot, the narration log, the turn gate, and the
/// scoreboard for one session.
#[derive(Debug)]
pub struct HandController {
    config: ControllerConfig,
    snapshot: Option<HandSnapshot>,
    narration: NarrationLog,
    gate: TurnGate,
    score: ScoreBoard,
}

impl HandController {
    pub fn new(config: ControllerConfig) -> Self {
        Self {
            config,
            snapshot: None,
            narration: NarrationLog::new(),
            gate: TurnGate::new(),
            score: ScoreBoard::new(),
        }
    }

    pub fn snapshot(&self) -> Option<&HandSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn score(&self) -> &ScoreBoard {
        &self.score
    }

    pub fn gate(&self) -> &TurnGate {
        &self.gate
    }

    pub fn narration(&self) -> &[String] {
        self.narration.lines()
    }

    /// Classifies the narration recorded so far.
    pub fn messages(&self) -> HandMessages {
        extract(self.narration.lines(), &self.config.markers)
    }

    /// Whether the player may submit an action right now.
    pub fn player_may_act(&self) -> bool {
        self.gate.is_open_for(Seat::Player)
    }

    /// Applies the start-hand response. The previous hand's snapshot and
    /// narration are discarded and any outstanding pacing token goes
    /// stale before the new state is installed.
    pub fn start_hand(&mut self, response: &EngineResponse) -> Result<Directive> {
        if let Some(message) = &response.error {
            return Ok(Directive::rejected(message.clone()));
        }

        self.gate.begin_hand();
        self.narration.clear();
        self.narration.absorb(&response.log);

        let mut snapshot = HandSnapshot::from_start(response);
        let gate = if snapshot.hand_ended {
            snapshot.finish();
            self.gate.close_for_hand();
            GateDirective::ClosedForHand
        } else {
            // The legacy engine advances only on player submissions, so
            // the surface opens for the player even when `to_act`
            // reports the bot first (see DESIGN.md).
            self.gate.open(Seat::Player);
            GateDirective::Open(Seat::Player)
        };

        debug!(
            dealer = ?snapshot.dealer,
            to_act = ?snapshot.to_act,
            pot = snapshot.pot,
            "hand started"
        );

        let directive = Directive {
            result: snapshot.result,
            terminal: snapshot.hand_ended,
            repaint_board: true,
            reveal_bot_hole: false,
            clear_action_messages: true,
            messages: self.messages(),
            gate,
            score_event: None,
            engine_error: None,
        };
        self.snapshot = Some(snapshot);
        Ok(directive)
    }

    /// Applies an action response: the finite state machine keyed on the
    /// response's result signal.
    pub fn apply(&mut self, response: &EngineResponse) -> Result<Directive> {
        let Some(previous) = self.snapshot.as_ref() else {
            return Err(Error::NoHand);
        };

        if let Some(message) = &response.error {
            // Remote rejection: the operation had no effect server-side,
            // so nothing local moves either. The surface comes back for
            // the last known turn so the player can try again.
            if !previous.hand_ended && previous.to_act == Some(Seat::Player) {
                self.gate.open(Seat::Player);
            }
            return Ok(Directive::rejected(message.clone()));
        }

        let (mut next, report) = previous.merged_with(response);
        if report.street_regressed {
            warn!(street = next.street_index, "ignored street regression");
        }
        if report.board_shrunk {
            warn!(board = next.community_cards.len(), "ignored board shrink");
        }
        self.narration.absorb(&response.log);

        // Terminal tags take precedence over everything else; a
        // post-river street or an explicit hand-ended marker without a
        // tag is forced terminal rather than ever reopening the gate.
        let forced_terminal = !next.result.is_terminal()
            && (next.street_index >= SHOWDOWN_STREET || response.hand_ended == Some(true));
        if forced_terminal {
            warn!(
                street = next.street_index,
                "terminal state without a terminal result tag"
            );
        }
        let terminal = next.result.is_terminal() || forced_terminal;

        let mut directive = Directive {
            result: next.result,
            terminal,
            repaint_board: response.community_cards.is_some(),
            reveal_bot_hole: false,
            clear_action_messages: false,
            messages: HandMessages::default(),
            gate: GateDirective::Remain,
            score_event: None,
            engine_error: None,
        };

        if terminal {
            if next.result == HandResult::BotFolded {
                // A fold win reveals nothing, whatever the response says.
                next.bot_hole = previous.bot_hole.clone();
            } else {
                directive.reveal_bot_hole = response.bot_hole.is_some();
            }
            next.finish();
            self.gate.close_for_hand();
            directive.gate = GateDirective::ClosedForHand;
            if self.config.track_score {
                directive.score_event = self.score.record_hand(&next);
            }
        } else {
            match next.result {
                HandResult::NewStreet => {
                    directive.repaint_board = true;
                    directive.clear_action_messages = true;
                    directive.gate = self.reopen(Seat::Player);
                }
                _ => {
                    // Continuing: input returns only when the engine says
                    // it is the player's turn on a live street.
                    let player_turn = next.to_act == Some(Seat::Player)
                        && next.street_index < SHOWDOWN_STREET;
                    directive.gate = if player_turn {
                        self.reopen(Seat::Player)
                    } else {
                        GateDirective::Remain
                    };
                }
            }
        }

        debug!(
            result = ?next.result,
            terminal,
            street = next.street_index,
            gate = ?directive.gate,
            "response dispatched"
        );

        directive.messages = self.messages();
        self.snapshot = Some(next);
        Ok(directive)
    }

    /// Claims the gate for a submission. Validation runs first so a
    /// malformed raise leaves the surface open; a valid request closes
    /// the gate synchronously, before any request is issued.
    pub fn begin_submission(&mut self, request: &ActionRequest) -> Result<()> {
        request.validate()?;
        if !self.gate.try_acquire() {
            return Err(Error::GateClosed);
        }
        Ok(())
    }

    /// Restores the player's turn after a connectivity failure: the
    /// request never completed, so no state was mutated anywhere.
    pub fn submission_failed(&mut self) {
        let hand_live = self.snapshot.as_ref().is_some_and(|s| !s.hand_ended);
        if hand_live {
            self.gate.open(Seat::Player);
        }
    }

    /// Completes a paced reopen. Stale tokens report `false` and leave
    /// the gate untouched.
    pub fn fire_gate(&mut self, token: PacingToken) -> bool {
        self.gate.fire(token)
    }

    fn reopen(&mut self, seat: Seat) -> GateDirective {
        if self.config.pace_reopen {
            GateDirective::OpenDelayed(self.gate.schedule_open(seat))
        } else {
            self.gate.open(seat);
            GateDirective::Open(seat)
        }
    }
}
