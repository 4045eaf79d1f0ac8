//! Turn gating for the action surface.
//!
//! The gate guarantees at most one submission in flight: a submission
//! must claim the gate synchronously (before any request is issued),
//! and nothing reopens it until a response or failure comes back.
//! Paced reopens hand out a token stamped with the hand generation, so
//! a timer left over from a superseded hand can never reopen a gate it
//! no longer owns.

use railbird_types::Seat;

/// Token for a deferred reopen. Opaque to the scheduler that holds it;
/// the stamped generation is what keeps stale timers inert.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PacingToken {
    seat: Seat,
    generation: u64,
}

impl PacingToken {
    pub fn seat(&self) -> Seat {
        self.seat
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum GateState {
    Closed,
    Open(Seat),
    /// A paced reopen is armed; only the matching token completes it.
    PendingOpen(Seat),
    /// Terminal: nothing reopens this gate until the next hand.
    ClosedForHand,
}

#[derive(Clone, Debug)]
pub struct TurnGate {
    state: GateState,
    generation: u64,
}

impl TurnGate {
    pub fn new() -> Self {
        Self {
            state: GateState::Closed,
            generation: 0,
        }
    }

    /// The action surface renders only while this holds for the player.
    pub fn is_open_for(&self, seat: Seat) -> bool {
        self.state == GateState::Open(seat)
    }

    pub fn is_closed_for_hand(&self) -> bool {
        self.state == GateState::ClosedForHand
    }

    /// Starts a new hand: state resets and all outstanding pacing
    /// tokens go stale.
    pub fn begin_hand(&mut self) {
        self.generation += 1;
        self.state = GateState::Closed;
    }

    pub fn open(&mut self, seat: Seat) {
        if self.state != GateState::ClosedForHand {
            self.state = GateState::Open(seat);
        }
    }

    pub fn close(&mut self) {
        if self.state != GateState::ClosedForHand {
            self.state = GateState::Closed;
        }
    }

    /// Closes the gate until [`TurnGate::begin_hand`].
    pub fn close_for_hand(&mut self) {
        self.state = GateState::ClosedForHand;
    }

    /// Arms a paced reopen and returns the token that completes it. The
    /// caller owns the delay; the gate stays closed until the token is
    /// fired.
    pub fn schedule_open(&mut self, seat: Seat) -> PacingToken {
        if self.state != GateState::ClosedForHand {
            self.state = GateState::PendingOpen(seat);
        }
        PacingToken {
            seat,
            generation: self.generation,
        }
    }

    /// Completes a paced reopen. Returns whether the gate opened; a
    /// token from another generation, or one whose reopen was
    /// superseded, is ignored.
    pub fn fire(&mut self, token: PacingToken) -> bool {
        if token.generation != self.generation {
            return false;
        }
        if self.state != GateState::PendingOpen(token.seat) {
            return false;
        }
        self.state = GateState::Open(token.seat);
        true
    }

    /// Claims the gate for a submission. Succeeds only while open for
    /// the player, and closes synchronously so a second submission
    /// cannot race the first.
    pub fn try_acquire(&mut self) -> bool {
        if self.state == GateState::Open(Seat::Player) {
            self.state = GateState::Closed;
            true
        } else {
            false
        }
    }
}

impl Default for TurnGate {
    fn default() -> Self {
        Self::new()
    }
}
