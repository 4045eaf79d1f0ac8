//! Session scoreboard: hands played, eliminations, and the display-side
//! blind level.

use railbird_types::{HandSnapshot, HANDS_PER_BLIND_LEVEL};

/// Signal surfaced when recording a hand crosses a checkpoint.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScoreEvent {
    /// The blind level stepped up (every fourth completed hand).
    BlindsUp(u64),
}

/// Win/loss counters that survive across hands. Created once per
/// session and mutated incrementally, never replaced.
///
/// Only chip counts decide the win counters: a hand that ends with both
/// stacks alive moves neither, whatever its result tag says. The level
/// counter is purely for display; blinds reported by the engine are
/// mirrored into the snapshot untouched.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScoreBoard {
    pub player_wins: u64,
    pub bot_wins: u64,
    pub hands_played: u64,
    pub blind_level: u64,
}

impl ScoreBoard {
    pub fn new() -> Self {
        Self {
            player_wins: 0,
            bot_wins: 0,
            hands_played: 0,
            blind_level: 1,
        }
    }

    /// Records a finished hand from its final chip counts.
    pub fn record_hand(&mut self, snapshot: &HandSnapshot) -> Option<ScoreEvent> {
        if snapshot.player_chips == 0 {
            self.bot_wins += 1;
        } else if snapshot.bot_chips == 0 {
            self.player_wins += 1;
        }
        self.hands_played += 1;
        if self.hands_played % HANDS_PER_BLIND_LEVEL == 0 {
            self.blind_level += 1;
            return Some(ScoreEvent::BlindsUp(self.blind_level));
        }
        None
    }
}

impl Default for ScoreBoard {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use railbird_types::EngineResponse;

    fn terminal_snapshot(player_chips: u64, bot_chips: u64) -> HandSnapshot {
        let response: EngineResponse = serde_json::from_value(serde_json::json!({
            "result": "showdown",
            "player_chips": player_chips,
            "bot_chips": bot_chips,
        }))
        .unwrap();
        let mut snapshot = HandSnapshot::from_start(&response);
        snapshot.finish();
        snapshot
    }

    #[test]
    fn only_eliminations_move_the_counters() {
        let mut score = ScoreBoard::new();
        score.record_hand(&terminal_snapshot(1200, 800));
        assert_eq!(score.player_wins, 0);
        assert_eq!(score.bot_wins, 0);
        assert_eq!(score.hands_played, 1);

        score.record_hand(&terminal_snapshot(2000, 0));
        assert_eq!(score.player_wins, 1);

        score.record_hand(&terminal_snapshot(0, 2000));
        assert_eq!(score.bot_wins, 1);
        assert_eq!(score.hands_played, 3);
    }

    #[test]
    fn wins_count_eliminations_regardless_of_result_tag() {
        // Same chip counts under different tags score identically.
        for tag in ["player_ended", "bot_ended", "bot_folded", "showdown"] {
            let response: EngineResponse = serde_json::from_value(serde_json::json!({
                "result": tag,
                "player_chips": 2000,
                "bot_chips": 0,
            }))
            .unwrap();
            let mut snapshot = HandSnapshot::from_start(&response);
            snapshot.finish();

            let mut score = ScoreBoard::new();
            score.record_hand(&snapshot);
            assert_eq!(score.player_wins, 1, "tag {tag}");
            assert_eq!(score.bot_wins, 0, "tag {tag}");
        }
    }

    #[test]
    fn blind_level_steps_every_fourth_hand() {
        let mut score = ScoreBoard::new();
        for hand in 1..=8u64 {
            let event = score.record_hand(&terminal_snapshot(900, 1100));
            match hand {
                4 => assert_eq!(event, Some(ScoreEvent::BlindsUp(2))),
                8 => assert_eq!(event, Some(ScoreEvent::BlindsUp(3))),
                _ => assert_eq!(event, None),
            }
        }
        assert_eq!(score.blind_level, 3);
    }
}
