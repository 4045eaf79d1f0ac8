//! Narration handling.
//!
//! The engine returns a human-readable event trace alongside structured
//! state. Lines are accumulated per hand in [`NarrationLog`] and
//! classified by [`extract`], a prefix-heuristic projection over the
//! trace. The heuristics are locale-coupled by nature; [`MarkerSet`]
//! keeps them in one replaceable place so an engine that emits
//! structured events can retire them entirely.

/// Append-only narration for the current hand. Cleared when a new hand
/// starts; grown by [`NarrationLog::absorb`] on every response.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NarrationLog {
    lines: Vec<String>,
}

impl NarrationLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Records incoming lines and returns how many were appended.
    ///
    /// Accepts either delivery mode: a cumulative payload (one that
    /// starts with everything already recorded) contributes only its
    /// tail, an incremental payload is appended whole. Already recorded
    /// lines are never duplicated and order is preserved.
    pub fn absorb(&mut self, incoming: &[String]) -> usize {
        let fresh = if incoming.len() >= self.lines.len()
            && incoming[..self.lines.len()] == self.lines[..]
        {
            &incoming[self.lines.len()..]
        } else {
            incoming
        };
        self.lines.extend_from_slice(fresh);
        fresh.len()
    }
}

/// Narration line categories recovered by [`extract`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Category {
    BotAction,
    PlayerAction,
    ShowdownBanner,
    WinnerAnnouncement,
    HandSummarySelf,
    HandSummaryOpponent,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::BotAction,
        Category::PlayerAction,
        Category::ShowdownBanner,
        Category::WinnerAnnouncement,
        Category::HandSummarySelf,
        Category::HandSummaryOpponent,
    ];
}

/// Marker strings for classifying narration lines. All comparisons are
/// case-insensitive; prefixes anchor at the start of a line, the draw
/// marker may appear anywhere in a winner announcement.
#[derive(Clone, Debug)]
pub struct MarkerSet {
    pub bot_action: String,
    /// `"player"` plus the localized first-person marker.
    pub player_action: Vec<String>,
    pub showdown: String,
    pub self_win: String,
    pub opponent_win: String,
    pub draw: String,
    pub summary_self: String,
    pub summary_opponent: String,
}

impl MarkerSet {
    /// Markers matching the narration of the legacy Spanish engine.
    ///
    /// The first-person marker is the accented `tú`, which keeps
    /// `"Tu mejor jugada"` (a hand summary) out of the player-action
    /// category.
    pub fn legacy_spanish() -> Self {
        Self {
            bot_action: "bot".to_string(),
            player_action: vec!["player".to_string(), "tú".to_string()],
            showdown: "showdown".to_string(),
            self_win: "¡ganas".to_string(),
            opponent_win: "el bot gana".to_string(),
            draw: "empate".to_string(),
            summary_self: "tu mejor jugada".to_string(),
            summary_opponent: "mejor jugada del bot".to_string(),
        }
    }

    fn matches(&self, category: Category, lowered: &str) -> bool {
        match category {
            Category::BotAction => lowered.starts_with(self.bot_action.as_str()),
            Category::PlayerAction => self
                .player_action
                .iter()
                .any(|marker| lowered.starts_with(marker.as_str())),
            Category::ShowdownBanner => lowered.starts_with(self.showdown.as_str()),
            Category::WinnerAnnouncement => {
                lowered.starts_with(self.self_win.as_str())
                    || lowered.starts_with(self.opponent_win.as_str())
                    || lowered.contains(self.draw.as_str())
            }
            Category::HandSummarySelf => lowered.starts_with(self.summary_self.as_str()),
            Category::HandSummaryOpponent => {
                lowered.starts_with(self.summary_opponent.as_str())
            }
        }
    }
}

impl Default for MarkerSet {
    fn default() -> Self {
        Self::legacy_spanish()
    }
}

/// Most recent matching line per category. A category with no match is
/// simply empty, never an error.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HandMessages {
    pub bot_action: Option<String>,
    pub player_action: Option<String>,
    pub showdown_banner: Option<String>,
    pub winner: Option<String>,
    pub summary_self: Option<String>,
    pub summary_opponent: Option<String>,
}

impl HandMessages {
    fn slot(&mut self, category: Category) -> &mut Option<String> {
        match category {
            Category::BotAction => &mut self.bot_action,
            Category::PlayerAction => &mut self.player_action,
            Category::ShowdownBanner => &mut self.showdown_banner,
            Category::WinnerAnnouncement => &mut self.winner,
            Category::HandSummarySelf => &mut self.summary_self,
            Category::HandSummaryOpponent => &mut self.summary_opponent,
        }
    }
}

/// Projects the narration onto per-category messages: for each category
/// the most recent matching line wins. Pure and idempotent; the input
/// is never modified.
pub fn extract(lines: &[String], markers: &MarkerSet) -> HandMessages {
    let mut messages = HandMessages::default();
    for line in lines.iter().rev() {
        let lowered = line.to_lowercase();
        for category in Category::ALL {
            let slot = messages.slot(category);
            if slot.is_none() && markers.matches(category, &lowered) {
                *slot = Some(line.clone());
            }
        }
    }
    messages
}
