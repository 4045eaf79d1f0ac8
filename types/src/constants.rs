/// Chips each seat holds at the start of a session. The engine refills
/// both stacks to this value after an elimination.
pub const STARTING_CHIPS: u64 = 1_000;

/// Small blind assumed when a response carries no `sb` field.
pub const DEFAULT_SMALL_BLIND: u64 = 10;

/// Big blind assumed when a response carries no `bb` field.
pub const DEFAULT_BIG_BLIND: u64 = 20;

/// Completed hands between display-side blind escalations.
pub const HANDS_PER_BLIND_LEVEL: u64 = 4;

/// Street index past the river: the hand can only resolve, never continue.
pub const SHOWDOWN_STREET: u8 = 4;

/// Board size a street is allowed to show (0 preflop, 3 flop, 4 turn,
/// 5 river and later).
pub fn board_len_for_street(street_index: u8) -> usize {
    match street_index {
        0 => 0,
        1 => 3,
        2 => 4,
        _ => 5,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn board_sizes_follow_streets() {
        assert_eq!(board_len_for_street(0), 0);
        assert_eq!(board_len_for_street(1), 3);
        assert_eq!(board_len_for_street(2), 4);
        assert_eq!(board_len_for_street(3), 5);
        assert_eq!(board_len_for_street(SHOWDOWN_STREET), 5);
    }
}
