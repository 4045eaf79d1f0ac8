//! Card codes as the engine speaks them: two ASCII characters, rank
//! then suit (`"AH"`, `"9D"`, `"TC"`). A reserved token stands for a
//! face-down card.

use std::fmt;
use std::str::FromStr;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Valid rank characters, ascending.
pub const RANKS: &[u8; 13] = b"23456789TJQKA";

/// Valid suit characters: hearts, diamonds, clubs, spades.
pub const SUITS: &[u8; 4] = b"HDCS";

/// Wire token for a face-down card.
pub const HIDDEN_TOKEN: &str = "??";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CardError {
    #[error("card code must be two characters (got {0:?})")]
    BadLength(String),
    #[error("unknown rank {0:?}")]
    BadRank(char),
    #[error("unknown suit {0:?}")]
    BadSuit(char),
}

/// A single card code. Copyable; the two bytes are validated on parse.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Card {
    rank: u8,
    suit: u8,
}

impl Card {
    /// The face-down placeholder, equal to the wire hidden token.
    pub const HIDDEN: Card = Card {
        rank: b'?',
        suit: b'?',
    };

    pub fn parse(code: &str) -> Result<Self, CardError> {
        if code == HIDDEN_TOKEN {
            return Ok(Self::HIDDEN);
        }
        let bytes = code.as_bytes();
        if bytes.len() != 2 {
            return Err(CardError::BadLength(code.to_string()));
        }
        let rank = bytes[0].to_ascii_uppercase();
        let suit = bytes[1].to_ascii_uppercase();
        if !RANKS.contains(&rank) {
            return Err(CardError::BadRank(rank as char));
        }
        if !SUITS.contains(&suit) {
            return Err(CardError::BadSuit(suit as char));
        }
        Ok(Self { rank, suit })
    }

    pub fn is_hidden(&self) -> bool {
        *self == Self::HIDDEN
    }

    pub fn rank(&self) -> char {
        self.rank as char
    }

    pub fn suit(&self) -> char {
        self.suit as char
    }

    /// Suit glyph for terminal rendering; `?` for a hidden card.
    pub fn suit_glyph(&self) -> char {
        match self.suit {
            b'H' => '♥',
            b'D' => '♦',
            b'C' => '♣',
            b'S' => '♠',
            _ => '?',
        }
    }

    /// Hearts and diamonds render red at the table.
    pub fn is_red(&self) -> bool {
        matches!(self.suit, b'H' | b'D')
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.rank as char, self.suit as char)
    }
}

impl fmt::Debug for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Card({self})")
    }
}

impl FromStr for Card {
    type Err = CardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Card {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Card {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let code = String::deserialize(deserializer)?;
        Card::parse(&code).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_valid_codes() {
        let card = Card::parse("AH").unwrap();
        assert_eq!(card.rank(), 'A');
        assert_eq!(card.suit(), 'H');
        assert_eq!(card.to_string(), "AH");
        assert!(card.is_red());

        let card = Card::parse("tc").unwrap();
        assert_eq!(card.to_string(), "TC");
        assert!(!card.is_red());
    }

    #[test]
    fn rejects_malformed_codes() {
        assert_eq!(
            Card::parse("A"),
            Err(CardError::BadLength("A".to_string()))
        );
        assert_eq!(Card::parse("1H"), Err(CardError::BadRank('1')));
        assert_eq!(Card::parse("AX"), Err(CardError::BadSuit('X')));
        assert_eq!(
            Card::parse("AHH"),
            Err(CardError::BadLength("AHH".to_string()))
        );
    }

    #[test]
    fn hidden_token_round_trips() {
        let card = Card::parse(HIDDEN_TOKEN).unwrap();
        assert!(card.is_hidden());
        assert_eq!(card.to_string(), HIDDEN_TOKEN);
        assert_eq!(card.suit_glyph(), '?');
    }

    #[test]
    fn serde_uses_the_string_form() {
        let cards: Vec<Card> = serde_json::from_str(r#"["AH","9D","2C"]"#).unwrap();
        assert_eq!(cards.len(), 3);
        assert_eq!(serde_json::to_string(&cards[0]).unwrap(), r#""AH""#);

        let bad: Result<Card, _> = serde_json::from_str(r#""ZZ""#);
        assert!(bad.is_err());
    }
}
