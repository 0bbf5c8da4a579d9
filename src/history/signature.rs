//! Sequence signatures and occurrence identifiers.
//!
//! A signature is the canonical text form of a pattern: card symbols joined
//! with commas for sequences, `inn1|inn2` for a whole match. Two sequences
//! match iff their signatures are equal.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Comma-joined card sequence, the key for over and first-innings indices.
pub fn sequence_signature(cards: &[String]) -> String {
    cards.join(",")
}

/// Whole-match key: both innings sequences joined with `|`. The separator
/// keeps `inn1=[A], inn2=[2]` distinct from `inn1=[A,2], inn2=[]`.
pub fn full_match_signature(inn1_cards: &[String], inn2_cards: &[String]) -> String {
    format!(
        "{}|{}",
        sequence_signature(inn1_cards),
        sequence_signature(inn2_cards)
    )
}

/// Final-score key. Runs only; wickets and overs are not part of the pattern.
pub type FinalScore = (u32, u32);

/// What an index bucket entry points at: a whole match for match-level
/// patterns, a single over within a match for the over index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OccurrenceId {
    Match(String),
    Over {
        match_id: String,
        innings: u8,
        /// 1-based over number within its innings.
        over_number: u32,
    },
}

impl OccurrenceId {
    pub fn match_id(&self) -> &str {
        match self {
            OccurrenceId::Match(id) => id,
            OccurrenceId::Over { match_id, .. } => match_id,
        }
    }

    /// `(innings, over_number)` for over occurrences, the secondary ordering
    /// key inside one match.
    pub fn over_position(&self) -> Option<(u8, u32)> {
        match self {
            OccurrenceId::Match(_) => None,
            OccurrenceId::Over {
                innings,
                over_number,
                ..
            } => Some((*innings, *over_number)),
        }
    }
}

impl fmt::Display for OccurrenceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OccurrenceId::Match(id) => write!(f, "{}", id),
            OccurrenceId::Over {
                match_id,
                innings,
                over_number,
            } => write!(f, "{}_{}_{}", match_id, innings, over_number),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cards(symbols: &[&str]) -> Vec<String> {
        symbols.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_sequence_signature() {
        assert_eq!(sequence_signature(&cards(&["A", "10", "K"])), "A,10,K");
        assert_eq!(sequence_signature(&[]), "");
    }

    #[test]
    fn test_full_signature_separator() {
        let a = full_match_signature(&cards(&["A"]), &cards(&["2"]));
        let b = full_match_signature(&cards(&["A", "2"]), &[]);
        assert_eq!(a, "A|2");
        assert_eq!(b, "A,2|");
        assert_ne!(a, b);
    }

    #[test]
    fn test_over_id_label() {
        let id = OccurrenceId::Over {
            match_id: "4821".to_string(),
            innings: 2,
            over_number: 3,
        };
        assert_eq!(id.to_string(), "4821_2_3");
        assert_eq!(id.over_position(), Some((2, 3)));
        assert_eq!(id.match_id(), "4821");
    }
}
