//! Chronological "has this happened before" queries over the index.
//!
//! The comparator is the whole subtlety: an occurrence counts iff it is
//! strictly earlier than the target match's start, or shares the start
//! timestamp AND belongs to the same match AND its `(innings, over_number)`
//! position precedes the target's. Equal-timestamp occurrences from a
//! different match are never counted, and a pattern never counts itself.

use super::index::Occurrence;
use super::signature::OccurrenceId;
use chrono::{DateTime, Utc};

/// The pattern instance being asked about.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryTarget<'a> {
    pub match_id: &'a str,
    /// Start timestamp of the target's match (all of a match's occurrences
    /// share it).
    pub start_time: DateTime<Utc>,
    /// `(innings, over_number)` when the target is a specific over; `None`
    /// for match-level patterns, which have no within-match ordering.
    pub over_position: Option<(u8, u32)>,
}

/// Query result: how many prior occurrences, and the most recent one.
#[derive(Debug, Clone, PartialEq)]
pub struct PatternHit {
    pub count: usize,
    pub last: Option<OccurrenceId>,
}

impl PatternHit {
    pub fn none() -> Self {
        PatternHit {
            count: 0,
            last: None,
        }
    }

    /// Text form for output columns; `"None"` when nothing preceded.
    pub fn last_label(&self) -> String {
        match &self.last {
            Some(id) => id.to_string(),
            None => "None".to_string(),
        }
    }
}

/// True iff `occurrence` strictly precedes the target in pattern time.
pub fn precedes(occurrence: &Occurrence, target: &QueryTarget<'_>) -> bool {
    if occurrence.timestamp < target.start_time {
        return true;
    }
    if occurrence.timestamp != target.start_time {
        return false;
    }
    // Same timestamp: only earlier overs of the same match qualify
    match (occurrence.id.over_position(), target.over_position) {
        (Some(position), Some(target_position)) => {
            occurrence.id.match_id() == target.match_id && position < target_position
        }
        _ => false,
    }
}

/// Scans one bucket and folds the occurrences that precede the target.
/// `last` is the greatest included timestamp, later scan position winning
/// ties. A missing bucket is an empty history.
pub fn prior_occurrences(bucket: Option<&Vec<Occurrence>>, target: &QueryTarget<'_>) -> PatternHit {
    let mut count = 0;
    let mut last: Option<(DateTime<Utc>, &OccurrenceId)> = None;

    for occurrence in bucket.into_iter().flatten() {
        if !precedes(occurrence, target) {
            continue;
        }
        count += 1;
        let newer = match last {
            Some((best, _)) => occurrence.timestamp >= best,
            None => true,
        };
        if newer {
            last = Some((occurrence.timestamp, &occurrence.id));
        }
    }

    PatternHit {
        count,
        last: last.map(|(_, id)| id.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 10, minute, 0).unwrap()
    }

    fn match_occ(minute: u32, id: &str) -> Occurrence {
        Occurrence {
            timestamp: at(minute),
            id: OccurrenceId::Match(id.to_string()),
        }
    }

    fn over_occ(minute: u32, match_id: &str, innings: u8, over_number: u32) -> Occurrence {
        Occurrence {
            timestamp: at(minute),
            id: OccurrenceId::Over {
                match_id: match_id.to_string(),
                innings,
                over_number,
            },
        }
    }

    fn match_target(minute: u32, id: &str) -> QueryTarget<'_> {
        QueryTarget {
            match_id: id,
            start_time: at(minute),
            over_position: None,
        }
    }

    #[test]
    fn test_strictly_earlier_counts() {
        let target = match_target(10, "B");
        assert!(precedes(&match_occ(5, "A"), &target));
        assert!(!precedes(&match_occ(10, "A"), &target));
        assert!(!precedes(&match_occ(15, "A"), &target));
    }

    #[test]
    fn test_self_not_counted() {
        // A match's own entry carries its own start timestamp
        let target = match_target(10, "B");
        assert!(!precedes(&match_occ(10, "B"), &target));
    }

    #[test]
    fn test_equal_timestamp_cross_match_excluded() {
        let target = QueryTarget {
            match_id: "B",
            start_time: at(10),
            over_position: Some((1, 2)),
        };
        // Same timestamp but a different match: never counted, whatever its
        // over position
        assert!(!precedes(&over_occ(10, "A", 1, 1), &target));
    }

    #[test]
    fn test_same_match_earlier_over_counted() {
        let target = QueryTarget {
            match_id: "B",
            start_time: at(10),
            over_position: Some((2, 1)),
        };
        assert!(precedes(&over_occ(10, "B", 1, 3), &target));
        assert!(precedes(&over_occ(10, "B", 1, 1), &target));
        // Itself and later overs do not
        assert!(!precedes(&over_occ(10, "B", 2, 1), &target));
        assert!(!precedes(&over_occ(10, "B", 2, 2), &target));
    }

    #[test]
    fn test_two_matches_same_pattern_ordering() {
        // T0 < T1: the earlier match sees nothing, the later sees one
        let bucket = vec![match_occ(0, "M0"), match_occ(1, "M1")];
        let hit0 = prior_occurrences(Some(&bucket), &match_target(0, "M0"));
        assert_eq!(hit0.count, 0);
        assert_eq!(hit0.last, None);
        assert_eq!(hit0.last_label(), "None");

        let hit1 = prior_occurrences(Some(&bucket), &match_target(1, "M1"));
        assert_eq!(hit1.count, 1);
        assert_eq!(hit1.last, Some(OccurrenceId::Match("M0".to_string())));
    }

    #[test]
    fn test_last_is_most_recent_prior() {
        let bucket = vec![match_occ(0, "M0"), match_occ(5, "M5"), match_occ(3, "M3")];
        let hit = prior_occurrences(Some(&bucket), &match_target(8, "M8"));
        assert_eq!(hit.count, 3);
        assert_eq!(hit.last_label(), "M5");
    }

    #[test]
    fn test_last_tie_broken_by_scan_order() {
        let bucket = vec![match_occ(5, "Ma"), match_occ(5, "Mb")];
        let hit = prior_occurrences(Some(&bucket), &match_target(8, "M8"));
        assert_eq!(hit.count, 2);
        assert_eq!(hit.last_label(), "Mb");
    }

    #[test]
    fn test_missing_bucket_is_empty_history() {
        let hit = prior_occurrences(None, &match_target(8, "M8"));
        assert_eq!(hit, PatternHit::none());
    }
}
