//! Stamps the eight pattern-analysis fields onto a match's rows.
//!
//! Final-score and full-match values are identical on every row. First-
//! innings values carry the `"Current Inn1"` sentinel on every row of a
//! match that never reached innings 2; once innings 2 exists the computed
//! pair applies to all rows, innings-1 rows included, since the full
//! innings-1 sequence is only known once it ends. Over values are
//! back-applied to the 6 card rows of each just-completed over; rows inside
//! an unfinished over keep `0`/`"None"`.

use super::index::{group_by_match, innings_split, HistoryIndex};
use super::query::{prior_occurrences, PatternHit, QueryTarget};
use super::record::BallRecord;
use super::signature::sequence_signature;
use serde::{Deserialize, Serialize};

/// Input row plus the trailing analysis columns, in their stable output
/// order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotatedRecord {
    pub round_id: String,
    pub timestamp: String,
    pub ball_number: u32,
    pub card: String,
    pub team1_score: String,
    pub team2_score: String,
    pub team2_over: u32,
    pub team2_ball: u32,
    pub pattern_over_count: usize,
    pub pattern_over_last: String,
    pub pattern_inn1_count: usize,
    pub pattern_inn1_last: String,
    pub pattern_final_score_count: usize,
    pub pattern_final_score_last: String,
    pub pattern_match_count: usize,
    pub pattern_match_last: String,
}

impl AnnotatedRecord {
    fn base(record: &BallRecord) -> Self {
        AnnotatedRecord {
            round_id: record.round_id.clone(),
            timestamp: record.timestamp.clone(),
            ball_number: record.ball_number,
            card: record.card.clone(),
            team1_score: record.team1_score.clone(),
            team2_score: record.team2_score.clone(),
            team2_over: record.team2_over,
            team2_ball: record.team2_ball,
            pattern_over_count: 0,
            pattern_over_last: "None".to_string(),
            pattern_inn1_count: 0,
            pattern_inn1_last: "Current Inn1".to_string(),
            pattern_final_score_count: 0,
            pattern_final_score_last: "None".to_string(),
            pattern_match_count: 0,
            pattern_match_last: "None".to_string(),
        }
    }
}

/// Annotates one match's rows (already sorted by ball number).
pub fn annotate_match(index: &HistoryIndex, rows: &[&BallRecord]) -> Vec<AnnotatedRecord> {
    let mut out: Vec<AnnotatedRecord> = rows.iter().map(|r| AnnotatedRecord::base(r)).collect();

    let round_id = match rows.first() {
        Some(first) => first.round_id.as_str(),
        None => return out,
    };
    let summary = match index.summary(round_id) {
        Some(summary) => summary,
        None => {
            // Match was skipped at index time; rows keep default annotations
            return out;
        }
    };

    let match_target = QueryTarget {
        match_id: round_id,
        start_time: summary.start_time,
        over_position: None,
    };

    let final_score_hit = match summary.final_score {
        Some(score) => prior_occurrences(index.final_scores.get(&score), &match_target),
        None => PatternHit::none(),
    };
    let inn1_hit = prior_occurrences(
        index.first_innings.get(&summary.inn1_signature),
        &match_target,
    );
    let match_hit = match &summary.full_signature {
        Some(signature) => prior_occurrences(index.full_matches.get(signature), &match_target),
        None => PatternHit::none(),
    };

    let split = innings_split(rows);
    let innings1_complete = split.is_some();
    let mut current_cards: Vec<String> = Vec::new();
    // Output indices of card-bearing rows in the current innings, for
    // back-filling a completed over onto its 6 rows
    let mut card_row_positions: Vec<usize> = Vec::new();

    for (position, row) in rows.iter().enumerate() {
        let in_innings2 = split.map(|at| position >= at).unwrap_or(false);

        out[position].pattern_final_score_count = final_score_hit.count;
        out[position].pattern_final_score_last = final_score_hit.last_label();
        out[position].pattern_match_count = match_hit.count;
        out[position].pattern_match_last = match_hit.last_label();

        // Known only once innings 1 has ended, then applied to every row
        if innings1_complete {
            out[position].pattern_inn1_count = inn1_hit.count;
            out[position].pattern_inn1_last = inn1_hit.last_label();
        }

        // Card buffer restarts with the innings
        if split == Some(position) {
            current_cards.clear();
            card_row_positions.clear();
        }

        if row.has_card() {
            current_cards.push(row.card.trim().to_string());
            card_row_positions.push(position);
        }

        if !current_cards.is_empty() && current_cards.len() % 6 == 0 {
            let over_number = (current_cards.len() / 6) as u32;
            let innings = if in_innings2 { 2 } else { 1 };
            let signature = sequence_signature(&current_cards[current_cards.len() - 6..]);
            let over_target = QueryTarget {
                match_id: round_id,
                start_time: summary.start_time,
                over_position: Some((innings, over_number)),
            };
            let hit = prior_occurrences(index.overs.get(&signature), &over_target);

            let completed = &card_row_positions[card_row_positions.len() - 6..];
            for &card_position in completed {
                out[card_position].pattern_over_count = hit.count;
                out[card_position].pattern_over_last = hit.last_label();
            }
        }
    }

    out
}

/// Annotates every match in the corpus, in first-seen match order.
pub fn annotate_corpus(index: &HistoryIndex, records: &[BallRecord]) -> Vec<AnnotatedRecord> {
    let mut out = Vec::with_capacity(records.len());
    for (_, rows) in group_by_match(records) {
        out.extend(annotate_match(index, &rows));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ball(round: &str, ts: &str, n: u32, card: &str, t2_over: u32, t2_ball: u32) -> BallRecord {
        BallRecord {
            round_id: round.to_string(),
            timestamp: ts.to_string(),
            ball_number: n,
            card: card.to_string(),
            team1_score: "24-1 (4.0)".to_string(),
            team2_score: "18-0 (3.0)".to_string(),
            team2_over: t2_over,
            team2_ball: t2_ball,
        }
    }

    /// Full over of innings 1 then a full over of innings 2.
    fn two_over_match(round: &str, ts: &str) -> Vec<BallRecord> {
        let mut rows: Vec<BallRecord> = ["A", "2", "10", "K", "4", "6"]
            .iter()
            .enumerate()
            .map(|(i, c)| ball(round, ts, i as u32 + 1, c, 0, 0))
            .collect();
        for (i, c) in ["3", "A", "2", "2", "10", "4"].iter().enumerate() {
            let b = (i as u32 + 1) % 6;
            let o = if b == 0 { 1 } else { 0 };
            rows.push(ball(round, ts, i as u32 + 1, c, o, b));
        }
        rows
    }

    fn annotate_all(records: &[BallRecord]) -> Vec<AnnotatedRecord> {
        let index = HistoryIndex::build(records);
        annotate_corpus(&index, records)
    }

    #[test]
    fn test_first_match_sees_no_history() {
        let rows = two_over_match("100", "2024-03-01T10:00:00+00:00");
        let annotated = annotate_all(&rows);
        assert!(annotated
            .iter()
            .all(|r| r.pattern_match_count == 0 && r.pattern_match_last == "None"));
        assert!(annotated
            .iter()
            .all(|r| r.pattern_final_score_count == 0));
        // Both overs are unique within the match
        assert!(annotated.iter().all(|r| r.pattern_over_count == 0));
    }

    #[test]
    fn test_inn1_sentinel_while_innings_one_in_progress() {
        // A match that never reached innings 2 keeps the sentinel everywhere
        let rows: Vec<BallRecord> = ["A", "2", "10"]
            .iter()
            .enumerate()
            .map(|(i, c)| ball("100", "2024-03-01T10:00:00+00:00", i as u32 + 1, c, 0, 0))
            .collect();
        let annotated = annotate_all(&rows);
        for r in &annotated {
            assert_eq!(r.pattern_inn1_count, 0);
            assert_eq!(r.pattern_inn1_last, "Current Inn1");
        }
    }

    #[test]
    fn test_inn1_values_retroactive_once_innings_two_exists() {
        // Once innings 2 began, the computed pair applies to innings-1 rows too
        let rows = two_over_match("100", "2024-03-01T10:00:00+00:00");
        let annotated = annotate_all(&rows);
        for r in &annotated {
            assert_eq!(r.pattern_inn1_count, 0);
            assert_eq!(r.pattern_inn1_last, "None");
        }
    }

    #[test]
    fn test_repeat_match_counts_prior() {
        let mut corpus = two_over_match("100", "2024-03-01T10:00:00+00:00");
        corpus.extend(two_over_match("200", "2024-03-01T10:30:00+00:00"));
        let annotated = annotate_all(&corpus);
        let second = &annotated[12..];

        // Match-level patterns each saw match 100 once
        assert!(second.iter().all(|r| r.pattern_match_count == 1));
        assert!(second.iter().all(|r| r.pattern_match_last == "100"));
        assert!(second
            .iter()
            .all(|r| r.pattern_final_score_count == 1 && r.pattern_final_score_last == "100"));

        // Every row of the repeat sees the prior first innings, the
        // innings-1 rows retroactively
        assert!(second
            .iter()
            .all(|r| r.pattern_inn1_count == 1 && r.pattern_inn1_last == "100"));

        // Each over saw its counterpart in match 100
        assert!(second[..6]
            .iter()
            .all(|r| r.pattern_over_count == 1 && r.pattern_over_last == "100_1_1"));
        assert!(second[6..]
            .iter()
            .all(|r| r.pattern_over_count == 1 && r.pattern_over_last == "100_2_1"));
    }

    #[test]
    fn test_repeated_over_within_match_counts_earlier_over() {
        // Same 6 cards twice inside innings 1
        let cards = ["A", "2", "10", "K", "4", "6", "A", "2", "10", "K", "4", "6"];
        let rows: Vec<BallRecord> = cards
            .iter()
            .enumerate()
            .map(|(i, c)| ball("100", "2024-03-01T10:00:00+00:00", i as u32 + 1, c, 0, 0))
            .collect();
        let annotated = annotate_all(&rows);
        assert!(annotated[..6].iter().all(|r| r.pattern_over_count == 0));
        assert!(annotated[6..]
            .iter()
            .all(|r| r.pattern_over_count == 1 && r.pattern_over_last == "100_1_1"));
    }

    #[test]
    fn test_incomplete_over_rows_stay_default() {
        let rows: Vec<BallRecord> = ["A", "2", "10"]
            .iter()
            .enumerate()
            .map(|(i, c)| ball("100", "2024-03-01T10:00:00+00:00", i as u32 + 1, c, 0, 0))
            .collect();
        let annotated = annotate_all(&rows);
        assert!(annotated
            .iter()
            .all(|r| r.pattern_over_count == 0 && r.pattern_over_last == "None"));
    }

    #[test]
    fn test_cardless_rows_excluded_from_over_backfill() {
        // A score-only row sits between two card rows; the over completes on
        // the 7th row and back-fills only the 6 card rows
        let mut rows = Vec::new();
        for (i, c) in ["A", "2", "10"].iter().enumerate() {
            rows.push(ball("100", "2024-03-01T10:00:00+00:00", i as u32 + 1, c, 0, 0));
        }
        rows.push(ball("100", "2024-03-01T10:00:00+00:00", 4, "", 0, 0));
        for (i, c) in ["K", "4", "6"].iter().enumerate() {
            rows.push(ball("100", "2024-03-01T10:00:00+00:00", i as u32 + 5, c, 0, 0));
        }
        // Prior match with the same over makes the count visible
        let mut corpus: Vec<BallRecord> = ["A", "2", "10", "K", "4", "6"]
            .iter()
            .enumerate()
            .map(|(i, c)| ball("090", "2024-03-01T09:00:00+00:00", i as u32 + 1, c, 0, 0))
            .collect();
        corpus.extend(rows);

        let annotated = annotate_all(&corpus);
        let second = &annotated[6..];
        assert_eq!(second.len(), 7);
        // The cardless row keeps defaults
        assert_eq!(second[3].pattern_over_count, 0);
        assert_eq!(second[3].pattern_over_last, "None");
        for (i, r) in second.iter().enumerate() {
            if i != 3 {
                assert_eq!(r.pattern_over_count, 1, "row {}", i);
                assert_eq!(r.pattern_over_last, "090_1_1");
            }
        }
    }

    #[test]
    fn test_annotation_idempotent() {
        let mut corpus = two_over_match("100", "2024-03-01T10:00:00+00:00");
        corpus.extend(two_over_match("200", "2024-03-01T10:30:00+00:00"));
        let a = annotate_all(&corpus);
        let b = annotate_all(&corpus);
        assert_eq!(a, b);
    }
}
