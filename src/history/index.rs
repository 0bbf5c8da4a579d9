//! Signature indices over a corpus of ball records.
//!
//! One pass over the corpus, grouped by round id in first-seen order, builds
//! four indices (over sequence, first-innings sequence, final score, full
//! match). Rebuilding from the same corpus yields the same index.

use super::record::{parse_runs, BallRecord};
use super::signature::{full_match_signature, sequence_signature, FinalScore, OccurrenceId};
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// One indexed sighting of a pattern. Bucket order is corpus scan order.
#[derive(Debug, Clone, PartialEq)]
pub struct Occurrence {
    pub timestamp: DateTime<Utc>,
    pub id: OccurrenceId,
}

/// Per-match facts computed during indexing, reused by the annotation pass.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchSummary {
    pub round_id: String,
    pub start_time: DateTime<Utc>,
    /// Empty string when innings 1 produced no cards.
    pub inn1_signature: String,
    /// `None` when the match produced no cards at all.
    pub full_signature: Option<String>,
    /// `None` when either final score text failed to parse; such a match
    /// contributes no final-score entry.
    pub final_score: Option<FinalScore>,
}

#[derive(Debug, Default, PartialEq)]
pub struct HistoryIndex {
    pub overs: HashMap<String, Vec<Occurrence>>,
    pub first_innings: HashMap<String, Vec<Occurrence>>,
    pub final_scores: HashMap<FinalScore, Vec<Occurrence>>,
    pub full_matches: HashMap<String, Vec<Occurrence>>,
    summaries: HashMap<String, MatchSummary>,
}

/// Groups rows by round id, preserving first-seen match order, each match's
/// rows in play order. Ball numbers restart at each innings, so the sort key
/// is `(innings marker, ball_number)`, not the ball number alone.
pub fn group_by_match(records: &[BallRecord]) -> Vec<(String, Vec<&BallRecord>)> {
    let mut order: Vec<String> = Vec::new();
    let mut groups: HashMap<String, Vec<&BallRecord>> = HashMap::new();

    for record in records {
        groups
            .entry(record.round_id.clone())
            .or_insert_with(|| {
                order.push(record.round_id.clone());
                Vec::new()
            })
            .push(record);
    }

    order
        .into_iter()
        .map(|round_id| {
            let mut rows = groups.remove(&round_id).unwrap_or_default();
            rows.sort_by_key(|r| (r.team2_started(), r.ball_number));
            (round_id, rows)
        })
        .collect()
}

/// Card symbols of the rows that carry one, in play order.
pub fn card_sequence(rows: &[&BallRecord]) -> Vec<String> {
    rows.iter()
        .filter(|r| r.has_card())
        .map(|r| r.card.trim().to_string())
        .collect()
}

/// Innings split point: index of the first row where team 2 has any
/// over/ball progress. `None` means the whole match is innings 1.
pub fn innings_split(rows: &[&BallRecord]) -> Option<usize> {
    rows.iter().position(|r| r.team2_started())
}

impl HistoryIndex {
    pub fn build(records: &[BallRecord]) -> Self {
        let mut index = HistoryIndex::default();

        for (round_id, rows) in group_by_match(records) {
            let start_time = match rows.first().and_then(|r| r.parsed_timestamp()) {
                Some(ts) => ts,
                None => {
                    log::warn!(
                        "Skipping match {} from index: unparseable start timestamp",
                        round_id
                    );
                    continue;
                }
            };

            let (inn1_rows, inn2_rows) = match innings_split(&rows) {
                Some(at) => rows.split_at(at),
                None => (&rows[..], &[][..]),
            };
            let inn1_cards = card_sequence(inn1_rows);
            let inn2_cards = card_sequence(inn2_rows);

            let inn1_signature = sequence_signature(&inn1_cards);
            if !inn1_cards.is_empty() {
                index
                    .first_innings
                    .entry(inn1_signature.clone())
                    .or_default()
                    .push(Occurrence {
                        timestamp: start_time,
                        id: OccurrenceId::Match(round_id.clone()),
                    });
            }

            for (innings, cards) in [(1u8, &inn1_cards), (2u8, &inn2_cards)] {
                // Consecutive non-overlapping 6-card overs; a trailing
                // partial group is never indexed.
                for (i, chunk) in cards.chunks_exact(6).enumerate() {
                    index
                        .overs
                        .entry(sequence_signature(chunk))
                        .or_default()
                        .push(Occurrence {
                            timestamp: start_time,
                            id: OccurrenceId::Over {
                                match_id: round_id.clone(),
                                innings,
                                over_number: i as u32 + 1,
                            },
                        });
                }
            }

            let final_score = rows.last().and_then(|last| {
                Some((parse_runs(&last.team1_score)?, parse_runs(&last.team2_score)?))
            });
            if let Some(score) = final_score {
                index.final_scores.entry(score).or_default().push(Occurrence {
                    timestamp: start_time,
                    id: OccurrenceId::Match(round_id.clone()),
                });
            }

            let full_signature = if inn1_cards.is_empty() && inn2_cards.is_empty() {
                None
            } else {
                Some(full_match_signature(&inn1_cards, &inn2_cards))
            };
            if let Some(sig) = full_signature.clone() {
                index.full_matches.entry(sig).or_default().push(Occurrence {
                    timestamp: start_time,
                    id: OccurrenceId::Match(round_id.clone()),
                });
            }

            index.summaries.insert(
                round_id.clone(),
                MatchSummary {
                    round_id,
                    start_time,
                    inn1_signature,
                    full_signature,
                    final_score,
                },
            );
        }

        index
    }

    pub fn summary(&self, round_id: &str) -> Option<&MatchSummary> {
        self.summaries.get(round_id)
    }

    pub fn match_count(&self) -> usize {
        self.summaries.len()
    }
}
