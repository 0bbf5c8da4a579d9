//! Persisted ball record, the contract between the live tracker and the
//! offline analysis pass.
//!
//! Column names double as the CSV header and the SQLite column names. The
//! `card` column carries the symbol (`10`, `A`, `2`, `3`, `4`, `6`, `K`);
//! an empty string means the outcome was not observed for that ball.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BallRecord {
    pub round_id: String,
    /// RFC 3339 timestamp of the tick the ball was observed on. Kept as text
    /// so rows written by older collectors (naive local timestamps) still
    /// round-trip unchanged.
    pub timestamp: String,
    /// 1-based ball counter, restarting at each innings.
    pub ball_number: u32,
    pub card: String,
    pub team1_score: String,
    pub team2_score: String,
    pub team2_over: u32,
    pub team2_ball: u32,
}

impl BallRecord {
    /// Rows without a card symbol exist (score-only ticks, unknown outcomes
    /// written as empty) and are excluded from sequence signatures.
    pub fn has_card(&self) -> bool {
        let card = self.card.trim();
        !card.is_empty() && card != "nan"
    }

    /// Team 2 having any over/ball progress marks the row as innings 2.
    pub fn team2_started(&self) -> bool {
        self.team2_over > 0 || self.team2_ball > 0
    }

    pub fn parsed_timestamp(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(&self.timestamp)
    }
}

/// RFC 3339 first, then a naive `YYYY-MM-DDTHH:MM:SS[.frac]` fallback read as
/// UTC. Collectors that stamped rows with a local wall clock produced the
/// naive form.
pub fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(text) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Runs component of a score text like `"39-1 (3.0)"` or `"39/1"`. Returns
/// `None` when no leading integer can be extracted.
pub fn parse_runs(score_text: &str) -> Option<u32> {
    let head = score_text.split_whitespace().next()?;
    let runs = head.split(['-', '/']).next()?;
    runs.trim().parse().ok()
}
