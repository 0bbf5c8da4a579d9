//! Discrete match events derived from consecutive scoreboard snapshots.

use crate::snapshot::CardOutcome;
use serde::{Deserialize, Serialize};

/// Why a tracked match reached the Ended phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    /// Batting side's over counter reached the format cap.
    OversComplete,
    /// Batting side lost all its wickets.
    AllOut,
    /// Innings 2 runs strictly exceeded innings 1 runs.
    TargetChased,
    /// Scoreboard status text declared a result.
    ResultDeclared,
    /// Round identifier changed underneath the tracker; state discarded.
    RoundChanged,
    /// Waiting patience expired before the match ever started.
    NeverStarted,
    /// Too many consecutive parse failures after the match had started.
    ErrorThreshold,
}

impl EndReason {
    /// Abandoned matches never produced a playable result.
    pub fn is_abandoned(&self) -> bool {
        matches!(
            self,
            EndReason::RoundChanged | EndReason::NeverStarted | EndReason::ErrorThreshold
        )
    }
}

/// One ball inferred from a strict increase of the batting side's
/// total-balls-faced counter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BallEvent {
    pub innings: u8,
    /// Over counter as shown on the scoreboard after this ball.
    pub over: u32,
    /// Ball counter as shown on the scoreboard after this ball (0 right after
    /// an over completes).
    pub ball: u32,
    /// Position within the over, 1..=6. A scoreboard ball counter of 0 means
    /// the 6th ball of the over that just finished.
    pub position_in_over: u32,
    pub outcome: CardOutcome,
}

/// Events detected on one polling tick. All events for a tick are returned
/// together; their order within the tick is fixed (innings change first,
/// match end last).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum MatchEvent {
    InningsChanged {
        innings: u8,
    },
    /// The total-balls-faced counter advanced by more than one between two
    /// ticks. Only the newest ball's outcome is observable; the rest are
    /// reported as missed instead of being silently dropped.
    BallGap {
        missed: u32,
    },
    BallPlayed(BallEvent),
    OverCompleted {
        innings: u8,
        over_number: u32,
    },
    ScoreChanged {
        team1: Option<String>,
        team2: Option<String>,
    },
    MatchEnded {
        reason: EndReason,
    },
}

impl MatchEvent {
    pub fn is_ball(&self) -> bool {
        matches!(self, MatchEvent::BallPlayed(_))
    }

    pub fn is_match_end(&self) -> bool {
        matches!(self, MatchEvent::MatchEnded { .. })
    }
}
