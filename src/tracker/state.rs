//! Per-match mutable tracking state
//!
//! Everything the tracker mutates while following one match lives in a single
//! `TrackerState` value owned by the state machine. On match start or
//! abandonment the whole value is replaced, never patched field by field, so
//! no state can leak across match boundaries.

use super::events::EndReason;

/// Lifecycle phase of the tracked match. `Ended` is terminal; the machine is
/// replaced wholesale to track the next round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchPhase {
    Waiting,
    Active,
    Ended(EndReason),
}

/// Baseline `(over, ball)` position of the batting side, the authoritative
/// progress counter for ball detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProgressMark {
    pub over: u32,
    pub ball: u32,
}

impl ProgressMark {
    pub fn new(over: u32, ball: u32) -> Self {
        Self { over, ball }
    }

    pub fn total_balls(&self) -> u32 {
        self.over * 6 + self.ball
    }
}

/// All mutable tracking state for one match.
#[derive(Debug, Clone)]
pub struct TrackerState {
    pub phase: MatchPhase,
    /// Current innings, 1 or 2, meaningful only while Active.
    pub innings: u8,
    /// Round identifier captured when the match went Active.
    pub round_id: Option<String>,
    /// Batting side's progress at the previous tick; reset to zero when the
    /// innings changes so innings 2 numbers its overs from scratch.
    pub prev_progress: ProgressMark,
    /// Score texts at the previous tick, compared structurally.
    pub prev_scores: Option<(Option<String>, Option<String>)>,
    pub consecutive_errors: u32,
    pub waiting_ticks: u32,
}

impl TrackerState {
    pub fn new() -> Self {
        Self {
            phase: MatchPhase::Waiting,
            innings: 1,
            round_id: None,
            prev_progress: ProgressMark::default(),
            prev_scores: None,
            consecutive_errors: 0,
            waiting_ticks: 0,
        }
    }

    pub fn is_active(&self) -> bool {
        self.phase == MatchPhase::Active
    }

    pub fn is_ended(&self) -> bool {
        matches!(self.phase, MatchPhase::Ended(_))
    }
}

impl Default for TrackerState {
    fn default() -> Self {
        Self::new()
    }
}
