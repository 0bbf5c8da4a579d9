//! Live match state machine
//!
//! Consumes one normalized snapshot per polling tick and emits the discrete
//! events the tick implies. Holds exactly one match's tracking state; when a
//! match ends or is abandoned the state value is replaced, never reused.

use super::detector;
use super::events::{EndReason, MatchEvent};
use super::state::{MatchPhase, ProgressMark, TrackerState};
use crate::config::TrackerConfig;
use crate::snapshot::{RawObservation, Snapshot};

pub struct LiveStateMachine {
    config: TrackerConfig,
    state: TrackerState,
    /// Last snapshot that parsed, kept so the runner can stamp ball records
    /// with the score context they were observed under.
    last_snapshot: Option<Snapshot>,
}

impl LiveStateMachine {
    pub fn new(config: TrackerConfig) -> Self {
        Self {
            config,
            state: TrackerState::new(),
            last_snapshot: None,
        }
    }

    pub fn phase(&self) -> MatchPhase {
        self.state.phase
    }

    pub fn innings(&self) -> u8 {
        self.state.innings
    }

    pub fn round_id(&self) -> Option<&str> {
        self.state.round_id.as_deref()
    }

    pub fn last_snapshot(&self) -> Option<&Snapshot> {
        self.last_snapshot.as_ref()
    }

    /// Discard all per-match state and start waiting for the next round.
    pub fn reset(&mut self) {
        self.state = TrackerState::new();
        self.last_snapshot = None;
    }

    /// Process one polling tick. `None` means the telemetry source had
    /// nothing usable this tick.
    pub fn tick(&mut self, observation: Option<&RawObservation>) -> Vec<MatchEvent> {
        if self.state.is_ended() {
            return Vec::new();
        }

        let snapshot = observation.map(Snapshot::normalize);
        match snapshot {
            Some(snap) if snap.has_score_rows() => self.on_snapshot(snap),
            Some(snap) if snap.round_id.is_some() && self.round_changed(&snap) => {
                // The scoreboard moved to a new round while this match was
                // mid-flight; abandon rather than merge.
                self.end_match(EndReason::RoundChanged)
            }
            _ => self.on_no_data(),
        }
    }

    fn round_changed(&self, snapshot: &Snapshot) -> bool {
        match (self.state.round_id.as_deref(), snapshot.round_id.as_deref()) {
            (Some(tracked), Some(seen)) => tracked != seen,
            _ => false,
        }
    }

    fn on_no_data(&mut self) -> Vec<MatchEvent> {
        match self.state.phase {
            MatchPhase::Waiting => {
                self.state.waiting_ticks += 1;
                if self.state.waiting_ticks % 10 == 0 {
                    log::info!(
                        "⏳ Waiting for match to start ({}/{})",
                        self.state.waiting_ticks,
                        self.config.max_waiting_ticks
                    );
                }
                if self.state.waiting_ticks >= self.config.max_waiting_ticks {
                    log::warn!(
                        "Match did not start after {} ticks, giving up",
                        self.state.waiting_ticks
                    );
                    return self.end_match(EndReason::NeverStarted);
                }
                Vec::new()
            }
            MatchPhase::Active => {
                self.state.consecutive_errors += 1;
                if self.state.consecutive_errors > self.config.max_consecutive_errors {
                    log::warn!(
                        "Too many consecutive parse failures ({}), match likely ended",
                        self.state.consecutive_errors
                    );
                    return self.end_match(EndReason::ErrorThreshold);
                }
                Vec::new()
            }
            MatchPhase::Ended(_) => Vec::new(),
        }
    }

    fn on_snapshot(&mut self, snapshot: Snapshot) -> Vec<MatchEvent> {
        if self.round_changed(&snapshot) {
            return self.end_match(EndReason::RoundChanged);
        }

        let mut events = Vec::new();

        if self.state.phase == MatchPhase::Waiting {
            log::info!(
                "🟢 Match started (round {})",
                snapshot.round_id.as_deref().unwrap_or("unknown")
            );
            self.state.phase = MatchPhase::Active;
            self.state.innings = 1;
            self.state.round_id = snapshot.round_id.clone();
            self.state.waiting_ticks = 0;
        }
        self.state.consecutive_errors = 0;

        // Innings change first: it resets the progress baseline the ball
        // diff below runs against, so innings 2 numbers overs from zero.
        if detector::innings_changed(&snapshot, self.state.innings) {
            log::info!("🏏 Innings change: innings 2 started");
            self.state.innings = 2;
            self.state.prev_progress = ProgressMark::default();
            events.push(MatchEvent::InningsChanged { innings: 2 });
        }

        let batting = if self.state.innings == 1 {
            snapshot.team1.as_ref()
        } else {
            snapshot.team2.as_ref()
        };

        match batting {
            Some(batting) => {
                events.extend(detector::progress_events(
                    self.state.prev_progress,
                    batting,
                    self.state.innings,
                    snapshot.last_ball,
                ));
                self.state.prev_progress = ProgressMark::new(batting.over, batting.ball);
            }
            None => {
                // Scorecard visible but the batting row failed to parse;
                // treated like any other transient parse failure.
                self.state.consecutive_errors += 1;
            }
        }

        if detector::score_changed(self.state.prev_scores.as_ref(), &snapshot) {
            let (t1, t2) = snapshot.score_pair();
            events.push(MatchEvent::ScoreChanged {
                team1: t1.map(|s| s.to_string()),
                team2: t2.map(|s| s.to_string()),
            });
            self.state.prev_scores = Some((
                t1.map(|s| s.to_string()),
                t2.map(|s| s.to_string()),
            ));
        }

        if let Some(reason) = detector::end_reason(&snapshot, self.state.innings, &self.config.format)
        {
            self.last_snapshot = Some(snapshot);
            events.extend(self.end_match(reason));
            return events;
        }

        self.last_snapshot = Some(snapshot);
        events
    }

    fn end_match(&mut self, reason: EndReason) -> Vec<MatchEvent> {
        log::info!("🏁 Match ended: {:?}", reason);
        self.state.phase = MatchPhase::Ended(reason);
        vec![MatchEvent::MatchEnded { reason }]
    }
}
