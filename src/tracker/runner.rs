//! Poll loop wiring a telemetry source to the state machine and a sink.
//!
//! The loop is single threaded: one poll, one machine tick, one dispatch,
//! one sleep. Sink failures are logged and never touch match state.

use super::events::{BallEvent, MatchEvent};
use super::machine::LiveStateMachine;
use crate::config::TrackerConfig;
use crate::history::BallRecord;
use crate::snapshot::RawObservation;
use crate::storage::EventSink;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::Path;
use tokio::time::Duration;

/// One telemetry poll result.
#[derive(Debug)]
pub enum SourcePoll {
    Observation(RawObservation),
    /// Nothing usable this tick (page not ready, parse failure upstream).
    Unavailable,
    /// The source has no further ticks; only replay sources ever report this.
    Exhausted,
}

#[async_trait]
pub trait TelemetrySource: Send {
    async fn poll(&mut self) -> SourcePoll;
}

/// Replays a JSONL capture, one line per tick. A `null` line is an
/// unavailable tick; a malformed line is logged and treated the same.
pub struct ReplaySource {
    lines: Lines<BufReader<File>>,
    line_number: usize,
}

impl ReplaySource {
    pub fn open(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let file = File::open(path.as_ref())?;
        log::info!("▶️  Replaying ticks from {}", path.as_ref().display());
        Ok(Self {
            lines: BufReader::new(file).lines(),
            line_number: 0,
        })
    }
}

#[async_trait]
impl TelemetrySource for ReplaySource {
    async fn poll(&mut self) -> SourcePoll {
        self.line_number += 1;
        match self.lines.next() {
            None => SourcePoll::Exhausted,
            Some(Err(e)) => {
                log::warn!("Replay line {}: read error: {}", self.line_number, e);
                SourcePoll::Unavailable
            }
            Some(Ok(line)) if line.trim().is_empty() => SourcePoll::Unavailable,
            Some(Ok(line)) => match serde_json::from_str::<Option<RawObservation>>(&line) {
                Ok(Some(observation)) => SourcePoll::Observation(observation),
                Ok(None) => SourcePoll::Unavailable,
                Err(e) => {
                    log::warn!("Replay line {}: bad observation: {}", self.line_number, e);
                    SourcePoll::Unavailable
                }
            },
        }
    }
}

/// Drives the machine from a source, turning ball events into persisted
/// records. Tracks matches back to back until the source is exhausted.
pub struct MatchTracker<S: TelemetrySource, K: EventSink> {
    machine: LiveStateMachine,
    source: S,
    sink: K,
    poll_interval: Duration,
    now_fn: fn() -> DateTime<Utc>,
    /// 1-based ball counter, restarting at each innings.
    ball_number: u32,
    matches_tracked: u32,
}

impl<S: TelemetrySource, K: EventSink> MatchTracker<S, K> {
    pub fn new(config: TrackerConfig, source: S, sink: K) -> Self {
        let poll_interval = Duration::from_millis(config.poll_interval_ms);
        Self {
            machine: LiveStateMachine::new(config),
            source,
            sink,
            poll_interval,
            now_fn: Utc::now,
            ball_number: 0,
            matches_tracked: 0,
        }
    }

    /// Replaces the clock used to stamp ball records.
    pub fn with_now_fn(mut self, now_fn: fn() -> DateTime<Utc>) -> Self {
        self.now_fn = now_fn;
        self
    }

    pub fn matches_tracked(&self) -> u32 {
        self.matches_tracked
    }

    /// Runs until the source is exhausted, resetting after each match so
    /// consecutive rounds are tracked back to back. Returns the number of
    /// matches that reached an end state.
    pub async fn run(&mut self) -> u32 {
        log::info!("🏏 Tracker started ({} sink)", self.sink.backend_type());

        loop {
            let observation = match self.source.poll().await {
                SourcePoll::Observation(obs) => Some(obs),
                SourcePoll::Unavailable => None,
                SourcePoll::Exhausted => break,
            };

            let events = self.machine.tick(observation.as_ref());
            let ended = self.dispatch(&events).await;

            if ended {
                self.matches_tracked += 1;
                if let Err(e) = self.sink.flush().await {
                    log::error!("❌ Sink flush failed: {}", e);
                }
                self.machine.reset();
                self.ball_number = 0;
            }

            if !self.poll_interval.is_zero() {
                tokio::time::sleep(self.poll_interval).await;
            }
        }

        if let Err(e) = self.sink.flush().await {
            log::error!("❌ Sink flush failed: {}", e);
        }
        log::info!("🏁 Source exhausted after {} matches", self.matches_tracked);
        self.matches_tracked
    }

    /// Routes one tick's events to the sink. Returns true when the tick
    /// ended the match.
    async fn dispatch(&mut self, events: &[MatchEvent]) -> bool {
        let mut ended = false;
        for event in events {
            match event {
                MatchEvent::InningsChanged { .. } => {
                    self.ball_number = 0;
                }
                MatchEvent::BallPlayed(ball) => {
                    self.ball_number += 1;
                    let record = self.make_record(ball);
                    if let Err(e) = self.sink.record_ball(&record).await {
                        log::error!("❌ Ball record write failed: {}", e);
                    }
                }
                MatchEvent::MatchEnded { .. } => {
                    ended = true;
                }
                _ => {}
            }
            if let Err(e) = self.sink.record_event(event).await {
                log::error!("❌ Event write failed: {}", e);
            }
        }
        ended
    }

    fn make_record(&self, ball: &BallEvent) -> BallRecord {
        let snapshot = self.machine.last_snapshot();
        let score = |team: Option<&crate::snapshot::TeamScore>| {
            team.map(|t| t.score_text.clone()).unwrap_or_default()
        };
        let team2 = snapshot.and_then(|s| s.team2.as_ref());
        BallRecord {
            round_id: self
                .machine
                .round_id()
                .unwrap_or("unknown")
                .to_string(),
            timestamp: (self.now_fn)().to_rfc3339(),
            ball_number: self.ball_number,
            card: ball.outcome.symbol().to_string(),
            team1_score: score(snapshot.and_then(|s| s.team1.as_ref())),
            team2_score: score(team2),
            team2_over: team2.map(|t| t.over).unwrap_or(0),
            team2_ball: team2.map(|t| t.ball).unwrap_or(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TrackerConfig;
    use crate::snapshot::{RawBallGlyph, RawTeamRow};
    use crate::storage::SinkError;
    use crate::tracker::EndReason;
    use std::collections::VecDeque;

    struct ScriptedSource {
        ticks: VecDeque<Option<RawObservation>>,
    }

    impl ScriptedSource {
        fn new(ticks: Vec<Option<RawObservation>>) -> Self {
            Self {
                ticks: ticks.into(),
            }
        }
    }

    #[async_trait]
    impl TelemetrySource for ScriptedSource {
        async fn poll(&mut self) -> SourcePoll {
            match self.ticks.pop_front() {
                Some(Some(obs)) => SourcePoll::Observation(obs),
                Some(None) => SourcePoll::Unavailable,
                None => SourcePoll::Exhausted,
            }
        }
    }

    #[derive(Default)]
    struct CollectSink {
        balls: Vec<BallRecord>,
        events: Vec<MatchEvent>,
        flushes: usize,
    }

    #[async_trait]
    impl EventSink for CollectSink {
        async fn record_ball(&mut self, record: &BallRecord) -> Result<(), SinkError> {
            self.balls.push(record.clone());
            Ok(())
        }

        async fn record_event(&mut self, event: &MatchEvent) -> Result<(), SinkError> {
            self.events.push(event.clone());
            Ok(())
        }

        async fn flush(&mut self) -> Result<(), SinkError> {
            self.flushes += 1;
            Ok(())
        }

        fn backend_type(&self) -> &'static str {
            "collect"
        }
    }

    fn obs(round: &str, t1: &str, t2: &str, glyph: Option<&str>) -> Option<RawObservation> {
        Some(RawObservation {
            round_id: Some(round.to_string()),
            teams: vec![
                RawTeamRow {
                    name: "AUS".to_string(),
                    score: t1.to_string(),
                },
                RawTeamRow {
                    name: "IND".to_string(),
                    score: t2.to_string(),
                },
            ],
            balls: glyph
                .map(|text| {
                    vec![RawBallGlyph {
                        text: text.to_string(),
                        is_four: false,
                        is_six: false,
                        is_wicket: text == "W",
                    }]
                })
                .unwrap_or_default(),
            status_text: None,
        })
    }

    fn fixed_now() -> DateTime<Utc> {
        chrono::TimeZone::with_ymd_and_hms(&Utc, 2024, 3, 1, 10, 0, 0).unwrap()
    }

    fn config() -> TrackerConfig {
        TrackerConfig {
            poll_interval_ms: 0,
            ..TrackerConfig::default()
        }
    }

    fn chase_ticks(round: &str) -> Vec<Option<RawObservation>> {
        vec![
            obs(round, "0-0 (0.0)", "0-0 (0.0)", None),
            obs(round, "4-0 (0.1)", "0-0 (0.0)", Some("4")),
            obs(round, "10-0 (0.2)", "0-0 (0.0)", Some("6")),
            // First innings ends off screen; team 2 starts batting
            obs(round, "10-0 (0.2)", "6-0 (0.1)", Some("6")),
            obs(round, "10-0 (0.2)", "12-0 (0.2)", Some("6")),
        ]
    }

    async fn run_tracker(
        ticks: Vec<Option<RawObservation>>,
    ) -> (u32, CollectSink) {
        let mut tracker = MatchTracker::new(config(), ScriptedSource::new(ticks), CollectSink::default())
            .with_now_fn(fixed_now);
        let matches = tracker.run().await;
        (matches, tracker.sink)
    }

    #[tokio::test]
    async fn test_ball_records_carry_snapshot_context() {
        let (matches, sink) = run_tracker(chase_ticks("500")).await;
        assert_eq!(matches, 1);
        // 2 innings-1 balls, 2 innings-2 balls; chase ends on the last
        assert_eq!(sink.balls.len(), 4);

        let first = &sink.balls[0];
        assert_eq!(first.round_id, "500");
        assert_eq!(first.ball_number, 1);
        assert_eq!(first.card, "4");
        assert_eq!(first.team1_score, "4-0 (0.1)");
        assert_eq!(first.timestamp, fixed_now().to_rfc3339());
        assert_eq!(first.team2_over, 0);
        assert_eq!(first.team2_ball, 0);
    }

    #[tokio::test]
    async fn test_ball_numbering_restarts_per_innings() {
        let (_, sink) = run_tracker(chase_ticks("500")).await;
        let numbers: Vec<u32> = sink.balls.iter().map(|b| b.ball_number).collect();
        assert_eq!(numbers, vec![1, 2, 1, 2]);
        // Innings-2 rows carry team-2 progress
        assert_eq!(sink.balls[2].team2_ball, 1);
        assert_eq!(sink.balls[3].team2_ball, 2);
    }

    #[tokio::test]
    async fn test_match_end_recorded_and_flushed() {
        let (matches, sink) = run_tracker(chase_ticks("500")).await;
        assert_eq!(matches, 1);
        assert!(sink.events.iter().any(|e| matches!(
            e,
            MatchEvent::MatchEnded {
                reason: EndReason::TargetChased
            }
        )));
        // Once at match end, once at source exhaustion
        assert_eq!(sink.flushes, 2);
    }

    #[tokio::test]
    async fn test_back_to_back_matches() {
        let mut ticks = chase_ticks("500");
        ticks.extend(chase_ticks("501"));
        let (matches, sink) = run_tracker(ticks).await;
        assert_eq!(matches, 2);
        assert_eq!(sink.balls.len(), 8);
        // Second match starts its numbering over
        assert_eq!(sink.balls[4].round_id, "501");
        assert_eq!(sink.balls[4].ball_number, 1);
    }

    #[tokio::test]
    async fn test_unavailable_ticks_are_tolerated() {
        let mut ticks = chase_ticks("500");
        ticks.insert(2, None);
        ticks.insert(3, None);
        let (matches, sink) = run_tracker(ticks).await;
        assert_eq!(matches, 1);
        assert_eq!(sink.balls.len(), 4);
    }

    #[tokio::test]
    async fn test_replay_source_rows() {
        use std::io::Write;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ticks.jsonl");
        let mut file = std::fs::File::create(&path).unwrap();
        let tick = obs("500", "4-0 (0.1)", "0-0 (0.0)", Some("4")).unwrap();
        writeln!(file, "{}", serde_json::to_string(&tick).unwrap()).unwrap();
        writeln!(file, "null").unwrap();
        writeln!(file, "{{not json").unwrap();
        drop(file);

        let mut source = ReplaySource::open(&path).unwrap();
        assert!(matches!(source.poll().await, SourcePoll::Observation(_)));
        assert!(matches!(source.poll().await, SourcePoll::Unavailable));
        assert!(matches!(source.poll().await, SourcePoll::Unavailable));
        assert!(matches!(source.poll().await, SourcePoll::Exhausted));
    }
}
