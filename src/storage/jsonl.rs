//! JSONL ball sink: ball records and lifecycle events as one JSON object per
//! line, appended to a single file.

use super::{EventSink, SinkError};
use crate::history::BallRecord;
use crate::tracker::MatchEvent;
use async_trait::async_trait;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

pub struct JsonlBallSink {
    file: BufWriter<File>,
}

impl JsonlBallSink {
    pub fn new(path: impl AsRef<Path>) -> Result<Self, SinkError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        log::info!("📄 JSONL event log at {}", path.display());
        Ok(Self {
            file: BufWriter::new(file),
        })
    }

    fn write_line<T: serde::Serialize>(&mut self, value: &T) -> Result<(), SinkError> {
        let json = serde_json::to_string(value)?;
        writeln!(self.file, "{}", json)?;
        self.file.flush()?;
        Ok(())
    }
}

#[async_trait]
impl EventSink for JsonlBallSink {
    async fn record_ball(&mut self, record: &BallRecord) -> Result<(), SinkError> {
        self.write_line(record)
    }

    async fn record_event(&mut self, event: &MatchEvent) -> Result<(), SinkError> {
        self.write_line(event)
    }

    async fn flush(&mut self) -> Result<(), SinkError> {
        self.file.flush()?;
        Ok(())
    }

    fn backend_type(&self) -> &'static str {
        "JSONL"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracker::EndReason;

    #[tokio::test]
    async fn test_events_and_balls_interleave() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.jsonl");
        let mut sink = JsonlBallSink::new(&path).unwrap();

        sink.record_event(&MatchEvent::InningsChanged { innings: 2 })
            .await
            .unwrap();
        sink.record_ball(&BallRecord {
            round_id: "100".to_string(),
            timestamp: "2024-03-01T10:00:00+00:00".to_string(),
            ball_number: 1,
            card: "A".to_string(),
            team1_score: "40-2 (5.0)".to_string(),
            team2_score: "1-0 (0.1)".to_string(),
            team2_over: 0,
            team2_ball: 1,
        })
        .await
        .unwrap();
        sink.record_event(&MatchEvent::MatchEnded {
            reason: EndReason::TargetChased,
        })
        .await
        .unwrap();
        sink.flush().await.unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("\"innings_changed\""));
        assert!(lines[1].contains("\"ball_number\":1"));
        assert!(lines[2].contains("\"target_chased\""));
    }
}
