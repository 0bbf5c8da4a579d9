//! Live persistence backends for ball records and match events.

pub mod csv_sink;
pub mod jsonl;
pub mod sqlite;

use crate::config::BackendType;
use crate::history::BallRecord;
use crate::tracker::MatchEvent;
use async_trait::async_trait;
use std::fmt;
use std::path::Path;

pub use csv_sink::CsvBallSink;
pub use jsonl::JsonlBallSink;
pub use sqlite::SqliteBallStore;

#[derive(Debug)]
pub enum SinkError {
    Io(std::io::Error),
    Serialization(serde_json::Error),
    Csv(csv::Error),
    Database(String),
}

impl From<std::io::Error> for SinkError {
    fn from(err: std::io::Error) -> Self {
        SinkError::Io(err)
    }
}

impl From<serde_json::Error> for SinkError {
    fn from(err: serde_json::Error) -> Self {
        SinkError::Serialization(err)
    }
}

impl From<csv::Error> for SinkError {
    fn from(err: csv::Error) -> Self {
        SinkError::Csv(err)
    }
}

impl From<rusqlite::Error> for SinkError {
    fn from(err: rusqlite::Error) -> Self {
        SinkError::Database(err.to_string())
    }
}

impl fmt::Display for SinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SinkError::Io(e) => write!(f, "IO error: {}", e),
            SinkError::Serialization(e) => write!(f, "Serialization error: {}", e),
            SinkError::Csv(e) => write!(f, "CSV error: {}", e),
            SinkError::Database(e) => write!(f, "Database error: {}", e),
        }
    }
}

impl std::error::Error for SinkError {}

/// Where the live tracker lands its output. Writes are fire-and-forget from
/// the tracker's point of view; errors are surfaced to the caller to log,
/// never to alter match state.
#[async_trait]
pub trait EventSink: Send {
    /// Persist one ball record.
    async fn record_ball(&mut self, record: &BallRecord) -> Result<(), SinkError>;

    /// Persist one lifecycle/score event.
    async fn record_event(&mut self, event: &MatchEvent) -> Result<(), SinkError>;

    /// Flush pending writes to storage.
    async fn flush(&mut self) -> Result<(), SinkError>;

    /// Backend name for logging.
    fn backend_type(&self) -> &'static str;
}

/// Backend router, selected from argv.
pub enum BallSink {
    Csv(CsvBallSink),
    Jsonl(JsonlBallSink),
    Sqlite(SqliteBallStore),
}

impl BallSink {
    pub fn create(backend: BackendType, path: impl AsRef<Path>) -> Result<Self, SinkError> {
        let sink = match backend {
            BackendType::Csv => BallSink::Csv(CsvBallSink::new(path)?),
            BackendType::Jsonl => BallSink::Jsonl(JsonlBallSink::new(path)?),
            BackendType::Sqlite => BallSink::Sqlite(SqliteBallStore::open(path)?),
        };
        Ok(sink)
    }
}

#[async_trait]
impl EventSink for BallSink {
    async fn record_ball(&mut self, record: &BallRecord) -> Result<(), SinkError> {
        match self {
            BallSink::Csv(sink) => sink.record_ball(record).await,
            BallSink::Jsonl(sink) => sink.record_ball(record).await,
            BallSink::Sqlite(sink) => sink.record_ball(record).await,
        }
    }

    async fn record_event(&mut self, event: &MatchEvent) -> Result<(), SinkError> {
        match self {
            BallSink::Csv(sink) => sink.record_event(event).await,
            BallSink::Jsonl(sink) => sink.record_event(event).await,
            BallSink::Sqlite(sink) => sink.record_event(event).await,
        }
    }

    async fn flush(&mut self) -> Result<(), SinkError> {
        match self {
            BallSink::Csv(sink) => sink.flush().await,
            BallSink::Jsonl(sink) => sink.flush().await,
            BallSink::Sqlite(sink) => sink.flush().await,
        }
    }

    fn backend_type(&self) -> &'static str {
        match self {
            BallSink::Csv(sink) => sink.backend_type(),
            BallSink::Jsonl(sink) => sink.backend_type(),
            BallSink::Sqlite(sink) => sink.backend_type(),
        }
    }
}
