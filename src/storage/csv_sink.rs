//! CSV ball sink. Appends to an existing corpus file, writing the header
//! only when the file starts empty. Lifecycle events are not part of the CSV
//! contract and are dropped here.

use super::{EventSink, SinkError};
use crate::history::BallRecord;
use crate::tracker::MatchEvent;
use async_trait::async_trait;
use std::fs::OpenOptions;
use std::path::Path;

pub struct CsvBallSink {
    writer: csv::Writer<std::fs::File>,
}

impl CsvBallSink {
    pub fn new(path: impl AsRef<Path>) -> Result<Self, SinkError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let needs_header = std::fs::metadata(path).map(|m| m.len() == 0).unwrap_or(true);
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let writer = csv::WriterBuilder::new()
            .has_headers(needs_header)
            .from_writer(file);

        log::info!("📄 CSV ball log at {}", path.display());
        Ok(Self { writer })
    }
}

#[async_trait]
impl EventSink for CsvBallSink {
    async fn record_ball(&mut self, record: &BallRecord) -> Result<(), SinkError> {
        self.writer.serialize(record)?;
        self.writer.flush()?;
        Ok(())
    }

    async fn record_event(&mut self, _event: &MatchEvent) -> Result<(), SinkError> {
        Ok(())
    }

    async fn flush(&mut self) -> Result<(), SinkError> {
        self.writer.flush()?;
        Ok(())
    }

    fn backend_type(&self) -> &'static str {
        "CSV"
    }
}
