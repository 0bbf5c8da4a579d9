//! CSV corpus reader. Malformed rows are logged and skipped; a bad row never
//! aborts the pass.

use super::record::BallRecord;
use std::fmt;
use std::path::Path;

#[derive(Debug)]
pub enum CorpusError {
    Io(std::io::Error),
    Csv(csv::Error),
}

impl From<std::io::Error> for CorpusError {
    fn from(err: std::io::Error) -> Self {
        CorpusError::Io(err)
    }
}

impl From<csv::Error> for CorpusError {
    fn from(err: csv::Error) -> Self {
        CorpusError::Csv(err)
    }
}

impl fmt::Display for CorpusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CorpusError::Io(e) => write!(f, "IO error: {}", e),
            CorpusError::Csv(e) => write!(f, "CSV error: {}", e),
        }
    }
}

impl std::error::Error for CorpusError {}

/// Reads every parseable row of a ball-record CSV, in file order.
pub fn read_corpus_csv(path: impl AsRef<Path>) -> Result<Vec<BallRecord>, CorpusError> {
    let mut reader = csv::Reader::from_path(path.as_ref())?;
    let mut records = Vec::new();
    let mut skipped = 0usize;

    for (line, result) in reader.deserialize::<BallRecord>().enumerate() {
        match result {
            Ok(record) => records.push(record),
            Err(e) => {
                skipped += 1;
                log::warn!("Skipping corpus row {}: {}", line + 2, e);
            }
        }
    }

    if skipped > 0 {
        log::warn!("Corpus read: {} rows kept, {} skipped", records.len(), skipped);
    } else {
        log::info!("Corpus read: {} rows", records.len());
    }
    Ok(records)
}
