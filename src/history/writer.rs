//! Annotated output writer, routed by backend the same way live ball sinks
//! are: CSV reproduces the input columns plus the eight analysis columns at
//! the end, JSONL writes one object per row.

use super::annotate::AnnotatedRecord;
use crate::config::BackendType;
use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

#[derive(Debug)]
pub enum OutputError {
    Io(std::io::Error),
    Csv(csv::Error),
    Serialization(serde_json::Error),
    UnsupportedBackend(&'static str),
}

impl From<std::io::Error> for OutputError {
    fn from(err: std::io::Error) -> Self {
        OutputError::Io(err)
    }
}

impl From<csv::Error> for OutputError {
    fn from(err: csv::Error) -> Self {
        OutputError::Csv(err)
    }
}

impl From<serde_json::Error> for OutputError {
    fn from(err: serde_json::Error) -> Self {
        OutputError::Serialization(err)
    }
}

impl fmt::Display for OutputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputError::Io(e) => write!(f, "IO error: {}", e),
            OutputError::Csv(e) => write!(f, "CSV error: {}", e),
            OutputError::Serialization(e) => write!(f, "Serialization error: {}", e),
            OutputError::UnsupportedBackend(b) => {
                write!(f, "Backend {} cannot hold annotated output", b)
            }
        }
    }
}

impl std::error::Error for OutputError {}

pub enum AnnotatedWriter {
    Csv(csv::Writer<File>),
    Jsonl(BufWriter<File>),
}

impl AnnotatedWriter {
    pub fn create(backend: BackendType, path: impl AsRef<Path>) -> Result<Self, OutputError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        match backend {
            BackendType::Csv => Ok(AnnotatedWriter::Csv(csv::Writer::from_path(path)?)),
            BackendType::Jsonl => Ok(AnnotatedWriter::Jsonl(BufWriter::new(File::create(path)?))),
            BackendType::Sqlite => Err(OutputError::UnsupportedBackend("sqlite")),
        }
    }

    pub fn write(&mut self, record: &AnnotatedRecord) -> Result<(), OutputError> {
        match self {
            AnnotatedWriter::Csv(writer) => writer.serialize(record)?,
            AnnotatedWriter::Jsonl(file) => {
                let json = serde_json::to_string(record)?;
                writeln!(file, "{}", json)?;
            }
        }
        Ok(())
    }

    pub fn finish(mut self) -> Result<(), OutputError> {
        match &mut self {
            AnnotatedWriter::Csv(writer) => writer.flush()?,
            AnnotatedWriter::Jsonl(file) => file.flush()?,
        }
        Ok(())
    }

    pub fn backend_type(&self) -> &'static str {
        match self {
            AnnotatedWriter::Csv(_) => "CSV",
            AnnotatedWriter::Jsonl(_) => "JSONL",
        }
    }
}
