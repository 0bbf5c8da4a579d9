//! cricflow - live event tracking and historical pattern analysis for
//! 6-card-over virtual cricket.
//!
//! # Architecture
//!
//! ```text
//! TelemetrySource → Snapshot normalizer → LiveStateMachine / ChangeDetector
//!     ↓
//! MatchEvent stream (BallPlayed, OverCompleted, InningsChanged, ...)
//!     ↓
//! BallSink (CSV / JSONL / SQLite)          ← live path
//!
//! Corpus reader → HistoryIndexer (four signature indices)
//!     ↓
//! Temporal pattern query (strict chronological precedence)
//!     ↓
//! Annotation assembler → AnnotatedWriter   ← batch path
//! ```

pub mod config;
pub mod history;
pub mod snapshot;
pub mod storage;
pub mod tracker;
