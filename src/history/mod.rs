//! Historical pattern engine: corpus I/O, signature indices, chronological
//! pattern queries and the annotation pass.

pub mod annotate;
pub mod index;
pub mod query;
pub mod reader;
pub mod record;
pub mod signature;
pub mod writer;

pub use annotate::{annotate_corpus, annotate_match, AnnotatedRecord};
pub use index::{group_by_match, HistoryIndex, MatchSummary, Occurrence};
pub use query::{precedes, prior_occurrences, PatternHit, QueryTarget};
pub use reader::{read_corpus_csv, CorpusError};
pub use record::{parse_runs, parse_timestamp, BallRecord};
pub use signature::{full_match_signature, sequence_signature, FinalScore, OccurrenceId};
pub use writer::{AnnotatedWriter, OutputError};
