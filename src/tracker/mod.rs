//! Live tracking path: state machine, change detection and the poll loop.

pub mod detector;
pub mod events;
pub mod machine;
pub mod runner;
pub mod state;

pub use events::{BallEvent, EndReason, MatchEvent};
pub use machine::LiveStateMachine;
pub use runner::{MatchTracker, ReplaySource, SourcePoll, TelemetrySource};
pub use state::{MatchPhase, ProgressMark, TrackerState};
