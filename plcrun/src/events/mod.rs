//! Event sink system for observability.
//!
//! The pipeline reports its progress as named events with JSON payloads.
//! Sinks decide what to do with them; the default discards everything.

mod sink;

pub use sink::{EventSink, LoggingEventSink, NoOpEventSink};

/// Event names emitted by the pipeline.
pub mod names {
    /// A run has started.
    pub const PIPELINE_STARTED: &str = "pipeline.started";
    /// A run finished without error.
    pub const PIPELINE_COMPLETED: &str = "pipeline.completed";
    /// A run ended with an error.
    pub const PIPELINE_FAILED: &str = "pipeline.failed";
    /// A run was interrupted by the user.
    pub const PIPELINE_INTERRUPTED: &str = "pipeline.interrupted";
    /// A stage is about to invoke its tool.
    pub const STAGE_STARTED: &str = "stage.started";
    /// A stage finished and produced its artifact.
    pub const STAGE_COMPLETED: &str = "stage.completed";
    /// A stage finished without producing its artifact.
    pub const STAGE_SKIPPED: &str = "stage.skipped";
    /// A stage's tool failed.
    pub const STAGE_FAILED: &str = "stage.failed";
}
