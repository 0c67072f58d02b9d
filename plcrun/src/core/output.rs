//! Stage output type with factory methods.

use super::{StageArtifact, StageStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The output of a stage execution.
///
/// Built through the factory methods; the runner only reads it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageOutput {
    /// The status of the stage execution.
    pub status: StageStatus,

    /// The tool's exit code, if the tool ran to completion.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,

    /// The artifact the stage produced, if it has one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifact: Option<StageArtifact>,

    /// Error message (for failed executions).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Skip reason (for stages whose artifact is missing).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip_reason: Option<String>,

    /// Cancel reason (for interrupted stages).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancel_reason: Option<String>,

    /// When the stage started.
    pub started_at: DateTime<Utc>,

    /// When the stage finished.
    pub ended_at: DateTime<Utc>,
}

impl StageOutput {
    fn with_status(status: StageStatus, started_at: DateTime<Utc>) -> Self {
        Self {
            status,
            exit_code: None,
            artifact: None,
            error: None,
            skip_reason: None,
            cancel_reason: None,
            started_at,
            ended_at: Utc::now(),
        }
    }

    /// Creates a successful output.
    #[must_use]
    pub fn ok(started_at: DateTime<Utc>, exit_code: Option<i32>) -> Self {
        Self {
            exit_code,
            ..Self::with_status(StageStatus::Ok, started_at)
        }
    }

    /// Creates a skip output with a reason.
    #[must_use]
    pub fn skip(started_at: DateTime<Utc>, exit_code: Option<i32>, reason: impl Into<String>) -> Self {
        Self {
            exit_code,
            skip_reason: Some(reason.into()),
            ..Self::with_status(StageStatus::Skip, started_at)
        }
    }

    /// Creates a failure output for a tool that exited unsuccessfully.
    #[must_use]
    pub fn fail(started_at: DateTime<Utc>, exit_code: Option<i32>, error: impl Into<String>) -> Self {
        Self {
            exit_code,
            error: Some(error.into()),
            ..Self::with_status(StageStatus::Fail, started_at)
        }
    }

    /// Creates a cancel output with a reason.
    #[must_use]
    pub fn cancel(started_at: DateTime<Utc>, reason: impl Into<String>) -> Self {
        Self {
            cancel_reason: Some(reason.into()),
            ..Self::with_status(StageStatus::Cancel, started_at)
        }
    }

    /// Attaches the stage's artifact.
    #[must_use]
    pub fn with_artifact(mut self, artifact: StageArtifact) -> Self {
        self.artifact = Some(artifact);
        self
    }

    /// Returns the duration in milliseconds.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn duration_ms(&self) -> f64 {
        (self.ended_at - self.started_at).num_microseconds().unwrap_or(0) as f64 / 1000.0
    }

    /// Returns the human-readable reason attached to a non-ok output.
    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        self.error
            .as_deref()
            .or(self.skip_reason.as_deref())
            .or(self.cancel_reason.as_deref())
    }
}
