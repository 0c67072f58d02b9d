//! Run reports.

use crate::core::{StageKind, StageOutput};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

/// How a run ended, when it ended without a harness error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum PipelineOutcome {
    /// The program was executed; `exit_code` is its status.
    Completed {
        /// The program's exit code (1 if killed by a signal).
        exit_code: i32,
    },
    /// A stage produced no artifact, so the later stages were skipped.
    Stopped {
        /// The stage whose artifact was missing.
        stage: StageKind,
        /// Why the run stopped.
        reason: String,
    },
    /// The user interrupted the run.
    Interrupted {
        /// The stage that was running or about to run.
        stage: StageKind,
    },
}

impl PipelineOutcome {
    /// Returns the process exit code for this outcome.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Completed { exit_code } => *exit_code,
            Self::Stopped { .. } | Self::Interrupted { .. } => 0,
        }
    }
}

/// One stage's entry in a report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageRecord {
    /// The stage.
    pub stage: StageKind,
    /// What it produced.
    pub output: StageOutput,
}

/// Summary of one harness run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineReport {
    /// Run identifier.
    pub run_id: Uuid,
    /// Source path as given.
    pub source: PathBuf,
    /// Directory the tools ran in.
    pub workspace: PathBuf,
    /// Whether the workspace was a per-run temporary directory.
    pub scoped: bool,
    /// Stages that ran, in order.
    pub stages: Vec<StageRecord>,
    /// How the run ended.
    pub outcome: PipelineOutcome,
    /// When the run started.
    pub started_at: DateTime<Utc>,
    /// When the run ended.
    pub ended_at: DateTime<Utc>,
}

impl PipelineReport {
    /// Returns the output of a stage, if it ran.
    #[must_use]
    pub fn stage(&self, kind: StageKind) -> Option<&StageOutput> {
        self.stages
            .iter()
            .find(|r| r.stage == kind)
            .map(|r| &r.output)
    }

    /// Returns the stages that ran, in order.
    #[must_use]
    pub fn stages_run(&self) -> Vec<StageKind> {
        self.stages.iter().map(|r| r.stage).collect()
    }

    /// Returns the process exit code for the run.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        self.outcome.exit_code()
    }

    /// Returns the total duration in milliseconds.
    #[must_use]
    pub fn duration_ms(&self) -> i64 {
        (self.ended_at - self.started_at).num_milliseconds()
    }
}
