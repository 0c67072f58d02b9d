//! Error types for the harness.
//!
//! Missing artifacts and user interrupts are not errors; they are reported
//! through [`crate::pipeline::PipelineOutcome`]. Everything here stops the
//! pipeline and maps onto a process exit code.

use crate::core::StageKind;
use serde_json::json;
use std::path::PathBuf;
use thiserror::Error;

/// The main error type for harness operations.
#[derive(Debug, Error)]
pub enum HarnessError {
    /// The source file passed on the command line does not exist.
    #[error("source file not found: {}", path.display())]
    SourceNotFound {
        /// The path as given.
        path: PathBuf,
    },

    /// A tool could not be found on the execution path.
    #[error("{stage} stage: tool `{program}` not found")]
    ToolNotFound {
        /// The stage that tried to run the tool.
        stage: StageKind,
        /// The program name.
        program: String,
    },

    /// A tool exited with a non-zero status.
    #[error("{stage} stage: `{program}` exited with {}", describe_code(*code))]
    ToolFailed {
        /// The stage that ran the tool.
        stage: StageKind,
        /// The program name.
        program: String,
        /// The exit code, `None` if the process was killed by a signal.
        code: Option<i32>,
    },

    /// A tool could not be spawned for a reason other than not being found.
    #[error("{stage} stage: failed to spawn `{program}`: {source}")]
    Spawn {
        /// The stage that tried to run the tool.
        stage: StageKind,
        /// The program name.
        program: String,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The run workspace could not be created or prepared.
    #[error("workspace error: {0}")]
    Workspace(#[source] std::io::Error),

    /// Configuration could not be loaded or is invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn describe_code(code: Option<i32>) -> String {
    code.map_or_else(
        || "no exit code (terminated by signal)".to_string(),
        |c| format!("status {c}"),
    )
}

impl HarnessError {
    /// Creates a tool failed error.
    #[must_use]
    pub fn tool_failed(stage: StageKind, program: impl Into<String>, code: Option<i32>) -> Self {
        Self::ToolFailed {
            stage,
            program: program.into(),
            code,
        }
    }

    /// Classifies a spawn error for the given stage and program.
    #[must_use]
    pub fn from_spawn(stage: StageKind, program: impl Into<String>, err: std::io::Error) -> Self {
        let program = program.into();
        if err.kind() == std::io::ErrorKind::NotFound {
            Self::ToolNotFound { stage, program }
        } else {
            Self::Spawn {
                stage,
                program,
                source: err,
            }
        }
    }

    /// Returns the stage the error belongs to, if any.
    #[must_use]
    pub const fn stage(&self) -> Option<StageKind> {
        match self {
            Self::ToolNotFound { stage, .. }
            | Self::ToolFailed { stage, .. }
            | Self::Spawn { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    /// Returns the process exit code used when this error ends a run.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::SourceNotFound { .. } | Self::Config(_) => 2,
            Self::ToolNotFound { .. } => 127,
            Self::ToolFailed { code, .. } => code.filter(|c| *c != 0).unwrap_or(1),
            Self::Spawn { .. } | Self::Workspace(_) | Self::Io(_) => 1,
        }
    }

    /// Converts to a JSON representation for event payloads.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        let kind = match self {
            Self::SourceNotFound { .. } => "SourceNotFound",
            Self::ToolNotFound { .. } => "ToolNotFound",
            Self::ToolFailed { .. } => "ToolFailed",
            Self::Spawn { .. } => "Spawn",
            Self::Workspace(_) => "Workspace",
            Self::Config(_) => "Config",
            Self::Io(_) => "Io",
        };
        json!({
            "type": kind,
            "stage": self.stage().map(|s| s.to_string()),
            "message": self.to_string(),
            "exit_code": self.exit_code(),
        })
    }
}
