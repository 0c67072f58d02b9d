//! Stage status and kind enums.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The three stages of a harness run, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageKind {
    /// Runs the generator harness against the source file.
    Generate,
    /// Compiles the generated file.
    Compile,
    /// Executes the compiled program.
    Execute,
}

impl StageKind {
    /// All stages in execution order.
    pub const ALL: [Self; 3] = [Self::Generate, Self::Compile, Self::Execute];
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Generate => write!(f, "generate"),
            Self::Compile => write!(f, "compile"),
            Self::Execute => write!(f, "execute"),
        }
    }
}

/// How a stage ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageStatus {
    /// Stage completed and produced what the next stage needs.
    Ok,
    /// Stage ran but its artifact is missing; later stages are skipped.
    Skip,
    /// Stage failed.
    Fail,
    /// Stage was interrupted.
    Cancel,
}

impl fmt::Display for StageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ok => write!(f, "ok"),
            Self::Skip => write!(f, "skip"),
            Self::Fail => write!(f, "fail"),
            Self::Cancel => write!(f, "cancel"),
        }
    }
}
