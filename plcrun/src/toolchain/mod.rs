//! External tool invocation.
//!
//! The pipeline only talks to tools through the [`Toolchain`] trait, so
//! tests can script tool behaviour without spawning processes.

mod system;

pub use system::SystemToolchain;

use crate::cancellation::CancellationToken;
use crate::core::StageKind;
use crate::errors::HarnessError;
use async_trait::async_trait;
use std::ffi::OsString;
use std::path::PathBuf;

/// A single external process invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// The stage issuing the invocation.
    pub stage: StageKind,
    /// The program to run.
    pub program: String,
    /// Arguments, not including the program.
    pub args: Vec<OsString>,
    /// Working directory.
    pub cwd: PathBuf,
}

impl Invocation {
    /// Creates an invocation with no arguments.
    #[must_use]
    pub fn new(stage: StageKind, program: impl Into<String>, cwd: impl Into<PathBuf>) -> Self {
        Self {
            stage,
            program: program.into(),
            args: Vec::new(),
            cwd: cwd.into(),
        }
    }

    /// Appends an argument.
    #[must_use]
    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Returns the arguments as lossy UTF-8 strings.
    #[must_use]
    pub fn args_lossy(&self) -> Vec<String> {
        self.args
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    /// Returns the full command line for logs.
    #[must_use]
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.clone())
            .chain(self.args_lossy())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// How an invoked process ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessExit {
    /// The process exited on its own. `code` is `None` if a signal ended it.
    Exited {
        /// The exit code.
        code: Option<i32>,
    },
    /// The run was interrupted and the process was stopped.
    Interrupted,
}

impl ProcessExit {
    /// Returns true for a zero exit code.
    #[must_use]
    pub const fn success(&self) -> bool {
        matches!(self, Self::Exited { code: Some(0) })
    }
}

/// Runs external tools on behalf of stages.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Toolchain: Send + Sync {
    /// Runs the invocation to completion, or until `token` is cancelled.
    ///
    /// The call blocks the pipeline until the process has exited.
    async fn run(
        &self,
        invocation: &Invocation,
        token: &CancellationToken,
    ) -> Result<ProcessExit, HarnessError>;
}
