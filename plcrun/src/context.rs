//! Per-run context handed to each stage.

use crate::cancellation::CancellationToken;
use crate::config::HarnessConfig;
use crate::toolchain::Toolchain;
use crate::workspace::Workspace;
use std::path::{Path, PathBuf};

/// Everything a stage needs to build and run its invocation.
///
/// Borrowed from the pipeline for the duration of one run.
pub struct StageContext<'a> {
    /// Harness configuration.
    pub config: &'a HarnessConfig,
    /// The run's workspace.
    pub workspace: &'a Workspace,
    /// Source path as passed to the generator.
    pub source: PathBuf,
    /// Directory holding the harness entry point.
    pub harness_dir: PathBuf,
    /// Tool runner.
    pub toolchain: &'a dyn Toolchain,
    /// Interrupt token.
    pub token: &'a CancellationToken,
}

impl StageContext<'_> {
    /// Returns the working directory for tool invocations.
    #[must_use]
    pub fn work_dir(&self) -> &Path {
        self.workspace.dir()
    }
}

impl std::fmt::Debug for StageContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StageContext")
            .field("workspace", &self.workspace.dir())
            .field("source", &self.source)
            .field("harness_dir", &self.harness_dir)
            .field("cancelled", &self.token.is_cancelled())
            .finish_non_exhaustive()
    }
}
