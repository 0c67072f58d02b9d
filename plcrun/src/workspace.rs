//! Run workspace: the directory tools run in and artifacts land in.

use crate::config::WorkspaceMode;
use crate::core::{ArtifactKind, StageArtifact};
use crate::errors::HarnessError;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::debug;

/// The directory for one harness run.
///
/// A scoped workspace is removed when dropped, on every exit path.
#[derive(Debug)]
pub enum Workspace {
    /// Fresh temporary directory owned by this run.
    Scoped(TempDir),
    /// An existing directory shared with previous runs.
    InPlace(PathBuf),
}

impl Workspace {
    /// Creates a workspace for the given mode.
    ///
    /// `launch_dir` is used directly in in-place mode.
    pub fn create(mode: WorkspaceMode, launch_dir: &Path) -> Result<Self, HarnessError> {
        match mode {
            WorkspaceMode::Scoped => Self::scoped(),
            WorkspaceMode::InPlace => Ok(Self::InPlace(launch_dir.to_path_buf())),
        }
    }

    /// Creates a fresh temporary workspace.
    pub fn scoped() -> Result<Self, HarnessError> {
        let dir = tempfile::Builder::new()
            .prefix("plcrun-")
            .tempdir()
            .map_err(HarnessError::Workspace)?;
        debug!(dir = %dir.path().display(), "Created scoped workspace");
        Ok(Self::Scoped(dir))
    }

    /// Returns the workspace directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        match self {
            Self::Scoped(dir) => dir.path(),
            Self::InPlace(dir) => dir,
        }
    }

    /// Returns true for a per-run temporary workspace.
    #[must_use]
    pub const fn is_scoped(&self) -> bool {
        matches!(self, Self::Scoped(_))
    }

    /// Resolves an artifact inside the workspace.
    #[must_use]
    pub fn artifact(&self, kind: ArtifactKind, name: &str) -> StageArtifact {
        StageArtifact::new(kind, self.dir(), name)
    }

    /// Removes a leftover artifact from a previous run.
    ///
    /// Returns true if a file was removed. A scoped workspace starts empty,
    /// so this only matters in-place.
    pub fn clear_stale(&self, artifact: &StageArtifact) -> Result<bool, HarnessError> {
        match std::fs::remove_file(&artifact.path) {
            Ok(()) => {
                debug!(path = %artifact.path.display(), "Removed stale artifact");
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(HarnessError::Workspace(e)),
        }
    }
}
