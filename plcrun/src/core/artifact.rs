//! Stage artifact type for the files each stage leaves behind.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// What an artifact is used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    /// The intermediate file written by the generator.
    Generated,
    /// The compiled file written by the compiler.
    Compiled,
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Generated => write!(f, "generated"),
            Self::Compiled => write!(f, "compiled"),
        }
    }
}

/// A fixed-name file expected in the run workspace after a stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageArtifact {
    /// The kind of artifact.
    pub kind: ArtifactKind,
    /// The file name as configured (e.g. `Main.java`).
    pub name: String,
    /// The resolved path inside the workspace.
    pub path: PathBuf,
}

impl StageArtifact {
    /// Creates an artifact rooted in the given directory.
    #[must_use]
    pub fn new(kind: ArtifactKind, dir: &Path, name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            kind,
            path: dir.join(&name),
            name,
        }
    }

    /// Returns true if the file is currently present.
    #[must_use]
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }
}
