//! Core domain model types.
//!
//! This module contains the types shared by stages and the pipeline:
//! - Stage kind and status enums
//! - Stage output with factory methods
//! - Stage artifacts

mod artifact;
mod output;
mod status;

pub use artifact::{ArtifactKind, StageArtifact};
pub use output::StageOutput;
pub use status::{StageKind, StageStatus};
