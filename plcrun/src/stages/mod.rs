//! Stage trait and the tool stages.
//!
//! Stages are the units the pipeline sequences. Each one runs a single
//! external tool and reports whether the next stage may proceed.

mod tool;

pub use tool::ToolStage;

use crate::context::StageContext;
use crate::core::{StageKind, StageOutput};
use crate::errors::HarnessError;
use async_trait::async_trait;
use std::fmt::Debug;

/// Trait for pipeline stages.
#[async_trait]
pub trait Stage: Send + Sync + Debug {
    /// Returns the kind of the stage.
    fn kind(&self) -> StageKind;

    /// Executes the stage.
    ///
    /// # Arguments
    ///
    /// * `ctx` - The stage execution context
    ///
    /// # Returns
    ///
    /// The stage output, or an error if the tool could not be run at all.
    async fn execute(&self, ctx: &StageContext<'_>) -> Result<StageOutput, HarnessError>;
}

/// Returns the standard generate, compile, execute sequence.
#[must_use]
pub fn default_stages() -> Vec<Box<dyn Stage>> {
    StageKind::ALL
        .into_iter()
        .map(|kind| Box::new(ToolStage::new(kind)) as Box<dyn Stage>)
        .collect()
}
