//! Pipeline building and execution.
//!
//! This module provides:
//! - The pipeline runner that sequences the stages
//! - Run reports and outcomes

mod report;
mod runner;

pub use report::{PipelineOutcome, PipelineReport, StageRecord};
pub use runner::Pipeline;
