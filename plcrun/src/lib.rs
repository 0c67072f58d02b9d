//! # plcrun
//!
//! Drives the PLC generator harness end to end:
//!
//! - **Generate**: run the harness on a source file, which writes `Main.java`
//! - **Compile**: run `javac` on the generated file, which writes `Main.class`
//! - **Execute**: run the compiled program with its output on the console
//!
//! A stage runs only if the previous tool exited with status zero and left
//! its artifact behind. Tools run in a fresh temporary directory per run, so
//! files from an earlier run are never mistaken for a fresh result.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use plcrun::prelude::*;
//! use std::sync::Arc;
//!
//! let pipeline = Pipeline::new(HarnessConfig::default(), ".", Arc::new(SystemToolchain::new()));
//! let report = pipeline.run("source1.plc").await?;
//! std::process::exit(report.exit_code());
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod cancellation;
pub mod config;
pub mod console;
pub mod context;
pub mod core;
pub mod errors;
pub mod events;
pub mod pipeline;
pub mod stages;
pub mod testing;
pub mod toolchain;
pub mod workspace;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::cancellation::CancellationToken;
    pub use crate::config::{HarnessConfig, LogFormat, WorkspaceMode};
    pub use crate::console::Console;
    pub use crate::core::{ArtifactKind, StageArtifact, StageKind, StageOutput, StageStatus};
    pub use crate::errors::HarnessError;
    pub use crate::events::{EventSink, LoggingEventSink, NoOpEventSink};
    pub use crate::pipeline::{Pipeline, PipelineOutcome, PipelineReport};
    pub use crate::stages::{Stage, ToolStage};
    pub use crate::toolchain::{Invocation, ProcessExit, SystemToolchain, Toolchain};
    pub use crate::workspace::Workspace;
}
