//! Testing utilities for harness runs.
//!
//! This module provides:
//! - A scripted toolchain that fakes tool side effects
//! - A shared in-memory writer for capturing console output
//! - An event sink that records what the pipeline emitted

mod events;
mod mocks;

pub use events::CollectingEventSink;
pub use mocks::{InvocationRecord, ScriptedToolchain, SharedBuffer, ToolScript};
