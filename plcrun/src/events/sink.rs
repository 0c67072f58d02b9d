//! Event sink trait and implementations.

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

/// Receives the events a pipeline run emits.
#[async_trait]
pub trait EventSink: Send + Sync {
    /// Delivers one event. Must not fail the run.
    async fn emit(&self, event_type: &str, data: Option<Value>);
}

/// Discards every event. The pipeline default.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpEventSink;

#[async_trait]
impl EventSink for NoOpEventSink {
    async fn emit(&self, _event_type: &str, _data: Option<Value>) {}
}

/// Writes events to `tracing` at debug level.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingEventSink;

#[async_trait]
impl EventSink for LoggingEventSink {
    async fn emit(&self, event_type: &str, data: Option<Value>) {
        debug!(event_type, event_data = ?data, "Event: {event_type}");
    }
}
