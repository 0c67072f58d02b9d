//! Event capture for pipeline tests.

use crate::events::EventSink;
use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;

/// Keeps every emitted event in order.
#[derive(Debug, Default)]
pub struct CollectingEventSink {
    events: Mutex<Vec<(String, Option<Value>)>>,
}

impl CollectingEventSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Event names in emission order.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.events.lock().iter().map(|(name, _)| name.clone()).collect()
    }

    /// How many times `name` was emitted.
    #[must_use]
    pub fn count(&self, name: &str) -> usize {
        self.events.lock().iter().filter(|(n, _)| n == name).count()
    }

    /// Payload of the first event called `name`.
    #[must_use]
    pub fn payload(&self, name: &str) -> Option<Value> {
        self.events
            .lock()
            .iter()
            .find(|(n, _)| n == name)
            .and_then(|(_, data)| data.clone())
    }
}

#[async_trait]
impl EventSink for CollectingEventSink {
    async fn emit(&self, event_type: &str, data: Option<Value>) {
        self.events.lock().push((event_type.to_string(), data));
    }
}
