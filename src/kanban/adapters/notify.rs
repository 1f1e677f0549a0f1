//! Notifier adapters: a `tracing` sink and an in-process recorder.

use crate::kanban::ports::{BoardEvent, BoardNotifier};
use std::sync::{Arc, Mutex};

/// Emits every event as a structured `tracing` record.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl BoardNotifier for TracingNotifier {
    fn notify(&self, event: &BoardEvent) {
        match serde_json::to_string(event) {
            Ok(payload) => tracing::info!(event = event.name(), %payload, "board event"),
            Err(err) => {
                tracing::warn!(event = event.name(), error = %err, "unserializable board event");
            }
        }
    }
}

/// Collects events in memory, for tests and in-process subscribers.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    events: Arc<Mutex<Vec<BoardEvent>>>,
}

impl RecordingNotifier {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the events recorded so far.
    #[must_use]
    pub fn events(&self) -> Vec<BoardEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    /// Drains and returns the recorded events.
    #[must_use]
    pub fn take(&self) -> Vec<BoardEvent> {
        self.events
            .lock()
            .map(|mut events| std::mem::take(&mut *events))
            .unwrap_or_default()
    }
}

impl BoardNotifier for RecordingNotifier {
    fn notify(&self, event: &BoardEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}
