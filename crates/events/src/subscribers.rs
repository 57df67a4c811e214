//! Ready-made subscribers.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use crate::bus::Subscriber;
use crate::{EventEnvelope, NotifyError, Result};

#[derive(Debug, Default)]
struct RecordingState {
    events: Vec<EventEnvelope>,
    fail: bool,
}

/// Subscriber that keeps every event it receives.
///
/// Can be told to fail, which makes it useful for exercising the
/// raised-but-not-persisted paths.
#[derive(Debug, Clone, Default)]
pub struct RecordingSubscriber {
    state: Arc<RwLock<RecordingState>>,
}

impl RecordingSubscriber {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a subscriber that rejects every event.
    pub fn failing() -> Self {
        let subscriber = Self::new();
        subscriber.set_fail(true);
        subscriber
    }

    pub fn set_fail(&self, fail: bool) {
        self.state
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .fail = fail;
    }

    /// Returns a copy of the events received so far.
    pub fn events(&self) -> Vec<EventEnvelope> {
        self.state
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .events
            .clone()
    }

    pub fn event_count(&self) -> usize {
        self.state
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .events
            .len()
    }
}

#[async_trait]
impl Subscriber for RecordingSubscriber {
    fn name(&self) -> &'static str {
        "recording"
    }

    async fn handle(&self, event: &EventEnvelope) -> Result<()> {
        let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
        if state.fail {
            return Err(NotifyError::Subscriber {
                subscriber: self.name(),
                reason: format!("refused {}", event.event_type),
                delivered: 0,
            });
        }
        state.events.push(event.clone());
        Ok(())
    }
}

/// Subscriber that writes one log line per event.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingSubscriber;

#[async_trait]
impl Subscriber for LoggingSubscriber {
    fn name(&self) -> &'static str {
        "logging"
    }

    async fn handle(&self, event: &EventEnvelope) -> Result<()> {
        tracing::info!(
            event_id = %event.event_id,
            event_type = %event.event_type,
            entity_id = %event.entity_id,
            "entity event raised"
        );
        Ok(())
    }
}
