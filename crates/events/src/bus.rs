//! In-process event bus.

use std::sync::Arc;

use async_trait::async_trait;

use crate::notifier::Notifier;
use crate::{Entity, EntityEvent, EventEnvelope, Result};

/// A consumer of raised events.
///
/// Subscribers receive the serialized envelope, so a single subscriber
/// can observe every entity type.
#[async_trait]
pub trait Subscriber: Send + Sync {
    /// Returns the name of this subscriber.
    fn name(&self) -> &'static str;

    /// Handles a single event.
    async fn handle(&self, event: &EventEnvelope) -> Result<()>;
}

/// Notifier that delivers each event to its registered subscribers.
///
/// Delivery is sequential in registration order and stops at the first
/// subscriber that fails; that failure is what `raise` returns, carrying
/// the number of subscribers that had already handled the event. An event
/// raised with no subscribers is simply dropped.
#[derive(Default)]
pub struct EventBus {
    subscribers: Vec<Arc<dyn Subscriber>>,
}

impl EventBus {
    /// Creates a bus with no subscribers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a subscriber with this bus.
    pub fn register(&mut self, subscriber: Arc<dyn Subscriber>) {
        self.subscribers.push(subscriber);
    }

    /// Builder-style variant of [`EventBus::register`].
    pub fn with_subscriber(mut self, subscriber: Arc<dyn Subscriber>) -> Self {
        self.register(subscriber);
        self
    }

    /// Returns the number of registered subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Delivers an already serialized event to all subscribers.
    #[tracing::instrument(skip(self, event), fields(event_type = %event.event_type))]
    pub async fn publish(&self, event: &EventEnvelope) -> Result<()> {
        for (delivered, subscriber) in self.subscribers.iter().enumerate() {
            subscriber
                .handle(event)
                .await
                .map_err(|e| e.after_deliveries(delivered))?;
        }
        Ok(())
    }
}

#[async_trait]
impl Notifier for EventBus {
    async fn raise<E: Entity>(&self, event: EntityEvent<E>) -> Result<()> {
        let envelope = event.to_envelope()?;
        self.publish(&envelope).await?;
        metrics::counter!("events_raised_total", "kind" => envelope.kind.as_str()).increment(1);
        Ok(())
    }
}
