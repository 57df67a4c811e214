use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Entity, EntityId};

/// Unique identifier for a raised event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(Uuid);

impl EventId {
    /// Creates a new random event ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the underlying UUID.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for EventId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What happened to the entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    Created,
    Updated,
    Deleted,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Created => "Created",
            EventKind::Updated => "Updated",
            EventKind::Deleted => "Deleted",
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A lifecycle event for a single entity.
///
/// Raised by the dispatcher before the matching store call, so observers
/// see the change while persistence is still in progress.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityEvent<E> {
    kind: EventKind,
    entity: E,
}

impl<E: Entity> EntityEvent<E> {
    pub fn new(kind: EventKind, entity: E) -> Self {
        Self { kind, entity }
    }

    pub fn created(entity: E) -> Self {
        Self::new(EventKind::Created, entity)
    }

    pub fn updated(entity: E) -> Self {
        Self::new(EventKind::Updated, entity)
    }

    pub fn deleted(entity: E) -> Self {
        Self::new(EventKind::Deleted, entity)
    }

    pub fn kind(&self) -> EventKind {
        self.kind
    }

    pub fn entity(&self) -> &E {
        &self.entity
    }

    pub fn into_entity(self) -> E {
        self.entity
    }

    /// Returns the event type name, e.g. `WidgetCreated`.
    pub fn event_type(&self) -> String {
        format!("{}{}", E::entity_type(), self.kind)
    }

    /// Serializes the event into an envelope for type-erased delivery.
    pub fn to_envelope(&self) -> Result<EventEnvelope, serde_json::Error> {
        Ok(EventEnvelope {
            event_id: EventId::new(),
            event_type: self.event_type(),
            kind: self.kind,
            entity_type: E::entity_type().to_string(),
            entity_id: self.entity.id(),
            timestamp: Utc::now(),
            payload: serde_json::to_value(&self.entity)?,
        })
    }
}

/// An entity event along with its delivery metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
    /// Unique identifier for this event.
    pub event_id: EventId,

    /// The type of the event (e.g., "WidgetCreated").
    pub event_type: String,

    pub kind: EventKind,

    /// The type of entity (e.g., "Widget").
    pub entity_type: String,

    pub entity_id: EntityId,

    /// When the event was raised.
    pub timestamp: DateTime<Utc>,

    /// The entity as JSON.
    pub payload: serde_json::Value,
}

impl EventEnvelope {
    /// Deserializes the payload into a concrete entity.
    pub fn entity<E: Entity>(&self) -> Result<E, serde_json::Error> {
        serde_json::from_value(self.payload.clone())
    }
}
