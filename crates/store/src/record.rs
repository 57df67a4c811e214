use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Entity, EntityId};

/// The stored form of an entity.
///
/// Stores keep entities of every type side by side, so the payload is
/// held as JSON and tagged with the entity type name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityRecord {
    /// The type of entity (e.g., "Widget").
    pub entity_type: String,

    /// The entity this record holds.
    pub entity_id: EntityId,

    /// Number of times the record has been written. Starts at 1 on add.
    pub revision: u64,

    /// When the record was last written.
    pub stored_at: DateTime<Utc>,

    /// The serialized entity.
    pub payload: serde_json::Value,
}

impl EntityRecord {
    /// Creates a first-revision record from an entity.
    pub fn from_entity<E: Entity>(entity: &E) -> Result<Self, serde_json::Error> {
        Ok(Self {
            entity_type: E::entity_type().to_string(),
            entity_id: entity.id(),
            revision: 1,
            stored_at: Utc::now(),
            payload: serde_json::to_value(entity)?,
        })
    }

    /// Returns a copy of this record holding `entity` at the next revision.
    pub fn revise<E: Entity>(&self, entity: &E) -> Result<Self, serde_json::Error> {
        Ok(Self {
            entity_type: self.entity_type.clone(),
            entity_id: self.entity_id,
            revision: self.revision + 1,
            stored_at: Utc::now(),
            payload: serde_json::to_value(entity)?,
        })
    }

    /// Deserializes the payload back into a concrete entity.
    pub fn to_entity<E: Entity>(&self) -> Result<E, serde_json::Error> {
        serde_json::from_value(self.payload.clone())
    }
}
