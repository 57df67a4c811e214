use thiserror::Error;

use crate::{EntityId, StoreOperation};

/// Errors that can occur when interacting with a store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// An entity with the same type and ID is already stored.
    #[error("Entity already exists: {entity_type} with id {entity_id}")]
    AlreadyExists {
        entity_type: &'static str,
        entity_id: EntityId,
    },

    /// The entity to update or delete is not stored.
    #[error("Entity not found: {entity_type} with id {entity_id}")]
    NotFound {
        entity_type: &'static str,
        entity_id: EntityId,
    },

    /// The backing storage refused the operation.
    #[error("Store unavailable during {operation}: {reason}")]
    Unavailable {
        operation: StoreOperation,
        reason: String,
    },

    /// A serialization/deserialization error occurred.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
