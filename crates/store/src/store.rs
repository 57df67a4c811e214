use async_trait::async_trait;

use crate::{Entity, Result};

/// The three persistence operations a store offers to the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOperation {
    Add,
    Update,
    Delete,
}

impl StoreOperation {
    /// Returns the lowercase operation name, used in logs and metric labels.
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreOperation::Add => "add",
            StoreOperation::Update => "update",
            StoreOperation::Delete => "delete",
        }
    }
}

impl std::fmt::Display for StoreOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Durable persistence for entities of any type.
///
/// The dispatcher calls exactly one of these per successful command, after
/// the corresponding event has been raised. Implementations must be
/// thread-safe and document their own concurrency guarantees; the
/// dispatcher neither serializes nor batches calls.
#[async_trait]
pub trait Store: Send + Sync {
    /// Persists a new entity.
    async fn add<E: Entity>(&self, entity: &E) -> Result<()>;

    /// Replaces a previously persisted entity.
    async fn update<E: Entity>(&self, entity: &E) -> Result<()>;

    /// Removes a previously persisted entity.
    async fn delete<E: Entity>(&self, entity: &E) -> Result<()>;
}
