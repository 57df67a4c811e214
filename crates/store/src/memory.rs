use std::any::TypeId;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{
    Entity, EntityId, EntityRecord, Result, StoreError,
    store::{Store, StoreOperation},
};

type RecordKey = (TypeId, EntityId);

fn key_of<E: Entity>(id: EntityId) -> RecordKey {
    (TypeId::of::<E>(), id)
}

/// In-memory store for tests and local wiring.
///
/// Records are keyed by the entity's Rust type and ID, so two types sharing
/// an `entity_type()` name still get separate slots. `add` refuses
/// duplicates while `update` and `delete` refuse missing records. Clones
/// share the same underlying storage.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    records: Arc<RwLock<HashMap<RecordKey, EntityRecord>>>,
    failures: Arc<RwLock<HashSet<StoreOperation>>>,
}

impl InMemoryStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next call of `operation` fail with [`StoreError::Unavailable`].
    pub async fn fail_next(&self, operation: StoreOperation) {
        self.failures.write().await.insert(operation);
    }

    /// Loads a stored entity by ID.
    pub async fn get<E: Entity>(&self, id: EntityId) -> Result<Option<E>> {
        let records = self.records.read().await;
        match records.get(&key_of::<E>(id)) {
            Some(record) => Ok(Some(record.to_entity()?)),
            None => Ok(None),
        }
    }

    /// Returns the raw record for an entity, if stored.
    pub async fn record<E: Entity>(&self, id: EntityId) -> Option<EntityRecord> {
        self.records
            .read()
            .await
            .get(&key_of::<E>(id))
            .cloned()
    }

    /// Loads every stored entity of type `E`, ordered by ID.
    pub async fn all<E: Entity>(&self) -> Result<Vec<E>> {
        let records = self.records.read().await;
        let mut matching: Vec<_> = records
            .iter()
            .filter(|((type_id, _), _)| *type_id == TypeId::of::<E>())
            .collect();
        matching.sort_by_key(|((_, id), _)| *id);

        matching
            .into_iter()
            .map(|(_, record)| record.to_entity().map_err(StoreError::from))
            .collect()
    }

    /// Returns the total number of stored records across all types.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// Returns true if nothing is stored.
    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    /// Clears all records and pending failures.
    pub async fn clear(&self) {
        self.records.write().await.clear();
        self.failures.write().await.clear();
    }

    async fn check_injected_failure(&self, operation: StoreOperation) -> Result<()> {
        if self.failures.write().await.remove(&operation) {
            return Err(StoreError::Unavailable {
                operation,
                reason: "injected failure".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl Store for InMemoryStore {
    async fn add<E: Entity>(&self, entity: &E) -> Result<()> {
        metrics::counter!("store_operations_total", "operation" => "add").increment(1);
        self.check_injected_failure(StoreOperation::Add).await?;

        let key = key_of::<E>(entity.id());
        let mut records = self.records.write().await;
        if records.contains_key(&key) {
            return Err(StoreError::AlreadyExists {
                entity_type: E::entity_type(),
                entity_id: key.1,
            });
        }

        records.insert(key, EntityRecord::from_entity(entity)?);
        tracing::trace!(entity_type = E::entity_type(), entity_id = %key.1, "record added");
        Ok(())
    }

    async fn update<E: Entity>(&self, entity: &E) -> Result<()> {
        metrics::counter!("store_operations_total", "operation" => "update").increment(1);
        self.check_injected_failure(StoreOperation::Update).await?;

        let key = key_of::<E>(entity.id());
        let mut records = self.records.write().await;
        let Some(existing) = records.get(&key) else {
            return Err(StoreError::NotFound {
                entity_type: E::entity_type(),
                entity_id: key.1,
            });
        };

        let revised = existing.revise(entity)?;
        records.insert(key, revised);
        tracing::trace!(entity_type = E::entity_type(), entity_id = %key.1, "record updated");
        Ok(())
    }

    async fn delete<E: Entity>(&self, entity: &E) -> Result<()> {
        metrics::counter!("store_operations_total", "operation" => "delete").increment(1);
        self.check_injected_failure(StoreOperation::Delete).await?;

        let key = key_of::<E>(entity.id());
        if self.records.write().await.remove(&key).is_none() {
            return Err(StoreError::NotFound {
                entity_type: E::entity_type(),
                entity_id: key.1,
            });
        }

        tracing::trace!(entity_type = E::entity_type(), entity_id = %key.1, "record deleted");
        Ok(())
    }
}
