//! The command dispatcher.

use std::sync::Arc;
use std::time::Instant;

use domain_events::{EntityEvent, Notifier};
use entity_store::{Store, StoreOperation};

use crate::command::{Command, CommandKind, CommandResult};
use crate::error::DispatchError;
use crate::resolver::RuleResolver;
use crate::Entity;

/// Runs create, update and delete commands for any entity type.
///
/// Every command goes through the same steps:
/// 1. Resolve the business rules for the entity type
/// 2. Validate; a refusal returns a rejected result with no side effects
/// 3. Run the mutation hook for the command kind
/// 4. Raise the matching event through the notifier
/// 5. Hand the entity to the store
///
/// The event is raised before the store call. If the store then fails,
/// observers have seen an event for a change that was never persisted;
/// the store error is returned as-is and nothing is compensated.
pub struct Commander<S, N> {
    store: Arc<S>,
    notifier: Arc<N>,
    resolver: Arc<RuleResolver<N>>,
}

impl<S, N> Commander<S, N>
where
    S: Store,
    N: Notifier,
{
    /// Creates a commander over injected collaborators.
    pub fn new(store: Arc<S>, notifier: Arc<N>, resolver: Arc<RuleResolver<N>>) -> Self {
        Self {
            store,
            notifier,
            resolver,
        }
    }

    /// Creates a commander where every entity type uses default rules.
    pub fn with_default_rules(store: Arc<S>, notifier: Arc<N>) -> Self {
        let resolver = Arc::new(RuleResolver::new(notifier.clone()));
        Self::new(store, notifier, resolver)
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn notifier(&self) -> &Arc<N> {
        &self.notifier
    }

    pub fn resolver(&self) -> &Arc<RuleResolver<N>> {
        &self.resolver
    }

    /// Creates an entity.
    pub async fn create<E: Entity>(&self, entity: E) -> Result<CommandResult<E>, DispatchError> {
        self.dispatch(CommandKind::Create, entity).await
    }

    /// Updates an entity.
    pub async fn update<E: Entity>(&self, entity: E) -> Result<CommandResult<E>, DispatchError> {
        self.dispatch(CommandKind::Update, entity).await
    }

    /// Deletes an entity.
    pub async fn delete<E: Entity>(&self, entity: E) -> Result<CommandResult<E>, DispatchError> {
        self.dispatch(CommandKind::Delete, entity).await
    }

    #[tracing::instrument(
        skip(self, entity),
        fields(entity_type = E::entity_type(), entity_id = %entity.id())
    )]
    async fn dispatch<E: Entity>(
        &self,
        kind: CommandKind,
        mut entity: E,
    ) -> Result<CommandResult<E>, DispatchError> {
        metrics::counter!("commands_dispatched_total", "kind" => kind.as_str()).increment(1);
        let started = Instant::now();

        let rules = self.resolver.resolve::<E>();
        if !rules.validate(&entity) {
            metrics::counter!("commands_rejected_total", "kind" => kind.as_str()).increment(1);
            tracing::debug!("command rejected by business rules");
            return Ok(CommandResult::rejected());
        }

        match kind {
            CommandKind::Create => rules.apply_create(&mut entity),
            CommandKind::Update => rules.apply_update(&mut entity),
            CommandKind::Delete => rules.apply_delete(&mut entity),
        }
        let command = Command::new(kind, entity);

        self.notifier
            .raise(EntityEvent::new(kind.event_kind(), command.entity().clone()))
            .await?;

        let operation = kind.store_operation();
        tracing::trace!(%operation, "event raised, persisting");
        match operation {
            StoreOperation::Add => self.store.add(command.entity()).await?,
            StoreOperation::Update => self.store.update(command.entity()).await?,
            StoreOperation::Delete => self.store.delete(command.entity()).await?,
        }

        metrics::counter!("commands_succeeded_total", "kind" => kind.as_str()).increment(1);
        metrics::histogram!("command_duration_seconds", "kind" => kind.as_str())
            .record(started.elapsed().as_secs_f64());
        tracing::debug!("command completed");

        Ok(CommandResult::succeeded(command))
    }
}

impl<S, N> Clone for Commander<S, N> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            notifier: self.notifier.clone(),
            resolver: self.resolver.clone(),
        }
    }
}
