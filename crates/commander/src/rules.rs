//! Per-type business rules.

use std::marker::PhantomData;
use std::sync::Arc;

use domain_events::Notifier;

use crate::Entity;

/// Validation and mutation hooks for one entity type.
///
/// The dispatcher calls `validate` first and stops there if it returns
/// false. Otherwise it calls the hook matching the command kind, which may
/// adjust the entity (e.g. fill in defaults) but must not persist it.
/// Hooks default to leaving the entity untouched.
pub trait BusinessRules<E: Entity>: Send + Sync {
    /// Decides whether the entity may go through. Must be side-effect free.
    fn validate(&self, entity: &E) -> bool;

    fn apply_create(&self, _entity: &mut E) {}

    fn apply_update(&self, _entity: &mut E) {}

    fn apply_delete(&self, _entity: &mut E) {}
}

/// Rules used for any entity type nobody registered rules for.
///
/// Accepts every entity and leaves it unchanged. Keeps a handle on the
/// shared notifier so wrappers built on top of it can raise their own
/// events.
pub struct DefaultRules<E, N> {
    notifier: Arc<N>,
    _phantom: PhantomData<fn() -> E>,
}

impl<E: Entity, N: Notifier> DefaultRules<E, N> {
    pub fn new(notifier: Arc<N>) -> Self {
        Self {
            notifier,
            _phantom: PhantomData,
        }
    }

    /// Returns the notifier these rules were wired with.
    pub fn notifier(&self) -> &Arc<N> {
        &self.notifier
    }
}

impl<E: Entity, N: Notifier> BusinessRules<E> for DefaultRules<E, N> {
    fn validate(&self, _entity: &E) -> bool {
        true
    }
}
