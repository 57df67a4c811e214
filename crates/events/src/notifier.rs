use async_trait::async_trait;

use crate::{Entity, EntityEvent, Result};

/// Receives entity lifecycle events from the dispatcher.
///
/// The dispatcher raises exactly one event per successful command and
/// awaits it before touching the store. An error returned here aborts the
/// command and reaches the caller unchanged; nothing is retried.
#[async_trait]
pub trait Notifier: Send + Sync + 'static {
    /// Raises an event to whoever is listening.
    async fn raise<E: Entity>(&self, event: EntityEvent<E>) -> Result<()>;
}
