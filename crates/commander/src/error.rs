//! Dispatch error types.

use domain_events::NotifyError;
use entity_store::StoreError;
use thiserror::Error;

/// Faults raised by a collaborator while dispatching a command.
///
/// Validation rejection is not an error; it comes back as a rejected
/// [`CommandResult`](crate::CommandResult). A `Store` error means the event
/// for the command has already been raised; a `Notify` error may mean some
/// observers saw it before delivery failed.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The notifier failed to raise the event. Nothing was persisted, but
    /// subscribers ahead of the failing one may have handled the event.
    #[error("Notifier error: {0}")]
    Notify(#[from] NotifyError),

    /// The store failed after the event was raised.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl DispatchError {
    /// Returns true if any observer saw the event even though the entity
    /// was not persisted.
    pub fn event_raised(&self) -> bool {
        match self {
            DispatchError::Notify(err) => err.delivered() > 0,
            DispatchError::Store(_) => true,
        }
    }
}
