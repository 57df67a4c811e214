//! Entity lifecycle events and their delivery.
//!
//! This crate provides:
//! - `EntityEvent`, the typed Created/Updated/Deleted event
//! - `EventEnvelope`, its serialized form handed to subscribers
//! - the `Notifier` trait the command dispatcher raises events through
//! - `EventBus`, a notifier fanning events out to registered subscribers

pub mod bus;
pub mod error;
pub mod event;
pub mod notifier;
pub mod subscribers;

pub use bus::{EventBus, Subscriber};
pub use common::{Entity, EntityId};
pub use error::{NotifyError, Result};
pub use event::{EntityEvent, EventEnvelope, EventId, EventKind};
pub use notifier::Notifier;
pub use subscribers::{LoggingSubscriber, RecordingSubscriber};
