use std::fmt::Debug;

use serde::{Serialize, de::DeserializeOwned};

use crate::EntityId;

/// A mutable domain object with a stable identity.
///
/// Any type implementing this trait can flow through the command
/// dispatcher. The serde bounds let collaborators (stores, event
/// buses) carry the entity in a type-erased JSON form.
pub trait Entity: Serialize + DeserializeOwned + Clone + Debug + Send + Sync + 'static {
    /// Returns the entity type name.
    ///
    /// Used in error messages, stored records and as the prefix of event
    /// type names, so it should be stable across releases. It is not an
    /// identity: stores key on the Rust type, and two types may share a name.
    fn entity_type() -> &'static str;

    /// Returns the entity's identifier.
    fn id(&self) -> EntityId;
}
