//! Shared types for the command dispatcher workspace.

pub mod entity;
pub mod id;

pub use entity::Entity;
pub use id::EntityId;
