//! Command dispatch for arbitrary entity types.
//!
//! This crate provides:
//! - `Command` and `CommandResult` value types
//! - the `BusinessRules` trait and its accept-everything `DefaultRules`
//! - `RuleResolver`, which finds registered rules or falls back to defaults
//! - `Commander`, which sequences validate, mutate, notify and persist

pub mod command;
pub mod dispatcher;
pub mod error;
pub mod resolver;
pub mod rules;

pub use command::{Command, CommandKind, CommandResult};
pub use common::{Entity, EntityId};
pub use dispatcher::Commander;
pub use error::DispatchError;
pub use resolver::{DefaultRulesPolicy, RuleResolver};
pub use rules::{BusinessRules, DefaultRules};
