//! Command and result value types.

use domain_events::EventKind;
use entity_store::StoreOperation;

use crate::Entity;

/// The mutation a command performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    Create,
    Update,
    Delete,
}

impl CommandKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommandKind::Create => "create",
            CommandKind::Update => "update",
            CommandKind::Delete => "delete",
        }
    }

    /// Returns the event raised when a command of this kind succeeds.
    pub fn event_kind(&self) -> EventKind {
        match self {
            CommandKind::Create => EventKind::Created,
            CommandKind::Update => EventKind::Updated,
            CommandKind::Delete => EventKind::Deleted,
        }
    }

    /// Returns the store operation a command of this kind ends with.
    pub fn store_operation(&self) -> StoreOperation {
        match self {
            CommandKind::Create => StoreOperation::Add,
            CommandKind::Update => StoreOperation::Update,
            CommandKind::Delete => StoreOperation::Delete,
        }
    }
}

impl std::fmt::Display for CommandKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An accepted mutation of a single entity.
///
/// Built once the entity has passed validation and its mutation hook, and
/// never changed afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Command<E> {
    kind: CommandKind,
    entity: E,
}

impl<E: Entity> Command<E> {
    pub fn new(kind: CommandKind, entity: E) -> Self {
        Self { kind, entity }
    }

    pub fn kind(&self) -> CommandKind {
        self.kind
    }

    /// Returns the entity as it was after the mutation hook ran.
    pub fn entity(&self) -> &E {
        &self.entity
    }

    pub fn into_entity(self) -> E {
        self.entity
    }
}

/// Outcome of a dispatch call.
///
/// A result carries its command exactly when it succeeded; success is
/// derived from the command's presence rather than stored next to it.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandResult<E> {
    command: Option<Command<E>>,
}

impl<E: Entity> CommandResult<E> {
    /// Result of a command that ran to completion.
    pub fn succeeded(command: Command<E>) -> Self {
        Self {
            command: Some(command),
        }
    }

    /// Result of a command the business rules refused.
    pub fn rejected() -> Self {
        Self { command: None }
    }

    pub fn is_success(&self) -> bool {
        self.command.is_some()
    }

    pub fn command(&self) -> Option<&Command<E>> {
        self.command.as_ref()
    }

    pub fn into_command(self) -> Option<Command<E>> {
        self.command
    }
}
