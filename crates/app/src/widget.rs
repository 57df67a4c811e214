//! The demonstration entity and its business rules.

use commander::{BusinessRules, Entity, EntityId};
use serde::{Deserialize, Serialize};

/// A small catalogue item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Widget {
    pub id: EntityId,
    pub name: String,
    pub revision: u32,
    pub discontinued: bool,
}

impl Widget {
    pub fn new(id: EntityId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            revision: 0,
            discontinued: false,
        }
    }
}

impl Entity for Widget {
    fn entity_type() -> &'static str {
        "Widget"
    }

    fn id(&self) -> EntityId {
        self.id
    }
}

/// Widgets need an assigned ID. Names are trimmed on create, each
/// update bumps the revision, and deletes mark the widget discontinued.
#[derive(Debug, Default)]
pub struct WidgetRules;

impl BusinessRules<Widget> for WidgetRules {
    fn validate(&self, entity: &Widget) -> bool {
        !entity.id.is_nil()
    }

    fn apply_create(&self, entity: &mut Widget) {
        let trimmed = entity.name.trim();
        entity.name = if trimmed.is_empty() {
            format!("widget-{}", entity.id)
        } else {
            trimmed.to_string()
        };
    }

    fn apply_update(&self, entity: &mut Widget) {
        entity.revision += 1;
    }

    fn apply_delete(&self, entity: &mut Widget) {
        entity.discontinued = true;
    }
}
