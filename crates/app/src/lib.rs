//! Composition root for the command dispatcher.
//!
//! Wires the in-memory store, an event bus with a logging subscriber and a
//! rule resolver into a [`Commander`], and drives a short demonstration run.

pub mod config;
pub mod widget;

use std::sync::Arc;

use commander::{Commander, DispatchError, EntityId, RuleResolver};
use domain_events::{EventBus, LoggingSubscriber};
use entity_store::InMemoryStore;

use config::Config;
use widget::{Widget, WidgetRules};

/// The commander as wired by this application.
pub type AppCommander = Commander<InMemoryStore, EventBus>;

/// Builds the commander and its collaborators.
///
/// `Widget` gets [`WidgetRules`]; every other entity type falls back to
/// default rules under the configured caching policy.
pub fn build_commander(config: &Config) -> AppCommander {
    let notifier = Arc::new(EventBus::new().with_subscriber(Arc::new(LoggingSubscriber)));
    let resolver = RuleResolver::with_policy(notifier.clone(), config.default_rules)
        .with_rules::<Widget, _>(WidgetRules);

    Commander::new(
        Arc::new(InMemoryStore::new()),
        notifier,
        Arc::new(resolver),
    )
}

/// Counts of what happened during a demo run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DemoSummary {
    pub succeeded: u32,
    pub rejected: u32,
}

/// Creates, updates and deletes `widgets` widgets, then submits one widget
/// the rules refuse.
#[tracing::instrument(skip(commander))]
pub async fn run_demo(commander: &AppCommander, widgets: u32) -> Result<DemoSummary, DispatchError> {
    let mut summary = DemoSummary::default();

    for n in 1..=widgets {
        let widget = Widget::new(EntityId::new(), format!(" widget {n} "));

        let created = commander.create(widget).await?;
        let Some(command) = created.into_command() else {
            summary.rejected += 1;
            continue;
        };
        summary.succeeded += 1;
        let widget = command.into_entity();
        tracing::info!(widget_id = %widget.id, name = %widget.name, "widget created");

        let updated = commander.update(widget).await?;
        let Some(command) = updated.into_command() else {
            summary.rejected += 1;
            continue;
        };
        summary.succeeded += 1;
        let widget = command.into_entity();
        tracing::info!(widget_id = %widget.id, revision = widget.revision, "widget updated");

        let deleted = commander.delete(widget).await?;
        if deleted.is_success() {
            summary.succeeded += 1;
        } else {
            summary.rejected += 1;
        }
    }

    let refused = commander
        .create(Widget::new(EntityId::nil(), "unassigned"))
        .await?;
    if refused.is_success() {
        summary.succeeded += 1;
    } else {
        tracing::info!("widget without an id was rejected");
        summary.rejected += 1;
    }

    Ok(summary)
}
