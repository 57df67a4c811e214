//! Integration tests for the command dispatcher.
//!
//! The collaborators here write every call into a shared log so the tests
//! can check both what reached the notifier and store and in which order.

use std::sync::{Arc, Barrier, Mutex};
use std::thread;

use async_trait::async_trait;
use commander::{
    BusinessRules, CommandKind, Commander, DefaultRulesPolicy, DispatchError, Entity, EntityId,
    RuleResolver,
};
use domain_events::{EntityEvent, EventBus, EventKind, Notifier, NotifyError, RecordingSubscriber};
use entity_store::{InMemoryStore, Store, StoreError, StoreOperation};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Widget {
    id: EntityId,
    name: String,
    revision: u32,
    archived: bool,
}

impl Widget {
    fn new(n: u128) -> Self {
        Self {
            id: EntityId::from_u128(n),
            name: String::new(),
            revision: 0,
            archived: false,
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

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Gasket {
    id: EntityId,
}

impl Entity for Gasket {
    fn entity_type() -> &'static str {
        "Gasket"
    }

    fn id(&self) -> EntityId {
        self.id
    }
}

/// Accepts every widget except id 0, and adjusts widgets per command kind.
struct WidgetRules;

impl BusinessRules<Widget> for WidgetRules {
    fn validate(&self, entity: &Widget) -> bool {
        !entity.id.is_nil()
    }

    fn apply_create(&self, entity: &mut Widget) {
        if entity.name.is_empty() {
            entity.name = "unnamed".to_string();
        }
    }

    fn apply_update(&self, entity: &mut Widget) {
        entity.revision += 1;
    }

    fn apply_delete(&self, entity: &mut Widget) {
        entity.archived = true;
    }
}

struct AcceptAll;

impl BusinessRules<Widget> for AcceptAll {
    fn validate(&self, _entity: &Widget) -> bool {
        true
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Raised(EventKind, EntityId),
    Stored(StoreOperation, EntityId),
}

#[derive(Clone, Default)]
struct CallLog(Arc<Mutex<Vec<Call>>>);

impl CallLog {
    fn push(&self, call: Call) {
        self.0.lock().unwrap().push(call);
    }

    fn calls(&self) -> Vec<Call> {
        self.0.lock().unwrap().clone()
    }
}

struct LoggingNotifier {
    log: CallLog,
    fail: bool,
}

#[async_trait]
impl Notifier for LoggingNotifier {
    async fn raise<E: Entity>(&self, event: EntityEvent<E>) -> Result<(), NotifyError> {
        if self.fail {
            return Err(NotifyError::Subscriber {
                subscriber: "logging-notifier",
                reason: "offline".to_string(),
                delivered: 0,
            });
        }
        self.log.push(Call::Raised(event.kind(), event.entity().id()));
        Ok(())
    }
}

struct LoggingStore {
    log: CallLog,
    fail_on: Option<StoreOperation>,
}

impl LoggingStore {
    fn record(&self, operation: StoreOperation, id: EntityId) -> Result<(), StoreError> {
        if self.fail_on == Some(operation) {
            return Err(StoreError::Unavailable {
                operation,
                reason: "disk full".to_string(),
            });
        }
        self.log.push(Call::Stored(operation, id));
        Ok(())
    }
}

#[async_trait]
impl Store for LoggingStore {
    async fn add<E: Entity>(&self, entity: &E) -> Result<(), StoreError> {
        self.record(StoreOperation::Add, entity.id())
    }

    async fn update<E: Entity>(&self, entity: &E) -> Result<(), StoreError> {
        self.record(StoreOperation::Update, entity.id())
    }

    async fn delete<E: Entity>(&self, entity: &E) -> Result<(), StoreError> {
        self.record(StoreOperation::Delete, entity.id())
    }
}

struct Harness {
    commander: Commander<LoggingStore, LoggingNotifier>,
    log: CallLog,
}

fn harness_with(
    notifier_fails: bool,
    store_fails_on: Option<StoreOperation>,
    rules: impl BusinessRules<Widget> + 'static,
) -> Harness {
    let log = CallLog::default();
    let notifier = Arc::new(LoggingNotifier {
        log: log.clone(),
        fail: notifier_fails,
    });
    let store = Arc::new(LoggingStore {
        log: log.clone(),
        fail_on: store_fails_on,
    });
    let resolver = Arc::new(RuleResolver::new(notifier.clone()).with_rules::<Widget, _>(rules));
    Harness {
        commander: Commander::new(store, notifier, resolver),
        log,
    }
}

fn harness() -> Harness {
    harness_with(false, None, WidgetRules)
}

mod rejection {
    use super::*;

    #[tokio::test]
    async fn rejected_create_touches_nothing() {
        let h = harness();

        let result = h.commander.create(Widget::new(0)).await.unwrap();

        assert!(!result.is_success());
        assert!(result.command().is_none());
        assert!(h.log.calls().is_empty());
    }

    #[tokio::test]
    async fn rejected_update_and_delete_touch_nothing() {
        let h = harness();

        let update = h.commander.update(Widget::new(0)).await.unwrap();
        let delete = h.commander.delete(Widget::new(0)).await.unwrap();

        assert!(!update.is_success());
        assert!(!delete.is_success());
        assert!(h.log.calls().is_empty());
    }

    #[tokio::test]
    async fn rejection_wins_over_failing_collaborators() {
        let h = harness_with(true, Some(StoreOperation::Add), WidgetRules);

        let result = h.commander.create(Widget::new(0)).await.unwrap();

        assert!(!result.is_success());
    }
}

mod success {
    use super::*;

    #[tokio::test]
    async fn create_widget_one() {
        let h = harness_with(false, None, AcceptAll);
        let id = EntityId::from_u128(1);

        let result = h.commander.create(Widget::new(1)).await.unwrap();

        assert!(result.is_success());
        let command = result.command().unwrap();
        assert_eq!(command.kind(), CommandKind::Create);
        assert_eq!(command.entity(), &Widget::new(1));
        assert_eq!(
            h.log.calls(),
            vec![
                Call::Raised(EventKind::Created, id),
                Call::Stored(StoreOperation::Add, id),
            ]
        );
    }

    #[tokio::test]
    async fn each_kind_raises_then_stores_once() {
        let h = harness();
        let id = EntityId::from_u128(5);

        h.commander.create(Widget::new(5)).await.unwrap();
        h.commander.update(Widget::new(5)).await.unwrap();
        h.commander.delete(Widget::new(5)).await.unwrap();

        assert_eq!(
            h.log.calls(),
            vec![
                Call::Raised(EventKind::Created, id),
                Call::Stored(StoreOperation::Add, id),
                Call::Raised(EventKind::Updated, id),
                Call::Stored(StoreOperation::Update, id),
                Call::Raised(EventKind::Deleted, id),
                Call::Stored(StoreOperation::Delete, id),
            ]
        );
    }

    #[tokio::test]
    async fn each_kind_runs_its_own_hook() {
        let h = harness();

        let created = h.commander.create(Widget::new(2)).await.unwrap();
        let updated = h.commander.update(Widget::new(2)).await.unwrap();
        let deleted = h.commander.delete(Widget::new(2)).await.unwrap();

        let created = created.into_command().unwrap().into_entity();
        assert_eq!(created.name, "unnamed");
        assert_eq!(created.revision, 0);

        let updated = updated.into_command().unwrap().into_entity();
        assert_eq!(updated.name, "");
        assert_eq!(updated.revision, 1);
        assert!(!updated.archived);

        let deleted = deleted.into_command().unwrap().into_entity();
        assert_eq!(deleted.revision, 0);
        assert!(deleted.archived);
    }

    #[tokio::test]
    async fn unregistered_type_goes_through_defaults() {
        let h = harness();
        let id = EntityId::nil();

        let result = h.commander.create(Gasket { id }).await.unwrap();

        assert!(result.is_success());
        assert_eq!(
            h.log.calls(),
            vec![
                Call::Raised(EventKind::Created, id),
                Call::Stored(StoreOperation::Add, id),
            ]
        );
    }
}

mod collaborator_failures {
    use super::*;

    #[tokio::test]
    async fn store_failure_after_raise_propagates() {
        let h = harness_with(false, Some(StoreOperation::Add), WidgetRules);
        let id = EntityId::from_u128(1);

        let err = h.commander.create(Widget::new(1)).await.unwrap_err();

        assert!(matches!(
            err,
            DispatchError::Store(StoreError::Unavailable {
                operation: StoreOperation::Add,
                ..
            })
        ));
        assert!(err.event_raised());
        assert_eq!(h.log.calls(), vec![Call::Raised(EventKind::Created, id)]);
    }

    #[tokio::test]
    async fn notifier_failure_propagates_without_store_call() {
        let h = harness_with(true, None, WidgetRules);

        let err = h.commander.update(Widget::new(1)).await.unwrap_err();

        assert!(matches!(err, DispatchError::Notify(NotifyError::Subscriber { .. })));
        assert!(!err.event_raised());
        assert!(h.log.calls().is_empty());
    }

    #[tokio::test]
    async fn partial_delivery_counts_as_raised() {
        let recorder = Arc::new(RecordingSubscriber::new());
        let notifier = Arc::new(
            EventBus::new()
                .with_subscriber(recorder.clone())
                .with_subscriber(Arc::new(RecordingSubscriber::failing())),
        );
        let store = Arc::new(InMemoryStore::new());
        let commander = Commander::with_default_rules(store.clone(), notifier);

        let err = commander.create(Widget::new(1)).await.unwrap_err();

        assert!(matches!(
            err,
            DispatchError::Notify(NotifyError::Subscriber { delivered: 1, .. })
        ));
        assert!(err.event_raised());
        assert_eq!(recorder.event_count(), 1);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn in_memory_store_failure_leaves_event_delivered() {
        let recorder = Arc::new(RecordingSubscriber::new());
        let notifier = Arc::new(EventBus::new().with_subscriber(recorder.clone()));
        let store = Arc::new(InMemoryStore::new());
        store.fail_next(StoreOperation::Add).await;
        let commander = Commander::with_default_rules(store.clone(), notifier);

        let result = commander.create(Widget::new(1)).await;

        assert!(matches!(result, Err(DispatchError::Store(_))));
        assert_eq!(recorder.event_count(), 1);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn no_retry_after_store_failure() {
        let store = Arc::new(InMemoryStore::new());
        let commander = Commander::with_default_rules(store.clone(), Arc::new(EventBus::new()));
        commander.create(Widget::new(1)).await.unwrap();

        let err = commander.create(Widget::new(1)).await.unwrap_err();

        assert!(matches!(
            err,
            DispatchError::Store(StoreError::AlreadyExists { .. })
        ));
        assert_eq!(store.len().await, 1);
    }
}

mod resolution {
    use super::*;

    #[tokio::test]
    async fn defaults_resolved_twice_behave_identically() {
        for policy in [DefaultRulesPolicy::Cached, DefaultRulesPolicy::PerCall] {
            let resolver = RuleResolver::with_policy(Arc::new(EventBus::new()), policy);

            let first = resolver.resolve::<Gasket>();
            let second = resolver.resolve::<Gasket>();

            let gasket = Gasket {
                id: EntityId::nil(),
            };
            assert_eq!(first.validate(&gasket), second.validate(&gasket));
            assert!(first.validate(&gasket));

            let (mut a, mut b) = (gasket.clone(), gasket.clone());
            first.apply_create(&mut a);
            second.apply_create(&mut b);
            assert_eq!(a, b);
        }
    }

    #[test]
    fn concurrent_first_resolution_caches_one_default() {
        const THREADS: usize = 16;
        let resolver = RuleResolver::new(Arc::new(EventBus::new()));
        let barrier = Barrier::new(THREADS);

        let resolved: Vec<_> = thread::scope(|scope| {
            let handles: Vec<_> = (0..THREADS)
                .map(|_| {
                    scope.spawn(|| {
                        barrier.wait();
                        resolver.resolve::<Gasket>()
                    })
                })
                .collect();
            handles
                .into_iter()
                .map(|handle| handle.join().unwrap())
                .collect()
        });

        assert_eq!(resolver.cached_defaults(), 1);
        assert_eq!(resolver.defaults_constructed(), 1);
        assert!(resolved.windows(2).all(|pair| Arc::ptr_eq(&pair[0], &pair[1])));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_dispatch_of_distinct_entities() {
        let store = Arc::new(InMemoryStore::new());
        let recorder = Arc::new(RecordingSubscriber::new());
        let notifier = Arc::new(EventBus::new().with_subscriber(recorder.clone()));
        let commander = Commander::with_default_rules(store.clone(), notifier);

        let handles: Vec<_> = (1..=50u128)
            .map(|n| {
                let commander = commander.clone();
                tokio::spawn(async move { commander.create(Widget::new(n)).await })
            })
            .collect();

        for handle in handles {
            assert!(handle.await.unwrap().unwrap().is_success());
        }

        assert_eq!(store.len().await, 50);
        assert_eq!(recorder.event_count(), 50);
        assert_eq!(commander.resolver().cached_defaults(), 1);
    }
}
