//! Lookup of business rules by entity type.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use domain_events::Notifier;

use crate::Entity;
use crate::rules::{BusinessRules, DefaultRules};

type Erased = Arc<dyn Any + Send + Sync>;

/// Builds the rules for one entity type, given the shared notifier.
pub type RulesFactory<E, N> = Arc<dyn Fn(&Arc<N>) -> Arc<dyn BusinessRules<E>> + Send + Sync>;

/// What the resolver does with default rules it constructs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DefaultRulesPolicy {
    /// Build once per entity type and hand out the same instance afterwards.
    #[default]
    Cached,
    /// Build a fresh instance on every resolve.
    PerCall,
}

/// Resolves the business rules for an entity type.
///
/// Rules registered for a type win. Any other type gets [`DefaultRules`]
/// wired with the shared notifier, so resolution never fails. Both tables
/// are keyed by the entity's `TypeId`.
pub struct RuleResolver<N> {
    notifier: Arc<N>,
    policy: DefaultRulesPolicy,
    factories: HashMap<TypeId, Erased>,
    defaults: RwLock<HashMap<TypeId, Erased>>,
    constructed: AtomicUsize,
}

impl<N: Notifier> RuleResolver<N> {
    /// Creates a resolver that caches default rules.
    pub fn new(notifier: Arc<N>) -> Self {
        Self::with_policy(notifier, DefaultRulesPolicy::default())
    }

    pub fn with_policy(notifier: Arc<N>, policy: DefaultRulesPolicy) -> Self {
        Self {
            notifier,
            policy,
            factories: HashMap::new(),
            defaults: RwLock::new(HashMap::new()),
            constructed: AtomicUsize::new(0),
        }
    }

    pub fn policy(&self) -> DefaultRulesPolicy {
        self.policy
    }

    pub fn notifier(&self) -> &Arc<N> {
        &self.notifier
    }

    /// Registers a factory building the rules for `E`.
    ///
    /// The factory runs on every resolve of `E`. A previous registration
    /// or cached default for `E` is replaced.
    pub fn register<E, F>(&mut self, factory: F) -> &mut Self
    where
        E: Entity,
        F: Fn(&Arc<N>) -> Arc<dyn BusinessRules<E>> + Send + Sync + 'static,
    {
        let type_id = TypeId::of::<E>();
        let factory: RulesFactory<E, N> = Arc::new(factory);
        self.factories.insert(type_id, Arc::new(factory));
        self.defaults
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&type_id);
        tracing::debug!(entity_type = E::entity_type(), "business rules registered");
        self
    }

    /// Registers a single shared rules instance for `E`.
    pub fn register_rules<E, R>(&mut self, rules: R) -> &mut Self
    where
        E: Entity,
        R: BusinessRules<E> + 'static,
    {
        let rules: Arc<dyn BusinessRules<E>> = Arc::new(rules);
        self.register::<E, _>(move |_| rules.clone())
    }

    /// Builder-style variant of [`RuleResolver::register_rules`].
    pub fn with_rules<E, R>(mut self, rules: R) -> Self
    where
        E: Entity,
        R: BusinessRules<E> + 'static,
    {
        self.register_rules::<E, R>(rules);
        self
    }

    /// Returns true if rules were registered for `E`.
    pub fn is_registered<E: Entity>(&self) -> bool {
        self.factories.contains_key(&TypeId::of::<E>())
    }

    pub fn registered_count(&self) -> usize {
        self.factories.len()
    }

    /// Returns the number of entity types with a cached default.
    pub fn cached_defaults(&self) -> usize {
        self.defaults
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns how many default rules instances this resolver has built.
    pub fn defaults_constructed(&self) -> usize {
        self.constructed.load(Ordering::Relaxed)
    }

    /// Returns the rules for `E`: the registered ones, or defaults.
    pub fn resolve<E: Entity>(&self) -> Arc<dyn BusinessRules<E>> {
        let registered = self
            .factories
            .get(&TypeId::of::<E>())
            .and_then(|erased| erased.downcast_ref::<RulesFactory<E, N>>());
        if let Some(factory) = registered {
            return factory(&self.notifier);
        }

        match self.policy {
            DefaultRulesPolicy::Cached => self.cached_default::<E>(),
            DefaultRulesPolicy::PerCall => self.build_default::<E>(),
        }
    }

    fn cached_default<E: Entity>(&self) -> Arc<dyn BusinessRules<E>> {
        let type_id = TypeId::of::<E>();

        let cached = self
            .defaults
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&type_id)
            .and_then(|erased| erased.downcast_ref::<Arc<dyn BusinessRules<E>>>())
            .cloned();
        if let Some(rules) = cached {
            return rules;
        }

        // Racing first resolves of the same type all land here; only the
        // first one under the write lock inserts.
        let mut defaults = self
            .defaults
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let entry = defaults
            .entry(type_id)
            .or_insert_with(|| Arc::new(self.build_default::<E>()) as Erased);

        match entry.downcast_ref::<Arc<dyn BusinessRules<E>>>() {
            Some(rules) => rules.clone(),
            None => self.build_default::<E>(),
        }
    }

    fn build_default<E: Entity>(&self) -> Arc<dyn BusinessRules<E>> {
        self.constructed.fetch_add(1, Ordering::Relaxed);
        metrics::counter!("rules_defaults_constructed_total").increment(1);
        tracing::debug!(entity_type = E::entity_type(), "constructing default rules");
        Arc::new(DefaultRules::<E, N>::new(self.notifier.clone()))
    }
}
