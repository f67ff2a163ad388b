//! Fluent proxy construction.

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::advice::{
    ActionChain, FnAction, PostAction, PostActionPolicy, PreAction, SecurityRule, SecurityRules,
};
use crate::config::ProxySettings;
use crate::descriptor::{Capability, CapabilityDescriptor, OperationSignature};
use crate::dispatch::{CreationStrategy, DispatchTable};
use crate::error::{BoxError, ConfigurationError};
use crate::metrics::MetricsRegistry;
use crate::value::Value;

use super::instance::{InstancePolicy, ServiceFactory};
use super::Proxy;

/// Start a builder for `descriptor`, resolved with `strategy`, backed by `factory`.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use proxybuilder::{create_builder, CapabilityDescriptor, CreationStrategy, Value, ValueKind};
///
/// pub trait Service: Send + Sync {
///     fn do_work(&self, txt: &str) -> String;
/// }
///
/// struct ServiceImpl;
///
/// impl Service for ServiceImpl {
///     fn do_work(&self, txt: &str) -> String {
///         format!("{} from orig", txt)
///     }
/// }
///
/// fn service_impl() -> Arc<dyn Service> {
///     Arc::new(ServiceImpl)
/// }
///
/// let descriptor = CapabilityDescriptor::<dyn Service>::new("Service").operation(
///     "doWork",
///     [ValueKind::Str],
///     ValueKind::Str,
///     |svc, args| Ok(Value::from(svc.do_work(args[0].as_str()?))),
/// );
///
/// let proxy = create_builder(descriptor, CreationStrategy::SomeDuplicates, service_impl)
///     .add_security_rule(|| true)
///     .add_pre_action(|_, op, _| {
///         println!("PreAction - {}", op.name());
///         Ok(())
///     })
///     .build()
///     .unwrap();
///
/// let result: String = proxy.call("doWork", &["and gogogo".into()]).unwrap();
/// assert_eq!(result, "and gogogo from orig");
/// ```
pub fn create_builder<T, F>(
    descriptor: CapabilityDescriptor<T>,
    strategy: CreationStrategy,
    factory: F,
) -> ProxyBuilder<T>
where
    T: ?Sized + Send + Sync + 'static,
    F: Fn() -> Arc<T> + Send + Sync + 'static,
{
    ProxyBuilder::new(descriptor)
        .creation_strategy(strategy)
        .service_factory(factory)
}

/// Mutable accumulator of proxy configuration.
///
/// Each call to [`build`](ProxyBuilder::build) freezes a copy of the
/// accumulated state; the builder itself can keep being extended.
pub struct ProxyBuilder<T: ?Sized> {
    descriptor: CapabilityDescriptor<T>,
    strategy: CreationStrategy,
    factory: Option<Arc<dyn ServiceFactory<T>>>,
    rules: SecurityRules,
    actions: ActionChain<T>,
    metrics: Option<Arc<MetricsRegistry>>,
    instance_policy: InstancePolicy,
    post_action_policy: PostActionPolicy,
}

impl<T: ?Sized + Send + Sync + 'static> ProxyBuilder<T> {
    /// Create a builder with default strategy and policies and no factory.
    pub fn new(descriptor: CapabilityDescriptor<T>) -> Self {
        Self {
            descriptor,
            strategy: CreationStrategy::default(),
            factory: None,
            rules: SecurityRules::new(),
            actions: ActionChain::new(),
            metrics: None,
            instance_policy: InstancePolicy::default(),
            post_action_policy: PostActionPolicy::default(),
        }
    }

    /// Create a builder for a type that describes itself.
    pub fn for_capability<F>(strategy: CreationStrategy, factory: F) -> Self
    where
        T: Capability,
        F: Fn() -> Arc<T> + Send + Sync + 'static,
    {
        create_builder(T::descriptor(), strategy, factory)
    }

    /// Create a builder around an already constructed implementation.
    pub fn for_instance(descriptor: CapabilityDescriptor<T>, instance: Arc<T>) -> Self {
        Self::new(descriptor).service_factory(move || Arc::clone(&instance))
    }

    pub fn creation_strategy(mut self, strategy: CreationStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Set the factory from a closure.
    pub fn service_factory<F>(mut self, factory: F) -> Self
    where
        F: Fn() -> Arc<T> + Send + Sync + 'static,
    {
        self.factory = Some(Arc::new(factory));
        self
    }

    /// Set the factory from a named [`ServiceFactory`] implementation.
    pub fn with_factory(mut self, factory: impl ServiceFactory<T> + 'static) -> Self {
        self.factory = Some(Arc::new(factory));
        self
    }

    /// Append a closure pre-action.
    pub fn add_pre_action<F>(mut self, action: F) -> Self
    where
        F: Fn(&T, &OperationSignature, &[Value]) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        self.actions.push_pre(Arc::new(FnAction(action)));
        self
    }

    /// Append a named [`PreAction`] implementation.
    pub fn add_pre_action_hook(mut self, action: impl PreAction<T> + 'static) -> Self {
        self.actions.push_pre(Arc::new(action));
        self
    }

    /// Append a closure post-action.
    pub fn add_post_action<F>(mut self, action: F) -> Self
    where
        F: Fn(&T, &OperationSignature, &[Value]) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        self.actions.push_post(Arc::new(FnAction(action)));
        self
    }

    /// Append a named [`PostAction`] implementation.
    pub fn add_post_action_hook(mut self, action: impl PostAction<T> + 'static) -> Self {
        self.actions.push_post(Arc::new(action));
        self
    }

    pub fn add_security_rule(mut self, rule: impl SecurityRule + 'static) -> Self {
        self.rules.push(Arc::new(rule));
        self
    }

    /// Record invocation metrics into the process-wide registry.
    pub fn add_metrics(self) -> Self {
        self.add_metrics_to(MetricsRegistry::global())
    }

    /// Record invocation metrics into `registry`.
    pub fn add_metrics_to(mut self, registry: Arc<MetricsRegistry>) -> Self {
        self.metrics = Some(registry);
        self
    }

    pub fn instance_policy(mut self, policy: InstancePolicy) -> Self {
        self.instance_policy = policy;
        self
    }

    pub fn post_action_policy(mut self, policy: PostActionPolicy) -> Self {
        self.post_action_policy = policy;
        self
    }

    /// Apply loaded settings. Only policies present in `settings` replace
    /// the builder's; metrics are only ever switched on here, never off.
    pub fn with_settings(mut self, settings: &ProxySettings) -> Self {
        if let Some(strategy) = settings.creation_strategy {
            self.strategy = strategy;
        }
        if let Some(policy) = settings.instance_policy {
            self.instance_policy = policy;
        }
        if let Some(policy) = settings.post_action_policy {
            self.post_action_policy = policy;
        }
        if settings.metrics && self.metrics.is_none() {
            self.metrics = Some(MetricsRegistry::global());
        }
        self
    }

    /// Validate and freeze the configuration into a new proxy.
    ///
    /// Each call returns an independent proxy with its own lazy instance.
    pub fn build(&self) -> Result<Proxy<T>, ConfigurationError> {
        let factory = self
            .factory
            .clone()
            .ok_or_else(|| ConfigurationError::MissingFactory(self.descriptor.name().to_string()))?;
        let table = DispatchTable::compile(&self.descriptor, self.strategy)?;

        debug!(
            capability = %self.descriptor.name(),
            operations = self.descriptor.len(),
            rules = self.rules.len(),
            pre_actions = self.actions.pre_len(),
            post_actions = self.actions.post_len(),
            metrics = self.metrics.is_some(),
            "Building proxy"
        );

        Ok(Proxy::new(ProxyConfiguration {
            descriptor: self.descriptor.clone(),
            table,
            factory,
            rules: self.rules.clone(),
            actions: self.actions.clone(),
            metrics: self.metrics.clone(),
            instance_policy: self.instance_policy,
            post_action_policy: self.post_action_policy,
        }))
    }
}

impl<T: ?Sized> Clone for ProxyBuilder<T> {
    fn clone(&self) -> Self {
        Self {
            descriptor: self.descriptor.clone(),
            strategy: self.strategy,
            factory: self.factory.clone(),
            rules: self.rules.clone(),
            actions: self.actions.clone(),
            metrics: self.metrics.clone(),
            instance_policy: self.instance_policy,
            post_action_policy: self.post_action_policy,
        }
    }
}

impl<T: ?Sized> fmt::Debug for ProxyBuilder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxyBuilder")
            .field("capability", &self.descriptor.name())
            .field("strategy", &self.strategy)
            .field("has_factory", &self.factory.is_some())
            .field("rules", &self.rules)
            .field("actions", &self.actions)
            .field("metrics", &self.metrics.is_some())
            .field("instance_policy", &self.instance_policy)
            .field("post_action_policy", &self.post_action_policy)
            .finish()
    }
}

/// Frozen configuration a [`Proxy`] runs its pipeline against.
pub struct ProxyConfiguration<T: ?Sized> {
    descriptor: CapabilityDescriptor<T>,
    table: DispatchTable,
    factory: Arc<dyn ServiceFactory<T>>,
    rules: SecurityRules,
    actions: ActionChain<T>,
    metrics: Option<Arc<MetricsRegistry>>,
    instance_policy: InstancePolicy,
    post_action_policy: PostActionPolicy,
}

impl<T: ?Sized> ProxyConfiguration<T> {
    pub fn descriptor(&self) -> &CapabilityDescriptor<T> {
        &self.descriptor
    }

    pub fn creation_strategy(&self) -> CreationStrategy {
        self.table.strategy()
    }

    pub fn security_rules(&self) -> &SecurityRules {
        &self.rules
    }

    pub fn actions(&self) -> &ActionChain<T> {
        &self.actions
    }

    /// Registry invocations are recorded into, if metrics are enabled.
    pub fn metrics(&self) -> Option<&Arc<MetricsRegistry>> {
        self.metrics.as_ref()
    }

    pub fn metrics_enabled(&self) -> bool {
        self.metrics.is_some()
    }

    pub fn instance_policy(&self) -> InstancePolicy {
        self.instance_policy
    }

    pub fn post_action_policy(&self) -> PostActionPolicy {
        self.post_action_policy
    }

    pub(crate) fn table(&self) -> &DispatchTable {
        &self.table
    }

    pub(crate) fn factory(&self) -> &dyn ServiceFactory<T> {
        &*self.factory
    }
}

impl<T: ?Sized> fmt::Debug for ProxyConfiguration<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxyConfiguration")
            .field("capability", &self.descriptor.name())
            .field("strategy", &self.table.strategy())
            .field("rules", &self.rules)
            .field("actions", &self.actions)
            .field("metrics", &self.metrics.is_some())
            .field("instance_policy", &self.instance_policy)
            .field("post_action_policy", &self.post_action_policy)
            .finish()
    }
}
