//! Lazily created underlying instances.

use std::fmt;
use std::sync::{Arc, OnceLock};

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Supplier of the implementation a proxy delegates to.
///
/// Closures `Fn() -> Arc<T>` implement this automatically.
pub trait ServiceFactory<T: ?Sized>: Send + Sync {
    fn create_instance(&self) -> Arc<T>;
}

impl<T, F> ServiceFactory<T> for F
where
    T: ?Sized,
    F: Fn() -> Arc<T> + Send + Sync,
{
    fn create_instance(&self) -> Arc<T> {
        self()
    }
}

/// When a proxy asks its [`ServiceFactory`] for an instance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstancePolicy {
    /// Create once, on the first authorized call, and reuse for the proxy's lifetime.
    #[default]
    Shared,
    /// Create a fresh instance for every authorized call.
    PerCall,
}

/// Per-proxy holder of the underlying instance.
pub(crate) struct InstanceSlot<T: ?Sized> {
    policy: InstancePolicy,
    cell: OnceLock<Arc<T>>,
}

impl<T: ?Sized> InstanceSlot<T> {
    pub(crate) fn new(policy: InstancePolicy) -> Self {
        Self {
            policy,
            cell: OnceLock::new(),
        }
    }

    /// Fetch the instance, creating it if the policy requires.
    ///
    /// Under [`InstancePolicy::Shared`] concurrent first callers block until
    /// the single creation finishes; later calls only clone the `Arc`. The
    /// factory must not call back into the same proxy while creating.
    pub(crate) fn get(&self, factory: &dyn ServiceFactory<T>, capability: &str) -> Arc<T> {
        match self.policy {
            InstancePolicy::Shared => Arc::clone(self.cell.get_or_init(|| {
                debug!(capability = %capability, "Creating shared instance");
                factory.create_instance()
            })),
            InstancePolicy::PerCall => factory.create_instance(),
        }
    }

    pub(crate) fn is_materialized(&self) -> bool {
        self.cell.get().is_some()
    }
}

impl<T: ?Sized> fmt::Debug for InstanceSlot<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstanceSlot")
            .field("policy", &self.policy)
            .field("materialized", &self.is_materialized())
            .finish()
    }
}
