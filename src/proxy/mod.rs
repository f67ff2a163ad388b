//! Proxies: capability-shaped handles that run every call through the
//! invocation pipeline.
//!
//! A [`Proxy`] exposes the uniform call contract ([`Proxy::invoke`],
//! [`Proxy::call`]). To make it look like the capability itself, implement
//! the capability trait for the proxy and forward each method:
//!
//! ```ignore
//! impl Service for Proxy<dyn Service> {
//!     fn do_work(&self, txt: &str) -> Result<String, BoxError> {
//!         self.call("doWork", &[txt.into()])
//!             .map_err(InvocationError::into_source)
//!     }
//! }
//! ```

mod builder;
mod instance;
mod pipeline;

use std::fmt;
use std::sync::Arc;

pub use builder::{create_builder, ProxyBuilder, ProxyConfiguration};
pub use instance::{InstancePolicy, ServiceFactory};

use crate::descriptor::CapabilityDescriptor;
use crate::error::{InvocationError, Result};
use crate::value::{Value, ValueError};

use instance::InstanceSlot;

/// Built proxy for capability `T`.
///
/// Cloning is cheap and shares the frozen configuration and the lazily
/// created instance. Separate [`ProxyBuilder::build`] calls never share an
/// instance.
pub struct Proxy<T: ?Sized> {
    config: Arc<ProxyConfiguration<T>>,
    instance: Arc<InstanceSlot<T>>,
}

impl<T: ?Sized + Send + Sync + 'static> Proxy<T> {
    pub(crate) fn new(config: ProxyConfiguration<T>) -> Self {
        let instance = InstanceSlot::new(config.instance_policy());
        Self {
            config: Arc::new(config),
            instance: Arc::new(instance),
        }
    }

    /// Run `operation` through the pipeline with the given arguments.
    pub fn invoke(&self, operation: &str, args: &[Value]) -> Result<Value> {
        pipeline::run(&self.config, &self.instance, operation, args)
    }

    /// Like [`invoke`](Proxy::invoke), converting the result into `R`.
    pub fn call<R>(&self, operation: &str, args: &[Value]) -> Result<R>
    where
        R: TryFrom<Value, Error = ValueError>,
    {
        let value = self.invoke(operation, args)?;
        R::try_from(value).map_err(|source| InvocationError::InvalidReturn {
            operation: operation.to_string(),
            source,
        })
    }

    pub fn descriptor(&self) -> &CapabilityDescriptor<T> {
        self.config.descriptor()
    }

    pub fn configuration(&self) -> &ProxyConfiguration<T> {
        &self.config
    }

    /// Whether the shared underlying instance has been created yet.
    pub fn is_materialized(&self) -> bool {
        self.instance.is_materialized()
    }
}

impl<T: ?Sized> Clone for Proxy<T> {
    fn clone(&self) -> Self {
        Self {
            config: Arc::clone(&self.config),
            instance: Arc::clone(&self.instance),
        }
    }
}

impl<T: ?Sized> fmt::Debug for Proxy<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Proxy")
            .field("config", &self.config)
            .field("instance", &self.instance)
            .finish()
    }
}
