//! ProxyBuilder - interception pipelines for arbitrary services.
//!
//! Wrap an implementation of a service interface behind a proxy that runs
//! every call through security rules, pre-actions, the real call,
//! post-actions and invocation metrics. The interface is described once with
//! a [`CapabilityDescriptor`]; the proxy resolves calls against it, including
//! overloaded operations, according to a [`CreationStrategy`].
//!
//! ```
//! use std::sync::Arc;
//! use proxybuilder::{CapabilityDescriptor, CreationStrategy, ProxyBuilder, Value, ValueKind};
//!
//! pub trait Greeter: Send + Sync {
//!     fn greet(&self, name: &str) -> String;
//! }
//!
//! struct English;
//!
//! impl Greeter for English {
//!     fn greet(&self, name: &str) -> String {
//!         format!("hello {}", name)
//!     }
//! }
//!
//! let descriptor = CapabilityDescriptor::<dyn Greeter>::new("Greeter").operation(
//!     "greet",
//!     [ValueKind::Str],
//!     ValueKind::Str,
//!     |g, args| Ok(Value::from(g.greet(args[0].as_str()?))),
//! );
//!
//! let proxy = ProxyBuilder::for_instance(descriptor, Arc::new(English) as Arc<dyn Greeter>)
//!     .creation_strategy(CreationStrategy::NoDuplicates)
//!     .add_security_rule(|| true)
//!     .build()
//!     .unwrap();
//!
//! let greeting: String = proxy.call("greet", &["world".into()]).unwrap();
//! assert_eq!(greeting, "hello world");
//! ```

pub mod advice;
pub mod config;
pub mod descriptor;
pub mod dispatch;
pub mod error;
pub mod metrics;
pub mod proxy;
pub mod utils;
pub mod value;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use advice::{PostAction, PostActionPolicy, PreAction, SecurityRule};
pub use config::{ProxySettings, SettingsError};
pub use descriptor::{Capability, CapabilityDescriptor, OperationSignature};
pub use dispatch::CreationStrategy;
pub use error::{BoxError, ConfigurationError, InvocationError};
pub use metrics::{MetricsRegistry, MetricsSnapshot, OperationSnapshot};
pub use proxy::{
    create_builder, InstancePolicy, Proxy, ProxyBuilder, ProxyConfiguration, ServiceFactory,
};
pub use utils::bootstrap::init_tracing;
pub use value::{Value, ValueError, ValueKind};
