//! Aspect-oriented advice for cross-cutting concerns.
//!
//! This module provides the pieces a proxy weaves around every call
//! (authorization gates, pre/post observers) without touching the
//! implementation being proxied.
//!
//! # Architecture
//!
//! Advice is attached at proxy composition time, not in implementations:
//!
//! ```ignore
//! // Core implementation - pure business logic
//! let factory = || Arc::new(ServiceImpl) as Arc<dyn Service>;
//!
//! // Attach advice
//! let proxy = create_builder(descriptor, CreationStrategy::SomeDuplicates, factory)
//!     .add_security_rule(|| session.is_admin())
//!     .add_pre_action(|_, op, _| { audit(op.name()); Ok(()) })
//!     .build()?;
//!
//! // Use as normal - advice is transparent
//! proxy.do_work("x")?;
//! ```
//!
//! # Available Advice
//!
//! - [`SecurityRule`] - Boolean gate evaluated before dispatch
//! - [`PreAction`] / [`PostAction`] - Observers run before/after the real call

mod action;
mod security;

pub use action::{ActionChain, PostAction, PostActionPolicy, PreAction};
pub(crate) use action::FnAction;
pub use security::{SecurityRule, SecurityRules};
