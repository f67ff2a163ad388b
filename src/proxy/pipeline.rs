//! The invocation pipeline run on every proxied call.
//!
//! Stages, in order:
//!
//! 1. security check - rules in registration order, first denial aborts
//! 2. resolution - pick the declaration matching name and arguments
//! 3. pre-actions - observers, first failure aborts
//! 4. dispatch - the real call, timed
//! 5. post-actions - observers, first failure aborts
//! 6. metrics - one count and one duration sample, if enabled
//!
//! The underlying instance is obtained between authorization and the
//! pre-actions, so denied calls never create one.

use std::time::Instant;

use tracing::{trace, warn};

use crate::advice::PostActionPolicy;
use crate::error::{InvocationError, Result};
use crate::value::Value;

use super::builder::ProxyConfiguration;
use super::instance::InstanceSlot;

pub(crate) fn run<T>(
    config: &ProxyConfiguration<T>,
    instance: &InstanceSlot<T>,
    operation: &str,
    args: &[Value],
) -> Result<Value>
where
    T: ?Sized + Send + Sync + 'static,
{
    let capability = config.descriptor().name();

    if let Err(rule) = config.security_rules().check() {
        warn!(
            capability = %capability,
            operation = %operation,
            rule,
            "Security rule denied invocation"
        );
        return Err(InvocationError::Unauthorized {
            rule,
            operation: operation.to_string(),
        });
    }

    let index = config.table().resolve(operation, args)?;
    let declared = &config.descriptor().operations()[index];
    let signature = declared.signature();
    trace!(capability = %capability, signature = %signature, "Resolved operation");

    let target = instance.get(config.factory(), capability);

    config.actions().run_pre(&*target, signature, args)?;

    let start = Instant::now();
    let outcome = declared.invoke(&*target, args);
    let elapsed = start.elapsed();

    let value = match outcome {
        Ok(value) => value,
        Err(source) => {
            if config.post_action_policy() == PostActionPolicy::Always {
                if let Err(e) = config.actions().run_post(&*target, signature, args) {
                    warn!(
                        capability = %capability,
                        operation = %operation,
                        error = %e,
                        "Post-action failed after target failure"
                    );
                }
            }
            return Err(InvocationError::Target {
                operation: operation.to_string(),
                source,
            });
        }
    };

    config.actions().run_post(&*target, signature, args)?;

    if let Some(metrics) = config.metrics() {
        let nanos = u64::try_from(elapsed.as_nanos()).unwrap_or(u64::MAX);
        metrics.record_invocation(signature.name(), nanos);
    }

    Ok(value)
}
