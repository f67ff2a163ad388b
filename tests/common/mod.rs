//! Shared helpers for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use proxybuilder::test_utils::{service_descriptor, EchoService, Service};
use proxybuilder::{Proxy, ProxyBuilder};

pub use proxybuilder::test_utils::CallLog;

/// Builder over a single shared [`EchoService`].
pub fn echo_builder(echo: Arc<EchoService>) -> ProxyBuilder<dyn Service> {
    ProxyBuilder::<dyn Service>::for_instance(service_descriptor(), echo)
}

/// Proxy with no rules, hooks or metrics over a fresh [`EchoService`].
pub fn plain_echo_proxy() -> Proxy<dyn Service> {
    echo_builder(Arc::new(EchoService::new()))
        .build()
        .expect("plain echo proxy should build")
}

/// Builder wired to `log`: one logging rule per entry of `decisions`, then
/// `pre` pre-actions and `post` post-actions, each logging its own label.
pub fn logged_builder(
    echo: Arc<EchoService>,
    log: &CallLog,
    decisions: &[bool],
    pre: usize,
    post: usize,
) -> ProxyBuilder<dyn Service> {
    let mut builder = echo_builder(echo);
    for (i, allow) in decisions.iter().enumerate() {
        builder = builder.add_security_rule(log.rule(&format!("rule-{}", i), *allow));
    }
    for i in 0..pre {
        builder = builder.add_pre_action(log.hook::<dyn Service>(&format!("pre-{}", i)));
    }
    for i in 0..post {
        builder = builder.add_post_action(log.hook::<dyn Service>(&format!("post-{}", i)));
    }
    builder
}
