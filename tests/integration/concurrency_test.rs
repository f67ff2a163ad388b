//! Concurrent use of a single proxy.

use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

use proxybuilder::test_utils::{service_descriptor, CountingFactory, Service};
use proxybuilder::{InstancePolicy, MetricsRegistry, ProxyBuilder};

use crate::common::{echo_builder, CallLog};

const THREADS: usize = 16;

#[test]
fn test_concurrent_first_calls_create_one_instance() {
    let factory = CountingFactory::with_delay(Duration::from_millis(20));
    let proxy = ProxyBuilder::<dyn Service>::new(service_descriptor())
        .with_factory(factory.clone())
        .build()
        .unwrap();
    let barrier = Barrier::new(THREADS);

    thread::scope(|s| {
        for i in 0..THREADS {
            let proxy = &proxy;
            let barrier = &barrier;
            s.spawn(move || {
                barrier.wait();
                let result = proxy.do_work(&format!("call-{}", i)).unwrap();
                assert_eq!(result, format!("call-{}", i));
            });
        }
    });

    assert_eq!(factory.created(), 1);
    assert!(proxy.is_materialized());
}

#[test]
fn test_per_call_policy_creates_per_authorized_call() {
    let factory = CountingFactory::new();
    let builder = ProxyBuilder::<dyn Service>::new(service_descriptor())
        .with_factory(factory.clone())
        .instance_policy(InstancePolicy::PerCall);

    let proxy = builder.build().unwrap();
    for _ in 0..5 {
        proxy.do_work("x").unwrap();
    }
    assert_eq!(factory.created(), 5);
    assert!(!proxy.is_materialized());

    let denied = builder.add_security_rule(|| false).build().unwrap();
    assert!(denied.do_work("x").is_err());
    assert_eq!(factory.created(), 5);
}

#[test]
fn test_separate_builds_do_not_share_instance() {
    let factory = CountingFactory::new();
    let builder = ProxyBuilder::<dyn Service>::new(service_descriptor()).with_factory(factory.clone());

    let first = builder.build().unwrap();
    let second = builder.build().unwrap();
    first.do_work("a").unwrap();
    second.do_work("b").unwrap();
    first.clone().do_work("c").unwrap();

    assert_eq!(factory.created(), 2);
}

#[test]
fn test_concurrent_calls_are_all_counted() {
    const CALLS: usize = 50;
    let registry = Arc::new(MetricsRegistry::new());
    let log = CallLog::new();
    let proxy = echo_builder(Arc::default())
        .add_pre_action(log.hook::<dyn Service>("pre"))
        .add_metrics_to(Arc::clone(&registry))
        .build()
        .unwrap();

    thread::scope(|s| {
        for _ in 0..THREADS {
            let proxy = proxy.clone();
            s.spawn(move || {
                for _ in 0..CALLS {
                    proxy.do_work("x").unwrap();
                }
            });
        }
    });

    assert_eq!(registry.invocation_count("doWork"), (THREADS * CALLS) as u64);
    assert_eq!(log.len(), THREADS * CALLS);
}
