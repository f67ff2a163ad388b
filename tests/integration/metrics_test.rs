//! Metrics capture through proxies.

use std::sync::Arc;

use serial_test::serial;

use proxybuilder::test_utils::{
    overloaded_service_descriptor, service_descriptor, EchoService, FailingService, Service,
};
use proxybuilder::{CapabilityDescriptor, MetricsRegistry, ProxyBuilder, Value, ValueKind};

use crate::common::echo_builder;

#[test]
#[serial]
fn test_hundred_calls_counted_in_global_registry() {
    MetricsRegistry::global().reset();
    let proxy = echo_builder(Arc::new(EchoService::new()))
        .add_metrics()
        .build()
        .unwrap();

    for i in 0..100 {
        proxy.do_work(&i.to_string()).unwrap();
    }

    assert_eq!(MetricsRegistry::global().invocation_count("doWork"), 100);
}

#[test]
fn test_snapshot_describes_distribution() {
    let registry = Arc::new(MetricsRegistry::new());
    let proxy = echo_builder(Arc::new(EchoService::new()))
        .add_metrics_to(Arc::clone(&registry))
        .build()
        .unwrap();

    for _ in 0..20 {
        proxy.do_work("x").unwrap();
    }

    let snapshot = registry.snapshot();
    let op = snapshot.get("doWork").unwrap();
    assert_eq!(op.count, 20);
    assert!(op.min_nanos <= op.mean_nanos);
    assert!(op.mean_nanos <= op.max_nanos);
    assert!(op.p50_nanos <= op.p99_nanos);
    assert!(op.p99_nanos <= op.max_nanos);

    let json = registry.to_json().unwrap();
    assert!(json.contains("\"doWork\""));
}

#[test]
fn test_overloads_share_operation_name() {
    let registry = Arc::new(MetricsRegistry::new());
    let proxy = ProxyBuilder::<dyn Service>::for_instance(
        overloaded_service_descriptor(),
        Arc::new(EchoService::new()),
    )
    .add_metrics_to(Arc::clone(&registry))
    .build()
    .unwrap();

    proxy.do_work("a").unwrap();
    proxy.do_work_with("a", "b").unwrap();

    assert_eq!(registry.invocation_count("doWork"), 2);
    assert_eq!(registry.snapshot().operations.len(), 1);
}

#[test]
fn test_failed_calls_are_not_counted() {
    let registry = Arc::new(MetricsRegistry::new());
    let failing = Arc::new(FailingService::new());
    let proxy = ProxyBuilder::<dyn Service>::for_instance(service_descriptor(), failing.clone())
        .add_metrics_to(Arc::clone(&registry))
        .build()
        .unwrap();

    assert!(proxy.do_work("x").is_err());
    assert_eq!(failing.calls(), 1);
    assert_eq!(registry.invocation_count("doWork"), 0);
}

trait Shouter: Send + Sync {
    fn shout(&self, txt: &str) -> String;
}

struct Upper;

impl Shouter for Upper {
    fn shout(&self, txt: &str) -> String {
        txt.to_uppercase()
    }
}

fn shouter_descriptor() -> CapabilityDescriptor<dyn Shouter> {
    CapabilityDescriptor::<dyn Shouter>::new("Shouter").operation(
        "doWork",
        [ValueKind::Str],
        ValueKind::Str,
        |s, args| Ok(Value::from(s.shout(args[0].as_str()?))),
    )
}

#[test]
fn test_same_operation_name_shares_entry_across_capabilities() {
    let registry = Arc::new(MetricsRegistry::new());
    let service = echo_builder(Arc::new(EchoService::new()))
        .add_metrics_to(Arc::clone(&registry))
        .build()
        .unwrap();
    let shouter = ProxyBuilder::for_instance(shouter_descriptor(), Arc::new(Upper) as Arc<dyn Shouter>)
        .add_metrics_to(Arc::clone(&registry))
        .build()
        .unwrap();

    service.do_work("a").unwrap();
    let loud: String = shouter.call("doWork", &["a".into()]).unwrap();
    assert_eq!(loud, "A");

    assert_eq!(registry.invocation_count("doWork"), 2);
    assert_eq!(registry.snapshot().operations.len(), 1);
}

#[test]
fn test_separate_registries_keep_capabilities_apart() {
    let service_metrics = Arc::new(MetricsRegistry::new());
    let shouter_metrics = Arc::new(MetricsRegistry::new());
    let service = echo_builder(Arc::new(EchoService::new()))
        .add_metrics_to(Arc::clone(&service_metrics))
        .build()
        .unwrap();
    let shouter = ProxyBuilder::for_instance(shouter_descriptor(), Arc::new(Upper) as Arc<dyn Shouter>)
        .add_metrics_to(Arc::clone(&shouter_metrics))
        .build()
        .unwrap();

    service.do_work("a").unwrap();
    service.do_work("b").unwrap();
    let _: String = shouter.call("doWork", &["c".into()]).unwrap();

    assert_eq!(service_metrics.invocation_count("doWork"), 2);
    assert_eq!(shouter_metrics.invocation_count("doWork"), 1);
}
