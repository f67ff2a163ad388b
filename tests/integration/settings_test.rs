//! Builders configured from loaded settings.

use std::io::Write;
use std::sync::Arc;

use serial_test::serial;

use proxybuilder::test_utils::{overloaded_service_descriptor, CountingFactory, EchoService, Service};
use proxybuilder::{
    ConfigurationError, CreationStrategy, InstancePolicy, MetricsRegistry, ProxyBuilder,
    ProxySettings,
};

#[test]
fn test_no_duplicates_from_settings_rejects_overloads() {
    let settings = ProxySettings::from_yaml_str("creation_strategy: no_duplicates").unwrap();
    let err = ProxyBuilder::<dyn Service>::for_instance(
        overloaded_service_descriptor(),
        Arc::new(EchoService::new()),
    )
    .with_settings(&settings)
    .build()
    .unwrap_err();

    assert!(matches!(
        err,
        ConfigurationError::DuplicateOperation {
            strategy: CreationStrategy::NoDuplicates,
            ..
        }
    ));
}

#[test]
#[serial]
fn test_settings_file_drives_builder() {
    let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
    writeln!(file, "metrics: true\ninstance_policy: per_call").unwrap();
    let settings = ProxySettings::load(file.path().to_str()).unwrap();

    MetricsRegistry::global().reset();
    let factory = CountingFactory::new();
    let proxy = ProxyBuilder::<dyn Service>::new(overloaded_service_descriptor())
        .with_factory(factory.clone())
        .with_settings(&settings)
        .build()
        .unwrap();

    proxy.do_work("a").unwrap();
    proxy.do_work_with("a", "b").unwrap();

    assert_eq!(proxy.configuration().instance_policy(), InstancePolicy::PerCall);
    assert!(proxy.configuration().metrics_enabled());
    assert_eq!(factory.created(), 2);
    assert_eq!(MetricsRegistry::global().invocation_count("doWork"), 2);
}

#[test]
fn test_partial_settings_keep_strategy_from_code() {
    let settings = ProxySettings::from_yaml_str("post_action_policy: always").unwrap();
    let result = ProxyBuilder::<dyn Service>::for_instance(
        overloaded_service_descriptor(),
        Arc::new(EchoService::new()),
    )
    .creation_strategy(CreationStrategy::NoDuplicates)
    .with_settings(&settings)
    .build();

    assert!(matches!(
        result,
        Err(ConfigurationError::DuplicateOperation { .. })
    ));
}
