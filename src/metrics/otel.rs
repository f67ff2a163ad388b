//! OTel-native mirrors of the in-process invocation metrics.
//!
//! Instruments are lazily initialized against the global meter provider
//! and feature-gated behind `otel`.
//!
//! Naming follows OTel semantic conventions (dot-separated).

use std::sync::LazyLock;

use opentelemetry::metrics::{Counter, Histogram, Meter};
use opentelemetry::{global, KeyValue};

static METER: LazyLock<Meter> = LazyLock::new(|| global::meter("proxybuilder"));

/// Total proxied invocations that completed successfully.
pub static INVOCATION_TOTAL: LazyLock<Counter<u64>> = LazyLock::new(|| {
    METER
        .u64_counter("proxybuilder.invocation.total")
        .with_description("Total proxied invocations")
        .build()
});

/// Duration of the dispatched call, excluding rules and hooks.
pub static INVOCATION_DURATION: LazyLock<Histogram<f64>> = LazyLock::new(|| {
    METER
        .f64_histogram("proxybuilder.invocation.duration")
        .with_description("Proxied invocation duration")
        .with_unit("s")
        .build()
});

/// Create an operation label.
pub fn operation_attr(operation: &str) -> KeyValue {
    KeyValue::new("operation", operation.to_string())
}

pub(crate) fn record(operation: &str, duration_nanos: u64) {
    let attrs = [operation_attr(operation)];
    INVOCATION_TOTAL.add(1, &attrs);
    INVOCATION_DURATION.record(duration_nanos as f64 / 1e9, &attrs);
}
