//! In-process invocation metrics.
//!
//! A [`MetricsRegistry`] keeps, per operation name, an invocation count and
//! a duration distribution. The capability name is not part of the key. Proxies built with
//! [`add_metrics`](crate::ProxyBuilder::add_metrics) write to the
//! process-wide registry returned by [`MetricsRegistry::global`]; tests and
//! embedders can inject their own with
//! [`add_metrics_to`](crate::ProxyBuilder::add_metrics_to).
//!
//! Reporting is left to external tooling: take a [`MetricsSnapshot`] and
//! print, log or export it.
//!
//! With the `otel` feature enabled every recorded invocation is mirrored
//! into OpenTelemetry instruments (see [`otel`]).

#[cfg(feature = "otel")]
pub mod otel;

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, LazyLock};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Number of log2 duration buckets. Bucket 0 holds zero-length samples,
/// bucket `i` holds samples in `[2^(i-1), 2^i)` nanoseconds.
const BUCKETS: usize = 65;

static GLOBAL: LazyLock<Arc<MetricsRegistry>> = LazyLock::new(|| {
    debug!("Initializing process-wide metrics registry");
    Arc::new(MetricsRegistry::new())
});

/// Counters and duration distribution for one logical operation.
#[derive(Debug)]
pub struct OperationMetrics {
    count: AtomicU64,
    total_nanos: AtomicU64,
    min_nanos: AtomicU64,
    max_nanos: AtomicU64,
    buckets: [AtomicU64; BUCKETS],
}

impl OperationMetrics {
    fn new() -> Self {
        Self {
            count: AtomicU64::new(0),
            total_nanos: AtomicU64::new(0),
            min_nanos: AtomicU64::new(u64::MAX),
            max_nanos: AtomicU64::new(0),
            buckets: std::array::from_fn(|_| AtomicU64::new(0)),
        }
    }

    fn record(&self, duration_nanos: u64) {
        self.count.fetch_add(1, Ordering::Relaxed);
        self.total_nanos
            .fetch_add(duration_nanos, Ordering::Relaxed);
        self.min_nanos.fetch_min(duration_nanos, Ordering::Relaxed);
        self.max_nanos.fetch_max(duration_nanos, Ordering::Relaxed);
        self.buckets[bucket_index(duration_nanos)].fetch_add(1, Ordering::Relaxed);
    }

    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    /// Get a snapshot of current values.
    pub fn snapshot(&self) -> OperationSnapshot {
        let count = self.count.load(Ordering::Relaxed);
        let total_nanos = self.total_nanos.load(Ordering::Relaxed);
        let max_nanos = self.max_nanos.load(Ordering::Relaxed);
        let min_nanos = match self.min_nanos.load(Ordering::Relaxed) {
            u64::MAX if count == 0 => 0,
            min => min,
        };
        let buckets: Vec<u64> = self
            .buckets
            .iter()
            .map(|b| b.load(Ordering::Relaxed))
            .collect();

        OperationSnapshot {
            count,
            total_nanos,
            min_nanos,
            max_nanos,
            mean_nanos: if count == 0 { 0 } else { total_nanos / count },
            p50_nanos: percentile(&buckets, count, max_nanos, 0.50),
            p99_nanos: percentile(&buckets, count, max_nanos, 0.99),
        }
    }

    fn reset(&self) {
        self.count.store(0, Ordering::Relaxed);
        self.total_nanos.store(0, Ordering::Relaxed);
        self.min_nanos.store(u64::MAX, Ordering::Relaxed);
        self.max_nanos.store(0, Ordering::Relaxed);
        for bucket in &self.buckets {
            bucket.store(0, Ordering::Relaxed);
        }
    }
}

fn bucket_index(nanos: u64) -> usize {
    (u64::BITS - nanos.leading_zeros()) as usize
}

/// Upper bound of the bucket containing the `q`-quantile, capped at the observed max.
fn percentile(buckets: &[u64], count: u64, max_nanos: u64, q: f64) -> u64 {
    if count == 0 {
        return 0;
    }
    let rank = ((count as f64) * q).ceil().max(1.0) as u64;
    let mut seen = 0;
    for (index, &n) in buckets.iter().enumerate() {
        seen += n;
        if seen >= rank {
            let upper = match index {
                0 => 0,
                64 => u64::MAX,
                i => (1u64 << i) - 1,
            };
            return upper.min(max_nanos);
        }
    }
    max_nanos
}

/// Point-in-time view of one operation's metrics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationSnapshot {
    pub count: u64,
    pub total_nanos: u64,
    pub min_nanos: u64,
    pub max_nanos: u64,
    pub mean_nanos: u64,
    /// Bucketed estimate, accurate to a power of two.
    pub p50_nanos: u64,
    /// Bucketed estimate, accurate to a power of two.
    pub p99_nanos: u64,
}

/// Point-in-time view of a whole registry, ordered by operation name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub operations: BTreeMap<String, OperationSnapshot>,
}

impl MetricsSnapshot {
    pub fn get(&self, operation: &str) -> Option<&OperationSnapshot> {
        self.operations.get(operation)
    }
}

/// Registry of per-operation invocation metrics.
///
/// Entries are keyed by the bare operation name, without the capability
/// name. Overloads share one entry, and so do two capabilities that both
/// declare `doWork` while recording into the same registry. Give such
/// proxies separate registries with
/// [`add_metrics_to`](crate::ProxyBuilder::add_metrics_to) to keep them apart.
///
/// Safe for concurrent recording: entries are created under a write lock
/// once, then updated with atomics under a shared read lock.
#[derive(Debug, Default)]
pub struct MetricsRegistry {
    operations: RwLock<HashMap<String, Arc<OperationMetrics>>>,
}

impl MetricsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide registry, created on first access and never torn down.
    pub fn global() -> Arc<MetricsRegistry> {
        Arc::clone(&GLOBAL)
    }

    /// Record one invocation of `operation` that took `duration_nanos`.
    pub fn record_invocation(&self, operation: &str, duration_nanos: u64) {
        self.entry(operation).record(duration_nanos);

        #[cfg(feature = "otel")]
        otel::record(operation, duration_nanos);
    }

    fn entry(&self, operation: &str) -> Arc<OperationMetrics> {
        if let Some(metrics) = self.operations.read().get(operation) {
            return Arc::clone(metrics);
        }
        let mut operations = self.operations.write();
        Arc::clone(
            operations
                .entry(operation.to_string())
                .or_insert_with(|| Arc::new(OperationMetrics::new())),
        )
    }

    /// Invocation count for `operation`; zero if never recorded.
    pub fn invocation_count(&self, operation: &str) -> u64 {
        self.operations
            .read()
            .get(operation)
            .map_or(0, |metrics| metrics.count())
    }

    pub fn operation(&self, operation: &str) -> Option<OperationSnapshot> {
        self.operations
            .read()
            .get(operation)
            .map(|metrics| metrics.snapshot())
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let operations = self
            .operations
            .read()
            .iter()
            .map(|(name, metrics)| (name.clone(), metrics.snapshot()))
            .collect();
        MetricsSnapshot { operations }
    }

    /// Export a snapshot as JSON for external reporters.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.snapshot())
    }

    /// Zero every entry, keeping the registered operation names.
    pub fn reset(&self) {
        for metrics in self.operations.read().values() {
            metrics.reset();
        }
    }
}
