//! Test fixtures: a sample capability, implementations to proxy, and
//! recorders for rules and hooks.
//!
//! Available to unit tests and, behind the `test-utils` feature, to
//! integration tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use crate::descriptor::{Capability, CapabilityDescriptor, OperationSignature};
use crate::error::{BoxError, InvocationError};
use crate::proxy::{Proxy, ServiceFactory};
use crate::value::{Value, ValueKind};

/// Sample capability used throughout the tests.
pub trait Service: Send + Sync {
    fn do_work(&self, txt: &str) -> Result<String, BoxError>;

    fn do_work_with(&self, txt: &str, suffix: &str) -> Result<String, BoxError>;
}

/// Descriptor declaring the single-argument `doWork(Str) -> Str`.
pub fn service_descriptor() -> CapabilityDescriptor<dyn Service> {
    CapabilityDescriptor::<dyn Service>::new("Service").operation(
        "doWork",
        [ValueKind::Str],
        ValueKind::Str,
        |svc, args| Ok(svc.do_work(args[0].as_str()?)?.into()),
    )
}

/// Descriptor declaring `doWork(Str)` and the overload `doWork(Str, Str)`.
pub fn overloaded_service_descriptor() -> CapabilityDescriptor<dyn Service> {
    service_descriptor().operation(
        "doWork",
        [ValueKind::Str, ValueKind::Str],
        ValueKind::Str,
        |svc, args| Ok(svc.do_work_with(args[0].as_str()?, args[1].as_str()?)?.into()),
    )
}

impl Capability for dyn Service {
    fn descriptor() -> CapabilityDescriptor<Self> {
        overloaded_service_descriptor()
    }
}

impl Service for Proxy<dyn Service> {
    fn do_work(&self, txt: &str) -> Result<String, BoxError> {
        self.call("doWork", &[txt.into()])
            .map_err(InvocationError::into_source)
    }

    fn do_work_with(&self, txt: &str, suffix: &str) -> Result<String, BoxError> {
        self.call("doWork", &[txt.into(), suffix.into()])
            .map_err(InvocationError::into_source)
    }
}

/// Returns its input and counts how often it was reached.
#[derive(Debug, Default)]
pub struct EchoService {
    calls: AtomicUsize,
}

impl EchoService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Service for EchoService {
    fn do_work(&self, txt: &str) -> Result<String, BoxError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(txt.to_string())
    }

    fn do_work_with(&self, txt: &str, suffix: &str) -> Result<String, BoxError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(format!("{} {}", txt, suffix))
    }
}

/// Error raised by [`FailingService`].
#[derive(Debug, thiserror::Error)]
#[error("service failure: {0}")]
pub struct ServiceFailure(pub String);

/// Fails every call with [`ServiceFailure`].
#[derive(Debug, Default)]
pub struct FailingService {
    calls: AtomicUsize,
}

impl FailingService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Service for FailingService {
    fn do_work(&self, txt: &str) -> Result<String, BoxError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(ServiceFailure(txt.to_string()).into())
    }

    fn do_work_with(&self, txt: &str, _suffix: &str) -> Result<String, BoxError> {
        self.do_work(txt)
    }
}

/// Factory creating a fresh [`EchoService`] per request and counting requests.
///
/// Clones share the count.
#[derive(Debug, Clone, Default)]
pub struct CountingFactory {
    created: Arc<AtomicUsize>,
    delay: Option<Duration>,
}

impl CountingFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sleep for `delay` inside every creation, widening race windows.
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            created: Arc::default(),
            delay: Some(delay),
        }
    }

    pub fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }
}

impl ServiceFactory<dyn Service> for CountingFactory {
    fn create_instance(&self) -> Arc<dyn Service> {
        self.created.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }
        Arc::new(EchoService::new())
    }
}

/// Shared, ordered record of which rules and hooks ran.
#[derive(Debug, Clone, Default)]
pub struct CallLog {
    entries: Arc<Mutex<Vec<String>>>,
}

impl CallLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, entry: impl Into<String>) {
        self.entries.lock().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Security rule that logs `label` and answers `allow`.
    pub fn rule(&self, label: &str, allow: bool) -> impl Fn() -> bool + Send + Sync + 'static {
        let log = self.clone();
        let label = label.to_string();
        move || {
            log.push(label.clone());
            allow
        }
    }

    /// Pre- or post-action that logs `label`.
    pub fn hook<T: ?Sized + 'static>(
        &self,
        label: &str,
    ) -> impl Fn(&T, &OperationSignature, &[Value]) -> Result<(), BoxError> + Send + Sync + 'static
    {
        let log = self.clone();
        let label = label.to_string();
        move |_: &T, _: &OperationSignature, _: &[Value]| -> Result<(), BoxError> {
            log.push(label.clone());
            Ok(())
        }
    }

    /// Pre- or post-action that logs `label`, then fails.
    pub fn failing_hook<T: ?Sized + 'static>(
        &self,
        label: &str,
    ) -> impl Fn(&T, &OperationSignature, &[Value]) -> Result<(), BoxError> + Send + Sync + 'static
    {
        let log = self.clone();
        let label = label.to_string();
        move |_: &T, _: &OperationSignature, _: &[Value]| -> Result<(), BoxError> {
            log.push(label.clone());
            Err(ServiceFailure(label.clone()).into())
        }
    }
}
