//! Capability descriptors: the interface a proxy stands in for.
//!
//! A [`CapabilityDescriptor`] lists the operations of a service interface
//! (name, parameter kinds, return kind) and binds each one to a handler that
//! calls the matching method on the underlying implementation. The proxy
//! resolves calls against these declarations instead of reflecting on types
//! at runtime.
//!
//! # Example
//!
//! ```
//! use proxybuilder::descriptor::CapabilityDescriptor;
//! use proxybuilder::value::{Value, ValueKind};
//!
//! pub trait Service: Send + Sync {
//!     fn do_work(&self, txt: &str) -> String;
//! }
//!
//! let descriptor = CapabilityDescriptor::<dyn Service>::new("Service").operation(
//!     "doWork",
//!     [ValueKind::Str],
//!     ValueKind::Str,
//!     |svc, args| Ok(Value::from(svc.do_work(args[0].as_str()?))),
//! );
//! assert_eq!(descriptor.len(), 1);
//! assert_eq!(descriptor.operations()[0].signature().to_string(), "doWork(Str) -> Str");
//! ```

use std::fmt;
use std::sync::Arc;

use crate::error::BoxError;
use crate::value::{Value, ValueKind};

/// Handler binding a declared operation to a method on the implementation.
pub type Handler<T> = Arc<dyn Fn(&T, &[Value]) -> Result<Value, BoxError> + Send + Sync>;

/// Types that can describe themselves as a proxyable capability.
///
/// Usually implemented for a trait object, e.g. `impl Capability for dyn Service`.
pub trait Capability: Send + Sync + 'static {
    fn descriptor() -> CapabilityDescriptor<Self>;
}

/// Identity of a declared operation: name plus parameter and return shapes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OperationSignature {
    name: String,
    params: Vec<ValueKind>,
    returns: ValueKind,
}

impl OperationSignature {
    pub fn new(
        name: impl Into<String>,
        params: impl IntoIterator<Item = ValueKind>,
        returns: ValueKind,
    ) -> Self {
        Self {
            name: name.into(),
            params: params.into_iter().collect(),
            returns,
        }
    }

    /// Operation name; also the logical name metrics are recorded under.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn params(&self) -> &[ValueKind] {
        &self.params
    }

    pub fn returns(&self) -> ValueKind {
        self.returns
    }

    pub fn arity(&self) -> usize {
        self.params.len()
    }

    /// Check arity and per-position kind compatibility against runtime arguments.
    pub fn accepts(&self, args: &[Value]) -> bool {
        self.params.len() == args.len()
            && self
                .params
                .iter()
                .zip(args)
                .all(|(kind, value)| kind.accepts(value))
    }

    /// Name and parameter list without the return kind, e.g. `doWork(Str,Str)`.
    ///
    /// Two declarations with the same shape can never be told apart.
    pub fn shape(&self) -> String {
        let params: Vec<&str> = self.params.iter().map(ValueKind::as_str).collect();
        format!("{}({})", self.name, params.join(","))
    }
}

impl fmt::Display for OperationSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.shape(), self.returns)
    }
}

/// A declared operation and its dispatch handler.
pub struct Operation<T: ?Sized> {
    signature: OperationSignature,
    handler: Handler<T>,
}

impl<T: ?Sized> Operation<T> {
    pub fn signature(&self) -> &OperationSignature {
        &self.signature
    }

    /// Call the bound method on `target`.
    pub fn invoke(&self, target: &T, args: &[Value]) -> Result<Value, BoxError> {
        (self.handler)(target, args)
    }
}

impl<T: ?Sized> Clone for Operation<T> {
    fn clone(&self) -> Self {
        Self {
            signature: self.signature.clone(),
            handler: Arc::clone(&self.handler),
        }
    }
}

impl<T: ?Sized> fmt::Debug for Operation<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Operation")
            .field("signature", &self.signature)
            .finish_non_exhaustive()
    }
}

/// Description of a service interface and how to call each of its operations.
pub struct CapabilityDescriptor<T: ?Sized> {
    name: String,
    operations: Vec<Operation<T>>,
}

impl<T: ?Sized> CapabilityDescriptor<T> {
    /// Create an empty descriptor for the named capability.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            operations: Vec::new(),
        }
    }

    /// Declare an operation and bind it to a handler.
    ///
    /// The same name may be declared several times with different parameter
    /// kinds; whether that is allowed is decided by the proxy's
    /// [`CreationStrategy`](crate::dispatch::CreationStrategy).
    pub fn operation<F>(
        mut self,
        name: impl Into<String>,
        params: impl IntoIterator<Item = ValueKind>,
        returns: ValueKind,
        handler: F,
    ) -> Self
    where
        F: Fn(&T, &[Value]) -> Result<Value, BoxError> + Send + Sync + 'static,
    {
        self.operations.push(Operation {
            signature: OperationSignature::new(name, params, returns),
            handler: Arc::new(handler),
        });
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared operations in declaration order.
    pub fn operations(&self) -> &[Operation<T>] {
        &self.operations
    }

    pub fn signatures(&self) -> impl Iterator<Item = &OperationSignature> {
        self.operations.iter().map(Operation::signature)
    }

    /// Declarations sharing the given name.
    pub fn operations_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Operation<T>> {
        self.operations
            .iter()
            .filter(move |op| op.signature.name == name)
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}

impl<T: ?Sized> Clone for CapabilityDescriptor<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            operations: self.operations.clone(),
        }
    }
}

impl<T: ?Sized> fmt::Debug for CapabilityDescriptor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CapabilityDescriptor")
            .field("name", &self.name)
            .field("operations", &self.operations)
            .finish()
    }
}
