//! Error types for proxy construction and invocation.

use crate::dispatch::CreationStrategy;
use crate::value::ValueError;

/// Boxed error produced by caller-supplied code: hooks and target operations.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result type for proxy invocations.
pub type Result<T> = std::result::Result<T, InvocationError>;

/// Errors raised by [`ProxyBuilder::build`](crate::ProxyBuilder::build).
///
/// No proxy is produced when building fails.
#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    #[error("capability `{0}` declares no operations")]
    EmptyCapability(String),

    #[error("no service factory configured for capability `{0}`")]
    MissingFactory(String),

    #[error("capability `{capability}` overloads `{operation}`, which {strategy:?} does not permit")]
    DuplicateOperation {
        capability: String,
        operation: String,
        strategy: CreationStrategy,
    },

    #[error("capability `{capability}` declares `{signature}` more than once")]
    DuplicateSignature {
        capability: String,
        signature: String,
    },
}

/// Errors surfaced to the caller of a proxied operation.
///
/// Hook and target failures keep the caller's original error as their
/// source. Use [`InvocationError::into_source`] to get it back unchanged.
#[derive(Debug, thiserror::Error)]
pub enum InvocationError {
    /// A security rule denied the call. `rule` is the zero-based registration position.
    #[error("security rule #{rule} denied `{operation}`")]
    Unauthorized { rule: usize, operation: String },

    #[error("capability `{capability}` has no operation named `{operation}`")]
    UnknownOperation {
        capability: String,
        operation: String,
    },

    #[error("no declaration of `{operation}` accepts ({arguments})")]
    NoMatchingOperation {
        operation: String,
        arguments: String,
    },

    #[error("call `{operation}({arguments})` is ambiguous between {candidates:?}")]
    AmbiguousOperation {
        operation: String,
        arguments: String,
        candidates: Vec<String>,
    },

    #[error("pre-action #{index} failed on `{operation}`: {source}")]
    PreAction {
        index: usize,
        operation: String,
        #[source]
        source: BoxError,
    },

    #[error("post-action #{index} failed on `{operation}`: {source}")]
    PostAction {
        index: usize,
        operation: String,
        #[source]
        source: BoxError,
    },

    #[error("`{operation}` failed: {source}")]
    Target {
        operation: String,
        #[source]
        source: BoxError,
    },

    #[error("`{operation}` returned an unexpected value: {source}")]
    InvalidReturn {
        operation: String,
        #[source]
        source: ValueError,
    },
}

impl InvocationError {
    /// Returns the caller's original error for hook and target failures,
    /// or boxes this error otherwise.
    pub fn into_source(self) -> BoxError {
        match self {
            InvocationError::PreAction { source, .. }
            | InvocationError::PostAction { source, .. }
            | InvocationError::Target { source, .. } => source,
            other => Box::new(other),
        }
    }

    /// Returns true if a security rule denied the call.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, InvocationError::Unauthorized { .. })
    }

    /// Returns true if the operation could not be resolved to a single declaration.
    pub fn is_resolution_error(&self) -> bool {
        matches!(
            self,
            InvocationError::UnknownOperation { .. }
                | InvocationError::NoMatchingOperation { .. }
                | InvocationError::AmbiguousOperation { .. }
        )
    }

    /// Returns true if a pre- or post-action failed.
    pub fn is_hook_failure(&self) -> bool {
        matches!(
            self,
            InvocationError::PreAction { .. } | InvocationError::PostAction { .. }
        )
    }

    /// Returns true if the underlying implementation failed.
    pub fn is_target_failure(&self) -> bool {
        matches!(self, InvocationError::Target { .. })
    }

    /// Zero-based position of the denying rule, if this is an authorization failure.
    pub fn denied_by(&self) -> Option<usize> {
        match self {
            InvocationError::Unauthorized { rule, .. } => Some(*rule),
            _ => None,
        }
    }
}
