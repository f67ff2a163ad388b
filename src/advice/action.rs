use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::descriptor::OperationSignature;
use crate::error::{BoxError, InvocationError};
use crate::value::Value;

/// Observer run before the real call.
///
/// Receives the underlying implementation, the resolved operation and the
/// call's arguments. Returning an error aborts the call; the error reaches
/// the caller as the source of [`InvocationError::PreAction`].
pub trait PreAction<T: ?Sized>: Send + Sync {
    fn execute(
        &self,
        original: &T,
        operation: &OperationSignature,
        args: &[Value],
    ) -> Result<(), BoxError>;
}

/// Observer run after the real call.
///
/// Same contract as [`PreAction`]; errors surface as
/// [`InvocationError::PostAction`] and skip the remaining post-actions.
pub trait PostAction<T: ?Sized>: Send + Sync {
    fn execute(
        &self,
        original: &T,
        operation: &OperationSignature,
        args: &[Value],
    ) -> Result<(), BoxError>;
}

/// Whether post-actions run when the underlying call fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostActionPolicy {
    /// Post-actions run only after a successful call.
    #[default]
    OnSuccess,
    /// Post-actions also run after a failed call. Their own errors are then
    /// logged and the call's original failure is returned.
    Always,
}

/// Adapter turning a closure into a pre- or post-action.
pub(crate) struct FnAction<F>(pub(crate) F);

impl<T, F> PreAction<T> for FnAction<F>
where
    T: ?Sized,
    F: Fn(&T, &OperationSignature, &[Value]) -> Result<(), BoxError> + Send + Sync,
{
    fn execute(
        &self,
        original: &T,
        operation: &OperationSignature,
        args: &[Value],
    ) -> Result<(), BoxError> {
        (self.0)(original, operation, args)
    }
}

impl<T, F> PostAction<T> for FnAction<F>
where
    T: ?Sized,
    F: Fn(&T, &OperationSignature, &[Value]) -> Result<(), BoxError> + Send + Sync,
{
    fn execute(
        &self,
        original: &T,
        operation: &OperationSignature,
        args: &[Value],
    ) -> Result<(), BoxError> {
        (self.0)(original, operation, args)
    }
}

/// Ordered pre- and post-action sequences.
pub struct ActionChain<T: ?Sized> {
    pre: Vec<Arc<dyn PreAction<T>>>,
    post: Vec<Arc<dyn PostAction<T>>>,
}

impl<T: ?Sized> ActionChain<T> {
    pub fn new() -> Self {
        Self {
            pre: Vec::new(),
            post: Vec::new(),
        }
    }

    pub fn push_pre(&mut self, action: Arc<dyn PreAction<T>>) {
        self.pre.push(action);
    }

    pub fn push_post(&mut self, action: Arc<dyn PostAction<T>>) {
        self.post.push(action);
    }

    /// Run pre-actions in registration order, stopping at the first failure.
    pub fn run_pre(
        &self,
        original: &T,
        operation: &OperationSignature,
        args: &[Value],
    ) -> Result<(), InvocationError> {
        for (index, action) in self.pre.iter().enumerate() {
            action
                .execute(original, operation, args)
                .map_err(|source| InvocationError::PreAction {
                    index,
                    operation: operation.name().to_string(),
                    source,
                })?;
        }
        Ok(())
    }

    /// Run post-actions in registration order, stopping at the first failure.
    pub fn run_post(
        &self,
        original: &T,
        operation: &OperationSignature,
        args: &[Value],
    ) -> Result<(), InvocationError> {
        for (index, action) in self.post.iter().enumerate() {
            action
                .execute(original, operation, args)
                .map_err(|source| InvocationError::PostAction {
                    index,
                    operation: operation.name().to_string(),
                    source,
                })?;
        }
        Ok(())
    }

    pub fn pre_len(&self) -> usize {
        self.pre.len()
    }

    pub fn post_len(&self) -> usize {
        self.post.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pre.is_empty() && self.post.is_empty()
    }
}

impl<T: ?Sized> Default for ActionChain<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized> Clone for ActionChain<T> {
    fn clone(&self) -> Self {
        Self {
            pre: self.pre.clone(),
            post: self.post.clone(),
        }
    }
}

impl<T: ?Sized> fmt::Debug for ActionChain<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionChain")
            .field("pre", &self.pre.len())
            .field("post", &self.post.len())
            .finish()
    }
}
