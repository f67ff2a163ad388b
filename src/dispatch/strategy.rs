use serde::{Deserialize, Serialize};

/// Policy for capabilities that declare several operations with the same name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CreationStrategy {
    /// Overloads are rejected when the proxy is built.
    NoDuplicates,
    /// Overloads are allowed and resolved per call, first by arity, then by
    /// runtime argument kinds.
    #[default]
    SomeDuplicates,
}

impl CreationStrategy {
    /// Whether a capability may declare the same operation name more than once.
    pub fn allows_overloads(&self) -> bool {
        matches!(self, CreationStrategy::SomeDuplicates)
    }
}
