use std::collections::{HashMap, HashSet};

use crate::descriptor::{CapabilityDescriptor, OperationSignature};
use crate::error::{ConfigurationError, InvocationError};
use crate::value::Value;

use super::CreationStrategy;

/// Name-keyed lookup from operation calls to declarations.
///
/// Indices returned by [`DispatchTable::resolve`] point into the
/// descriptor's [`operations`](CapabilityDescriptor::operations) slice the
/// table was compiled from.
#[derive(Debug, Clone)]
pub struct DispatchTable {
    capability: String,
    strategy: CreationStrategy,
    signatures: Vec<OperationSignature>,
    by_name: HashMap<String, Vec<usize>>,
}

impl DispatchTable {
    /// Compile a table, validating the declarations against the strategy.
    pub fn compile<T: ?Sized>(
        descriptor: &CapabilityDescriptor<T>,
        strategy: CreationStrategy,
    ) -> Result<Self, ConfigurationError> {
        if descriptor.is_empty() {
            return Err(ConfigurationError::EmptyCapability(
                descriptor.name().to_string(),
            ));
        }

        let mut by_name: HashMap<String, Vec<usize>> = HashMap::new();
        let mut shapes = HashSet::new();

        for (index, signature) in descriptor.signatures().enumerate() {
            if !shapes.insert(signature.shape()) {
                return Err(ConfigurationError::DuplicateSignature {
                    capability: descriptor.name().to_string(),
                    signature: signature.shape(),
                });
            }

            let slots = by_name.entry(signature.name().to_string()).or_default();
            if !slots.is_empty() && !strategy.allows_overloads() {
                return Err(ConfigurationError::DuplicateOperation {
                    capability: descriptor.name().to_string(),
                    operation: signature.name().to_string(),
                    strategy,
                });
            }
            slots.push(index);
        }

        Ok(Self {
            capability: descriptor.name().to_string(),
            strategy,
            signatures: descriptor.signatures().cloned().collect(),
            by_name,
        })
    }

    /// Select the single declaration matching `operation` and `args`.
    ///
    /// Candidates are narrowed by name, then arity, then argument kinds.
    /// Arguments are always kind-checked, even when arity alone is decisive.
    pub fn resolve(&self, operation: &str, args: &[Value]) -> Result<usize, InvocationError> {
        let candidates =
            self.by_name
                .get(operation)
                .ok_or_else(|| InvocationError::UnknownOperation {
                    capability: self.capability.clone(),
                    operation: operation.to_string(),
                })?;

        let matching: Vec<usize> = candidates
            .iter()
            .copied()
            .filter(|&index| self.signatures[index].arity() == args.len())
            .filter(|&index| self.signatures[index].accepts(args))
            .collect();

        match matching.as_slice() {
            [index] => Ok(*index),
            [] => Err(InvocationError::NoMatchingOperation {
                operation: operation.to_string(),
                arguments: describe_arguments(args),
            }),
            many => Err(InvocationError::AmbiguousOperation {
                operation: operation.to_string(),
                arguments: describe_arguments(args),
                candidates: many
                    .iter()
                    .map(|&index| self.signatures[index].shape())
                    .collect(),
            }),
        }
    }

    pub fn strategy(&self) -> CreationStrategy {
        self.strategy
    }

    /// Number of declarations sharing `operation`'s name.
    pub fn overloads(&self, operation: &str) -> usize {
        self.by_name.get(operation).map_or(0, Vec::len)
    }
}

fn describe_arguments(args: &[Value]) -> String {
    args.iter()
        .map(|arg| arg.kind().as_str())
        .collect::<Vec<_>>()
        .join(",")
}
