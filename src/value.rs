//! Dynamically typed values crossing the proxy's uniform call contract.
//!
//! Every proxied operation receives its arguments as a slice of [`Value`]
//! and returns a single [`Value`]. Operation signatures describe their
//! parameter shapes with [`ValueKind`], which the creation strategy uses to
//! disambiguate overloads at call time.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Result type for value conversions.
pub type Result<T> = std::result::Result<T, ValueError>;

/// Errors raised when a [`Value`] does not have the expected kind.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValueError {
    #[error("type mismatch: expected {expected}, got {actual}")]
    TypeMismatch {
        expected: ValueKind,
        actual: ValueKind,
    },

    #[error("integer {0} out of range for target type")]
    OutOfRange(i64),
}

/// Shape of a parameter or return value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueKind {
    Unit,
    Bool,
    Int,
    Float,
    Str,
    Bytes,
    List,
    /// Accepts a value of any kind.
    Any,
}

impl ValueKind {
    /// Check whether a runtime value is compatible with this kind.
    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            ValueKind::Any => true,
            kind => *kind == value.kind(),
        }
    }

    /// Name used in operation signatures, e.g. `doWork(Str,Str)`.
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueKind::Unit => "Unit",
            ValueKind::Bool => "Bool",
            ValueKind::Int => "Int",
            ValueKind::Float => "Float",
            ValueKind::Str => "Str",
            ValueKind::Bytes => "Bytes",
            ValueKind::List => "List",
            ValueKind::Any => "Any",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single argument or return value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub enum Value {
    #[default]
    Unit,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Bytes(Vec<u8>),
    List(Vec<Value>),
}

impl Value {
    /// Runtime kind of this value. Never returns [`ValueKind::Any`].
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Unit => ValueKind::Unit,
            Value::Bool(_) => ValueKind::Bool,
            Value::Int(_) => ValueKind::Int,
            Value::Float(_) => ValueKind::Float,
            Value::Str(_) => ValueKind::Str,
            Value::Bytes(_) => ValueKind::Bytes,
            Value::List(_) => ValueKind::List,
        }
    }

    fn mismatch(&self, expected: ValueKind) -> ValueError {
        ValueError::TypeMismatch {
            expected,
            actual: self.kind(),
        }
    }

    pub fn as_str(&self) -> Result<&str> {
        match self {
            Value::Str(s) => Ok(s),
            other => Err(other.mismatch(ValueKind::Str)),
        }
    }

    pub fn as_int(&self) -> Result<i64> {
        match self {
            Value::Int(i) => Ok(*i),
            other => Err(other.mismatch(ValueKind::Int)),
        }
    }

    pub fn as_bool(&self) -> Result<bool> {
        match self {
            Value::Bool(b) => Ok(*b),
            other => Err(other.mismatch(ValueKind::Bool)),
        }
    }

    /// Floats accept integer values as well.
    pub fn as_float(&self) -> Result<f64> {
        match self {
            Value::Float(f) => Ok(*f),
            Value::Int(i) => Ok(*i as f64),
            other => Err(other.mismatch(ValueKind::Float)),
        }
    }

    pub fn as_bytes(&self) -> Result<&[u8]> {
        match self {
            Value::Bytes(b) => Ok(b),
            other => Err(other.mismatch(ValueKind::Bytes)),
        }
    }

    pub fn as_list(&self) -> Result<&[Value]> {
        match self {
            Value::List(items) => Ok(items),
            other => Err(other.mismatch(ValueKind::List)),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Unit => f.write_str("()"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::Str(s) => write!(f, "{:?}", s),
            Value::Bytes(b) => write!(f, "<{} bytes>", b.len()),
            Value::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
        }
    }
}

// ============================================================================
// Conversions into Value
// ============================================================================

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Value::Unit
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<u32> for Value {
    fn from(i: u32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<Vec<u8>> for Value {
    fn from(b: Vec<u8>) -> Self {
        Value::Bytes(b)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

// ============================================================================
// Conversions out of Value
// ============================================================================

impl TryFrom<Value> for () {
    type Error = ValueError;

    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::Unit => Ok(()),
            other => Err(other.mismatch(ValueKind::Unit)),
        }
    }
}

impl TryFrom<Value> for bool {
    type Error = ValueError;

    fn try_from(value: Value) -> Result<Self> {
        value.as_bool()
    }
}

impl TryFrom<Value> for i64 {
    type Error = ValueError;

    fn try_from(value: Value) -> Result<Self> {
        value.as_int()
    }
}

impl TryFrom<Value> for i32 {
    type Error = ValueError;

    fn try_from(value: Value) -> Result<Self> {
        let i = value.as_int()?;
        i32::try_from(i).map_err(|_| ValueError::OutOfRange(i))
    }
}

impl TryFrom<Value> for f64 {
    type Error = ValueError;

    fn try_from(value: Value) -> Result<Self> {
        value.as_float()
    }
}

impl TryFrom<Value> for String {
    type Error = ValueError;

    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::Str(s) => Ok(s),
            other => Err(other.mismatch(ValueKind::Str)),
        }
    }
}

impl TryFrom<Value> for Vec<u8> {
    type Error = ValueError;

    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::Bytes(b) => Ok(b),
            other => Err(other.mismatch(ValueKind::Bytes)),
        }
    }
}

impl TryFrom<Value> for Vec<Value> {
    type Error = ValueError;

    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::List(items) => Ok(items),
            other => Err(other.mismatch(ValueKind::List)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_matches_variant() {
        assert_eq!(Value::from("x").kind(), ValueKind::Str);
        assert_eq!(Value::from(3i64).kind(), ValueKind::Int);
        assert_eq!(Value::from(()).kind(), ValueKind::Unit);
        assert_eq!(Value::from(vec![Value::Int(1)]).kind(), ValueKind::List);
    }

    #[test]
    fn test_any_accepts_everything() {
        assert!(ValueKind::Any.accepts(&Value::Unit));
        assert!(ValueKind::Any.accepts(&Value::from("x")));
        assert!(ValueKind::Any.accepts(&Value::from(1.5)));
    }

    #[test]
    fn test_concrete_kind_rejects_other_kinds() {
        assert!(ValueKind::Str.accepts(&Value::from("x")));
        assert!(!ValueKind::Str.accepts(&Value::from(1i64)));
        assert!(!ValueKind::Int.accepts(&Value::from(1.0)));
    }

    #[test]
    fn test_as_str_mismatch_reports_kinds() {
        let err = Value::from(7i64).as_str().unwrap_err();
        assert_eq!(
            err,
            ValueError::TypeMismatch {
                expected: ValueKind::Str,
                actual: ValueKind::Int,
            }
        );
        assert_eq!(err.to_string(), "type mismatch: expected Str, got Int");
    }

    #[test]
    fn test_as_float_widens_int() {
        assert_eq!(Value::from(2i64).as_float().unwrap(), 2.0);
    }

    #[test]
    fn test_try_from_i32_out_of_range() {
        let err = i32::try_from(Value::Int(i64::MAX)).unwrap_err();
        assert_eq!(err, ValueError::OutOfRange(i64::MAX));
    }

    #[test]
    fn test_try_from_string() {
        let s: String = Value::from("hello").try_into().unwrap();
        assert_eq!(s, "hello");
        assert!(String::try_from(Value::Bool(true)).is_err());
    }

    #[test]
    fn test_display_list() {
        let v = Value::from(vec![Value::from("a"), Value::Int(2), Value::Unit]);
        assert_eq!(v.to_string(), "[\"a\", 2, ()]");
    }
}
