use std::fmt;
use std::sync::Arc;

use serde_json::Value;

/// An opaque argument value flowing through the dispatch contract.
///
/// Wraps a shared `serde_json::Value`. Equality (`==`) compares by value;
/// [`ArgValue::is_same`] compares by allocation, which is what identity
/// constraints use. Cloning shares the allocation, so a value passed through
/// a forwarding call and later used in an identity constraint still compares
/// as the same reference.
#[derive(Debug, Clone)]
pub struct ArgValue(Arc<Value>);

impl ArgValue {
    #[must_use]
    pub fn new(value: impl Into<Value>) -> Self {
        Self(Arc::new(value.into()))
    }

    #[must_use]
    pub fn null() -> Self {
        Self(Arc::new(Value::Null))
    }

    #[must_use]
    pub fn as_json(&self) -> &Value {
        &self.0
    }

    /// Reference identity: true when both handles share one allocation.
    #[must_use]
    pub fn is_same(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    #[must_use]
    pub fn is_null(&self) -> bool {
        self.0.is_null()
    }

    #[must_use]
    pub fn kind(&self) -> ValueKind {
        match &*self.0 {
            Value::Null => ValueKind::Null,
            Value::Bool(_) => ValueKind::Bool,
            Value::Number(_) => ValueKind::Number,
            Value::String(_) => ValueKind::String,
            Value::Array(_) => ValueKind::Array,
            Value::Object(_) => ValueKind::Object,
        }
    }
}

impl PartialEq for ArgValue {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Eq for ArgValue {}

impl fmt::Display for ArgValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The runtime kind of an [`ArgValue`], used by type-check constraints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Null,
    Bool,
    Number,
    String,
    Array,
    Object,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Null => "null",
            Self::Bool => "bool",
            Self::Number => "number",
            Self::String => "string",
            Self::Array => "array",
            Self::Object => "object",
        };
        write!(f, "{name}")
    }
}

/// Render an argument vector verbatim for diagnostics: `(42, "alice")`.
#[must_use]
pub fn render_args(args: &[ArgValue]) -> String {
    let mut out = String::from("(");
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        out.push_str(&arg.to_string());
    }
    out.push(')');
    out
}
