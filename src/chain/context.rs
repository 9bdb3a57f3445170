//! Context payloads attached to chain links

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// The human-supplied payload of a chain link
///
/// A context is either plain text or a structured value. It is stored as a
/// `serde_json::Value` so that it survives the JSON and binary encodings
/// unchanged. Strings render verbatim, `Null` renders as an empty string and
/// every other value renders as compact JSON.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Context(Value);

impl Context {
    /// Create a context from an already structured value
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// Create a context from any serializable value
    ///
    /// Serialization failures degrade to an empty context.
    pub fn from_serialize<T: Serialize + ?Sized>(value: &T) -> Self {
        match serde_json::to_value(value) {
            Ok(value) => Self(value),
            Err(e) => {
                tracing::trace!("context serialization failed: {}", e);
                Self(Value::Null)
            }
        }
    }

    /// An absent context
    pub fn empty() -> Self {
        Self(Value::Null)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_null()
    }

    /// The context as a string slice, if it is plain text
    pub fn as_str(&self) -> Option<&str> {
        self.0.as_str()
    }

    pub fn value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }

    /// Encode the context as JSON text
    ///
    /// An absent context encodes as the empty string.
    pub(crate) fn to_wire(&self) -> String {
        if self.is_empty() {
            return String::new();
        }
        serde_json::to_string(&self.0).unwrap_or_default()
    }

    /// Decode a context from JSON text, treating non-JSON text as a string
    pub(crate) fn from_wire(text: &str) -> Self {
        if text.is_empty() {
            return Self::empty();
        }
        match serde_json::from_str(text) {
            Ok(value) => Self(value),
            Err(_) => Self(Value::String(text.to_string())),
        }
    }
}

impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Value::Null => Ok(()),
            Value::String(s) => f.write_str(s),
            other => write!(f, "{}", other),
        }
    }
}

impl From<&str> for Context {
    fn from(s: &str) -> Self {
        Self(Value::String(s.to_string()))
    }
}

impl From<String> for Context {
    fn from(s: String) -> Self {
        Self(Value::String(s))
    }
}

impl From<&String> for Context {
    fn from(s: &String) -> Self {
        Self(Value::String(s.clone()))
    }
}

impl From<Value> for Context {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

impl From<i64> for Context {
    fn from(n: i64) -> Self {
        Self(Value::from(n))
    }
}

impl From<u64> for Context {
    fn from(n: u64) -> Self {
        Self(Value::from(n))
    }
}

impl From<bool> for Context {
    fn from(b: bool) -> Self {
        Self(Value::Bool(b))
    }
}
