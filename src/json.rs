//! JSON renderings of a chain
//!
//! Two shapes exist. The minimal shape flattens the call site and the most
//! useful metadata into each link:
//!
//! ```json
//! {"_size": "minimal", "context": "reading config", "depth": 1,
//!  "time": "...", "index": 3, "file": "main.rs", "function": "main",
//!  "line": 12, "wraps": {"error": "permission denied"}}
//! ```
//!
//! The full shape nests complete `caller`, `process` and `metadata` records.
//! Opaque errors at the end of a chain render as `{"error": message}`.

use crate::capture::{UNKNOWN_FILE, UNKNOWN_FUNCTION, UNKNOWN_LINE};
use crate::chain::{Link, WrappedError};
use crate::state::state;
use serde::{Serialize, Serializer};
use serde_json::{json, Map, Value};

const MINIMAL_SIZE: &str = "minimal";
const FULL_SIZE: &str = "full";

/// Build the JSON value of `err` and every link below it
pub fn to_json(err: &WrappedError, minimal: bool) -> Value {
    link_json(err.as_link(), minimal)
}

/// Build the JSON value of the chain starting at `link`
///
/// Nested values are assembled innermost first, so chain depth does not
/// translate into recursion depth.
pub fn link_json(link: Link<'_>, minimal: bool) -> Value {
    let mut links = Vec::new();
    link.walk(|current| {
        links.push(current);
        true
    });

    let mut wraps: Option<Value> = None;
    for (position, current) in links.iter().enumerate().rev() {
        let depth = links.len() - 1 - position;
        let value = match current {
            Link::Wrapped(w) if minimal => minimal_json(w, depth, wraps.take()),
            Link::Wrapped(w) => full_json(w, depth, wraps.take()),
            Link::Plain(err) => json!({ "error": err.to_string() }),
        };
        wraps = Some(value);
    }

    wraps.unwrap_or(Value::Null)
}

fn minimal_json(err: &WrappedError, depth: usize, wraps: Option<Value>) -> Value {
    let metadata = err.metadata();
    let (file, function, line) = match err.caller() {
        Some(caller) => (caller.file(), caller.function(), caller.line()),
        None => (UNKNOWN_FILE, UNKNOWN_FUNCTION, UNKNOWN_LINE),
    };

    let mut object = Map::new();
    object.insert("_size".into(), Value::from(MINIMAL_SIZE));
    object.insert("context".into(), err.context().value().clone());
    object.insert("depth".into(), Value::from(depth));
    object.insert("time".into(), json!(metadata.time()));
    object.insert("index".into(), Value::from(metadata.index()));
    if metadata.similar() > 0 {
        object.insert("similar".into(), Value::from(metadata.similar()));
    }
    object.insert("file".into(), Value::from(file));
    object.insert("function".into(), Value::from(function));
    object.insert("line".into(), Value::from(line));
    if let Some(wraps) = wraps {
        object.insert("wraps".into(), wraps);
    }
    Value::Object(object)
}

fn full_json(err: &WrappedError, depth: usize, wraps: Option<Value>) -> Value {
    json!({
        "_size": FULL_SIZE,
        "caller": to_value_or_null(err.caller()),
        "process": to_value_or_null(err.process()),
        "metadata": to_value_or_null(Some(err.metadata())),
        "context": err.context().value(),
        "depth": depth,
        "wraps": wraps.unwrap_or(Value::Null),
    })
}

fn to_value_or_null<T: Serialize>(value: Option<T>) -> Value {
    value
        .and_then(|v| serde_json::to_value(v).ok())
        .unwrap_or(Value::Null)
}

impl Serialize for WrappedError {
    /// Serializes in the shape selected by `marshal_minimal_json`
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let minimal = state().configuration().marshal_minimal_json;
        to_json(self, minimal).serialize(serializer)
    }
}
