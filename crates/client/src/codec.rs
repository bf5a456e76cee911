//! Conversion of command arguments to plain JSON.
//!
//! Anything `Serialize` can be an argument: numeric vectors, fixed-size
//! arrays, tuples, nested maps, user structs. Normalizing flattens it to
//! nested arrays, objects, numbers, strings, booleans and nulls. Non-finite
//! floats become `null`, and map keys become strings. Normalizing an
//! already-plain value returns it unchanged.

use serde::Serialize;
use serde::ser::Error as _;
use serde_json::{Map, Value};

/// A command's argument mapping.
pub type Args = Map<String, Value>;

pub fn normalize<T: Serialize + ?Sized>(value: &T) -> serde_json::Result<Value> {
    serde_json::to_value(value)
}

/// Normalize a value that must come out as a mapping.
pub fn to_args<T: Serialize + ?Sized>(value: &T) -> serde_json::Result<Args> {
    match normalize(value)? {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(Args::new()),
        other => Err(serde_json::Error::custom(format!(
            "command arguments must be a mapping, got {}",
            kind(&other)
        ))),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a sequence",
        Value::Object(_) => "a mapping",
    }
}
