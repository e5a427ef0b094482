//! Response decoding: raw body to typed result shape.
//!
//! # Design
//! `serde_json::Value` is the generic tree every payload is parsed into.
//! Result shapes then pull their values out of that tree through
//! [`FromJson`]: scalars check the JSON kind, `Vec<T>` walks an array, and
//! records go through an explicit [`Record::FIELDS`] table that maps each
//! remote key to the local field it fills. Keeping the table as data lets
//! the decoder report the remote key that failed.

use serde_json::{Map, Value};

use crate::error::DecodeError;

/// A result shape that can be built from a JSON value.
pub trait FromJson: Sized {
    fn from_json(value: &Value) -> Result<Self, DecodeError>;
}

/// One row of a record's mapping table.
pub struct Field<T> {
    /// Key in the server's JSON object.
    pub remote: &'static str,
    /// A required field must be present and non-null.
    pub required: bool,
    pub assign: fn(&mut T, &Value) -> Result<(), DecodeError>,
}

/// A structured result whose fields are filled from a JSON object.
pub trait Record: Default + 'static {
    const FIELDS: &'static [Field<Self>];

    /// Called for each key no table row claims. Ignored by default.
    fn unmapped(&mut self, _key: &str, _value: &Value) {}
}

/// Parse `raw` and decode it into `T`.
///
/// The server's error envelope wins over any target shape.
pub fn decode<T: FromJson>(raw: &str) -> Result<T, DecodeError> {
    let value: Value =
        serde_json::from_str(raw).map_err(|e| DecodeError::MalformedPayload(e.to_string()))?;
    if let Some(message) = error_envelope(&value) {
        return Err(DecodeError::RemoteError { message });
    }
    T::from_json(&value)
}

/// Decode an object into a record through its mapping table.
pub fn decode_record<T: Record>(value: &Value) -> Result<T, DecodeError> {
    let object = value
        .as_object()
        .ok_or_else(|| DecodeError::mismatch("object", value))?;

    let mut record = T::default();
    for field in T::FIELDS {
        match object.get(field.remote) {
            Some(Value::Null) | None if field.required => {
                return Err(DecodeError::MissingField {
                    path: field.remote.to_string(),
                });
            }
            Some(Value::Null) | None => {}
            Some(value) => {
                (field.assign)(&mut record, value).map_err(|e| e.within(field.remote))?;
            }
        }
    }

    for (key, value) in object {
        if !T::FIELDS.iter().any(|field| field.remote == key) {
            record.unmapped(key, value);
        }
    }
    Ok(record)
}

/// `{"result":"error","message":...}` yields the message.
fn error_envelope(value: &Value) -> Option<String> {
    let object = value.as_object()?;
    if envelope_status(object) != Some("error") {
        return None;
    }
    let message = object
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or_default();
    Some(message.to_string())
}

fn envelope_status(object: &Map<String, Value>) -> Option<&str> {
    object.get("result").and_then(Value::as_str)
}

impl FromJson for i64 {
    /// Piwik serializes database columns as strings, so `"7"` is accepted.
    fn from_json(value: &Value) -> Result<Self, DecodeError> {
        match value {
            Value::Number(number) => number
                .as_i64()
                .ok_or_else(|| DecodeError::mismatch("integer", value)),
            Value::String(text) => text
                .trim()
                .parse()
                .map_err(|_| DecodeError::mismatch("integer", value)),
            _ => Err(DecodeError::mismatch("integer", value)),
        }
    }
}

impl FromJson for bool {
    /// Besides JSON booleans, accepts `0`/`1` in either form and the
    /// `{"result":"success"}` envelope returned by mutating operations.
    fn from_json(value: &Value) -> Result<Self, DecodeError> {
        match value {
            Value::Bool(flag) => Ok(*flag),
            Value::Number(number) => match number.as_i64() {
                Some(0) => Ok(false),
                Some(1) => Ok(true),
                _ => Err(DecodeError::mismatch("boolean", value)),
            },
            Value::String(text) => match text.as_str() {
                "0" | "false" => Ok(false),
                "1" | "true" => Ok(true),
                _ => Err(DecodeError::mismatch("boolean", value)),
            },
            Value::Object(object) if envelope_status(object) == Some("success") => Ok(true),
            _ => Err(DecodeError::mismatch("boolean", value)),
        }
    }
}

impl FromJson for String {
    fn from_json(value: &Value) -> Result<Self, DecodeError> {
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| DecodeError::mismatch("string", value))
    }
}

impl<T: FromJson> FromJson for Option<T> {
    fn from_json(value: &Value) -> Result<Self, DecodeError> {
        match value {
            Value::Null => Ok(None),
            other => T::from_json(other).map(Some),
        }
    }
}

impl<T: FromJson> FromJson for Vec<T> {
    fn from_json(value: &Value) -> Result<Self, DecodeError> {
        let items = value
            .as_array()
            .ok_or_else(|| DecodeError::mismatch("array", value))?;
        items
            .iter()
            .enumerate()
            .map(|(index, item)| T::from_json(item).map_err(|e| e.within(&format!("[{index}]"))))
            .collect()
    }
}
