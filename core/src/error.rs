//! Error types for the Piwik API client.
//!
//! # Design
//! Decoding failures get their own enum because they are produced by a pure
//! function that never sees the HTTP layer. `ApiError` wraps them together
//! with the name of the remote operation so callers can tell which call
//! drifted from the server's contract. Nothing here is retried.

use thiserror::Error;

/// Opaque failure reported by a [`Transport`](crate::http::Transport).
///
/// The core never inspects it; it is surfaced to the caller unchanged.
#[derive(Debug, Error)]
#[error("transport error: {source}")]
pub struct TransportError {
    #[source]
    source: Box<dyn std::error::Error + Send + Sync>,
}

impl TransportError {
    pub fn new<E>(source: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Self {
            source: source.into(),
        }
    }
}

/// Errors produced while turning a response body into a typed value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The body is not valid JSON.
    #[error("malformed payload: {0}")]
    MalformedPayload(String),

    /// The server answered with its `{"result":"error"}` envelope.
    #[error("remote error: {message}")]
    RemoteError { message: String },

    /// A JSON value has the wrong kind for the declared result shape.
    #[error("type mismatch at {}: expected {expected}, found {found}", display_path(.path))]
    TypeMismatch {
        path: String,
        expected: &'static str,
        found: &'static str,
    },

    /// A required field is absent (or null) in a JSON object.
    #[error("missing field {}", display_path(.path))]
    MissingField { path: String },
}

impl DecodeError {
    pub(crate) fn mismatch(expected: &'static str, value: &serde_json::Value) -> Self {
        DecodeError::TypeMismatch {
            path: String::new(),
            expected,
            found: json_kind(value),
        }
    }

    /// Prefix the error path with an object key or array index segment.
    pub(crate) fn within(self, segment: &str) -> Self {
        match self {
            DecodeError::TypeMismatch {
                path,
                expected,
                found,
            } => DecodeError::TypeMismatch {
                path: join_path(segment, &path),
                expected,
                found,
            },
            DecodeError::MissingField { path } => DecodeError::MissingField {
                path: join_path(segment, &path),
            },
            other => other,
        }
    }
}

/// Errors returned by `PiwikClient` and the module gateways.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The server answered `operation` with a status other than 200.
    #[error("{operation}: HTTP {status}: {body}")]
    HttpStatus {
        operation: String,
        status: u16,
        body: String,
    },

    /// The response for `operation` could not be decoded.
    #[error("{operation}: {source}")]
    Decode {
        operation: String,
        #[source]
        source: DecodeError,
    },
}

impl ApiError {
    /// The decode error, if this call failed while decoding.
    pub fn as_decode(&self) -> Option<&DecodeError> {
        match self {
            ApiError::Decode { source, .. } => Some(source),
            _ => None,
        }
    }
}

pub(crate) fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

fn join_path(segment: &str, rest: &str) -> String {
    if rest.is_empty() || rest.starts_with('[') {
        format!("{segment}{rest}")
    } else {
        format!("{segment}.{rest}")
    }
}

fn display_path(path: &str) -> &str {
    if path.is_empty() {
        "<root>"
    } else {
        path
    }
}
