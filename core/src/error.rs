//! Error types for the Postmates API client.
//!
//! # Design
//! A single `ApiError` is surfaced by every operation in the crate. Failure
//! bodies returned by the service come in two shapes: a bare message, or a
//! `{message, kind, code}` object. They map to the `Simple` and `Structured`
//! variants respectively so callers branch on a tag instead of inspecting the
//! payload. Client-side precondition failures use `Validation` and never
//! involve the network.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ApiError>;

/// Error transport implementations hand back unchanged.
pub type TransportError = Box<dyn std::error::Error + Send + Sync>;

/// Machine-readable failure code supplied by the service.
///
/// The service has emitted both numeric (`400`) and symbolic
/// (`"invalid_params"`) codes, so both are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ErrorCode {
    Number(i64),
    Text(String),
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCode::Number(n) => write!(f, "{n}"),
            ErrorCode::Text(s) => f.write_str(s),
        }
    }
}

/// Errors returned by `PostmatesClient`, `DeliveryQuote` and `Delivery`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// A client-side precondition failed. No request was sent.
    #[error("{0}")]
    Validation(String),

    /// The service rejected the request with a plain message.
    #[error("{0}")]
    Simple(String),

    /// The service rejected the request with a structured failure body.
    #[error("{message} ({kind}, code {code})")]
    Structured {
        message: String,
        kind: String,
        code: ErrorCode,
    },

    /// The underlying HTTP layer failed before a response was received.
    #[error("transport error: {0}")]
    Transport(#[source] TransportError),

    /// Client configuration is missing or malformed.
    #[error("configuration error: {0}")]
    Config(String),

    /// The response body could not be decoded into the expected type.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),
}

impl ApiError {
    /// Human-readable message, without the kind/code decoration.
    pub fn message(&self) -> String {
        match self {
            ApiError::Validation(msg) | ApiError::Simple(msg) => msg.clone(),
            ApiError::Structured { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }

    pub fn kind(&self) -> Option<&str> {
        match self {
            ApiError::Structured { kind, .. } => Some(kind),
            _ => None,
        }
    }

    pub fn code(&self) -> Option<&ErrorCode> {
        match self {
            ApiError::Structured { code, .. } => Some(code),
            _ => None,
        }
    }

    /// Build an error from a non-success response body.
    ///
    /// Structured bodies need all of `message`, `kind` and `code`; an object
    /// with only a `message`, or a JSON string, becomes `Simple`. Anything
    /// else falls back to a generic message carrying the status and raw body.
    pub fn from_failure_body(status: u16, body: &str) -> Self {
        #[derive(Deserialize)]
        struct FailureBody {
            message: String,
            kind: Option<String>,
            code: Option<ErrorCode>,
        }

        if let Ok(failure) = serde_json::from_str::<FailureBody>(body) {
            return match (failure.kind, failure.code) {
                (Some(kind), Some(code)) => ApiError::Structured {
                    message: failure.message,
                    kind,
                    code,
                },
                _ => ApiError::Simple(failure.message),
            };
        }
        if let Ok(message) = serde_json::from_str::<String>(body) {
            return ApiError::Simple(message);
        }
        ApiError::Simple(format!("HTTP {status}: {body}"))
    }
}

impl From<TransportError> for ApiError {
    fn from(error: TransportError) -> Self {
        ApiError::Transport(error)
    }
}
