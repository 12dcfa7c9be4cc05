//! Error types for the menu API client.
//!
//! # Design
//! `NotFound`, `Unauthorized` and `CsrfRejected` get dedicated variants
//! because the host reacts to each differently (404 page, token refresh,
//! CSRF refetch). Other non-2xx responses land in `HttpError` with the raw
//! status and body.

use serde::Deserialize;
use thiserror::Error;

/// Errors returned by `CarteClient` parse methods and the host executor.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
    /// The server returned 404.
    #[error("resource not found")]
    NotFound,

    /// The server returned 401 and no refresh could be attempted.
    #[error("unauthorized")]
    Unauthorized,

    /// The server rejected the request's anti-forgery token.
    #[error("CSRF token rejected: {message}")]
    CsrfRejected { message: String },

    /// The server returned a non-2xx status not covered above.
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    SerializationError(String),

    /// The refresh token is missing or was refused; the user must log in again.
    #[error("session expired")]
    SessionExpired,

    /// The host could not complete the round-trip.
    #[error("transport error: {0}")]
    Transport(String),

    /// A write payload failed client-side validation.
    #[error("invalid input: {0}")]
    Validation(String),
}

#[derive(Deserialize)]
struct MessageBody {
    message: serde_json::Value,
}

/// Extract the backend's `message` field. Array messages (validation
/// errors) are joined with ", ".
pub(crate) fn message_from_body(body: &str) -> Option<String> {
    let parsed: MessageBody = serde_json::from_str(body).ok()?;
    match parsed.message {
        serde_json::Value::String(s) => Some(s),
        serde_json::Value::Array(parts) => Some(
            parts
                .iter()
                .filter_map(|p| p.as_str())
                .collect::<Vec<_>>()
                .join(", "),
        ),
        _ => None,
    }
}

impl ApiError {
    /// Message suitable for a toast: the backend's own message when present.
    pub fn server_message(&self) -> Option<String> {
        match self {
            ApiError::HttpError { body, .. } => message_from_body(body),
            ApiError::CsrfRejected { message } => Some(message.clone()),
            ApiError::Validation(msg) => Some(msg.clone()),
            _ => None,
        }
    }

    pub fn is_auth_failure(&self) -> bool {
        matches!(self, ApiError::Unauthorized | ApiError::SessionExpired)
    }
}
