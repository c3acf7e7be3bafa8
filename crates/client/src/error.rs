//! Unified error handling for the client SDK.
//!
//! Every API surface returns `Result<T, ApiError>`. The client never
//! swallows an error: a call either resolves with data or fails with one of
//! the variants below. Storage faults are deliberately *not* part of this
//! taxonomy - the cart treats them as recoverable (see [`crate::storage`]).

use reqwest::StatusCode;
use thiserror::Error;

/// Errors surfaced by the API client and the surfaces built on top of it.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport-level failure: the request never produced a response.
    /// Never retried automatically.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The server responded with a non-success status (other than the
    /// refresh-eligible 401 case). Carries the best-effort parsed body,
    /// falling back to the status text when the body is not JSON.
    #[error("HTTP {status}: {}", payload_message(payload))]
    Http {
        /// Response status code.
        status: StatusCode,
        /// Parsed response body, or `{"message": <status text>}`.
        payload: serde_json::Value,
    },

    /// A 401 was intercepted and the credential renewal itself failed. The
    /// session has been torn down; the user must log in again.
    #[error("session expired, please log in again")]
    SessionExpired,

    /// A response (or request body) could not be (de)serialized.
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl ApiError {
    /// Build an [`ApiError::Http`] from a status and raw body bytes.
    ///
    /// The body is parsed as JSON when possible; otherwise the status text
    /// stands in as the payload message.
    #[must_use]
    pub(crate) fn http(status: StatusCode, body: &[u8]) -> Self {
        let payload = serde_json::from_slice(body).unwrap_or_else(|_| {
            serde_json::json!({
                "message": status.canonical_reason().unwrap_or("unknown error"),
            })
        });
        Self::Http { status, payload }
    }

    /// The response status, when the server produced one.
    #[must_use]
    pub const fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Extract the human-readable message from an error payload.
fn payload_message(payload: &serde_json::Value) -> &str {
    payload
        .get("message")
        .and_then(serde_json::Value::as_str)
        .unwrap_or("something went wrong")
}

/// Result type alias for [`ApiError`].
pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_http_error_parses_json_body() {
        let err = ApiError::http(
            StatusCode::UNPROCESSABLE_ENTITY,
            br#"{"message": "slug already in use"}"#,
        );
        assert_eq!(err.to_string(), "HTTP 422 Unprocessable Entity: slug already in use");
        assert_eq!(err.status(), Some(StatusCode::UNPROCESSABLE_ENTITY));
    }

    #[test]
    fn test_http_error_falls_back_to_status_text() {
        let err = ApiError::http(StatusCode::BAD_GATEWAY, b"<html>nope</html>");
        let ApiError::Http { payload, .. } = &err else {
            panic!("expected Http variant");
        };
        assert_eq!(payload["message"], "Bad Gateway");
    }

    #[test]
    fn test_session_expired_display() {
        assert_eq!(
            ApiError::SessionExpired.to_string(),
            "session expired, please log in again"
        );
    }
}
