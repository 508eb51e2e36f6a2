//! Error types for the appointment API client.
//!
//! # Design
//! Three families of failure reach callers: no response at all (`Network`,
//! `TimedOut`), an HTTP error response (`Http`, with the server's message when
//! the body carries one), and a success response whose payload is unusable
//! (`InvalidResponse`, `Deserialization`). `is_connectivity` lets views tell
//! "check your connection" apart from "try again".

use thiserror::Error;

/// Errors produced while building requests or interpreting responses.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced a response.
    #[error("network error: {0}")]
    Network(String),

    /// The host aborted the request after the configured timeout.
    #[error("Request timed out after {timeout_ms}ms")]
    TimedOut { timeout_ms: u64 },

    /// The server answered with a non-2xx status.
    #[error("HTTP {status}: {message}")]
    Http {
        status: u16,
        message: String,
        body: Option<serde_json::Value>,
    },

    /// A 2xx response whose content fails an identity or shape check.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// The response body could not be deserialized into the expected type.
    #[error("Failed to parse JSON response: {0}")]
    Deserialization(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),
}

impl ApiError {
    /// HTTP status of the failed response, if the server answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// True when no response was received at all.
    pub fn is_connectivity(&self) -> bool {
        matches!(self, ApiError::Network(_) | ApiError::TimedOut { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_message_names_the_budget() {
        let err = ApiError::TimedOut { timeout_ms: 8000 };
        assert_eq!(err.to_string(), "Request timed out after 8000ms");
        assert!(err.is_connectivity());
    }

    #[test]
    fn http_errors_are_not_connectivity_failures() {
        let err = ApiError::Http {
            status: 404,
            message: "Appointment not found".to_string(),
            body: None,
        };
        assert!(err.is_not_found());
        assert!(!err.is_connectivity());
        assert_eq!(err.to_string(), "HTTP 404: Appointment not found");
    }

    #[test]
    fn status_is_absent_without_response() {
        assert_eq!(ApiError::Network("refused".into()).status(), None);
        assert_eq!(ApiError::InvalidResponse("x".into()).status(), None);
    }
}
