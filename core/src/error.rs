//! Error types for the registry client.
//!
//! # Design
//! Three failure points exist per call: the transport never produced a
//! response, the response carried a non-2xx status, or a 2xx body was not
//! JSON. Each gets its own variant and each names the endpoint it came from.
//! Error bodies are kept raw; they are never decoded.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ApiError>;

/// Errors returned by `FederationClient` operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
    /// The request never reached the server, or no response came back.
    #[error("request to {endpoint} failed: {message}")]
    Transport { endpoint: String, message: String },

    /// The server answered with a status outside 200..300.
    #[error("HTTP {status} from {endpoint}")]
    HttpStatus {
        status: u16,
        endpoint: String,
        body: String,
    },

    /// A successful response body was not valid JSON.
    #[error("invalid JSON from {endpoint}: {message}")]
    Parse { endpoint: String, message: String },

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),
}

impl ApiError {
    /// HTTP status code, when the server produced one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Endpoint the failing request targeted. `None` for serialization
    /// failures, which happen before an endpoint is involved.
    pub fn endpoint(&self) -> Option<&str> {
        match self {
            ApiError::Transport { endpoint, .. }
            | ApiError::HttpStatus { endpoint, .. }
            | ApiError::Parse { endpoint, .. } => Some(endpoint),
            ApiError::Serialization(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_status_message_names_status_and_endpoint() {
        let err = ApiError::HttpStatus {
            status: 404,
            endpoint: "/fetch?sub=x".to_string(),
            body: "not here".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("404"), "{msg}");
        assert!(msg.contains("/fetch?sub=x"), "{msg}");
        assert_eq!(err.status(), Some(404));
    }

    #[test]
    fn transport_error_has_no_status() {
        let err = ApiError::Transport {
            endpoint: "/historical-keys".to_string(),
            message: "connection refused".to_string(),
        };
        assert_eq!(err.status(), None);
        assert_eq!(err.endpoint(), Some("/historical-keys"));
        assert!(err.to_string().contains("connection refused"));
    }

    #[test]
    fn serialization_error_has_no_endpoint() {
        let err = ApiError::Serialization("key must be a string".to_string());
        assert_eq!(err.endpoint(), None);
    }
}
