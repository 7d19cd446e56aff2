//! Error types shared across the client.

use thiserror::Error;

/// Failures talking to the PumpFlux REST API
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// The request never produced a response (connect, timeout, ...)
    #[error("Request failed: {0}")]
    Request(String),

    /// The server answered with a non-success status
    #[error("Server returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The entity does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// The response body could not be decoded
    #[error("Failed to parse response: {0}")]
    Decode(String),
}

impl ApiError {
    /// Error for a non-success status. `what` names the entity for 404s.
    pub fn from_status(status: u16, body: String, what: &str) -> Self {
        if status == 404 {
            ApiError::NotFound(what.to_string())
        } else {
            ApiError::Status { status, body }
        }
    }

    /// Whether retrying the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            ApiError::Request(_) => true,
            ApiError::Status { status, .. } => *status >= 500 || *status == 429,
            ApiError::NotFound(_) | ApiError::Decode(_) => false,
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        ApiError::Decode(e.to_string())
    }
}

#[cfg(feature = "native")]
impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            return ApiError::Decode(e.to_string());
        }
        match e.status() {
            Some(status) => ApiError::Status {
                status: status.as_u16(),
                body: e.to_string(),
            },
            None => ApiError::Request(e.to_string()),
        }
    }
}

/// Failures of a key-value store backing favorites
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_errors() {
        assert!(ApiError::Request("connection refused".into()).is_retryable());
        assert!(ApiError::Status { status: 503, body: String::new() }.is_retryable());
        assert!(ApiError::Status { status: 429, body: String::new() }.is_retryable());
        assert!(!ApiError::Status { status: 400, body: String::new() }.is_retryable());
        assert!(!ApiError::NotFound("template 4".into()).is_retryable());
        assert!(!ApiError::Decode("eof".into()).is_retryable());
    }

    #[test]
    fn test_from_status() {
        let missing = ApiError::from_status(404, "nope".into(), "template 4");
        assert!(matches!(missing, ApiError::NotFound(ref what) if what == "template 4"));

        let busy = ApiError::from_status(502, "bad gateway".into(), "template 4");
        assert!(busy.is_retryable());
        assert_eq!(busy.to_string(), "Server returned 502: bad gateway");
    }
}
