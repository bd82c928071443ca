//! Error types for catalog and thumbnail fetching

use std::time::Duration;

/// Failure of a catalog or thumbnail fetch
///
/// Catalog failures abort the whole batch. Thumbnail failures only leave
/// that item's image absent.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    /// Transport-level failure (DNS, connection, TLS, broken body stream)
    #[error("Network failure: {0}")]
    Network(String),

    /// HTTP status outside 200-299
    #[error("Bad status code: {0}")]
    BadStatus(u16),

    /// Catalog body is not the expected JSON shape
    #[error("Failed to decode catalog: {0}")]
    Decode(String),

    /// Thumbnail body is not a decodable image
    #[error("Invalid image payload: {0}")]
    InvalidImage(String),

    #[error("Request timed out after {0:?}")]
    TimedOut(Duration),

    #[error("Response body exceeds {limit} bytes")]
    TooLarge { limit: usize },

    #[error("Fetch cancelled")]
    Cancelled,

    /// The background fetch task died without delivering a result
    #[error("Catalog task failed: {0}")]
    TaskFailed(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        FetchError::Network(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, FetchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bad_status_message_carries_code() {
        assert_eq!(FetchError::BadStatus(500).to_string(), "Bad status code: 500");
    }

    #[test]
    fn test_too_large_message() {
        let err = FetchError::TooLarge { limit: 1024 };
        assert_eq!(err.to_string(), "Response body exceeds 1024 bytes");
    }
}
