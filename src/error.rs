use std::time::Duration;
use thiserror::Error;

/// Why a batched backend lookup produced no usable data.
///
/// Never returned from the service's lookup methods as an `Err`: every
/// variant degrades to the key-as-literal fallback and is reported only as a
/// transient message.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Translation request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Failed to send translation request: {0}")]
    Network(String),

    #[error("Translation API error ({status}): {body}")]
    Status { status: u16, body: String },

    #[error("Failed to parse translation response: {0}")]
    Decode(String),

    #[error("Unrecognized translation response shape")]
    UnexpectedShape,
}

impl FetchError {
    /// Classify a transport error from reqwest.
    pub fn from_reqwest(error: reqwest::Error, timeout: Duration) -> Self {
        if error.is_timeout() {
            FetchError::Timeout(timeout)
        } else if error.is_decode() || error.is_body() {
            FetchError::Decode(error.to_string())
        } else {
            FetchError::Network(error.to_string())
        }
    }
}

/// Failure of the durable key/value storage backend.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage I/O error on slot '{slot}': {source}")]
    Io {
        slot: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid storage slot name: '{0}'")]
    InvalidSlot(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_mentions_code() {
        let error = FetchError::Status {
            status: 503,
            body: "Service Unavailable".to_string(),
        };
        let message = error.to_string();
        assert!(message.contains("503"));
        assert!(message.contains("Service Unavailable"));
    }

    #[test]
    fn test_timeout_error_mentions_duration() {
        let error = FetchError::Timeout(Duration::from_secs(10));
        assert!(error.to_string().contains("10s"));
    }

    #[test]
    fn test_invalid_slot_error() {
        let error = StorageError::InvalidSlot("../etc".to_string());
        assert!(error.to_string().contains("../etc"));
    }
}
