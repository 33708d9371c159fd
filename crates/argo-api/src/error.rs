use thiserror::Error;

use crate::transport::TransportError;

/// Result alias for tunnel API calls
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors returned by [`TunnelClient`](crate::TunnelClient) operations
///
/// The variant names the stage that failed; the underlying cause is kept
/// as the error source.
#[derive(Debug, Error)]
pub enum Error {
    /// The transport could not complete the request (network failure,
    /// non-success status, authentication failure, unencodable body)
    #[error("request failed: {0}")]
    Request(#[from] TransportError),

    /// The response body did not match the expected envelope
    #[error("failed to decode response: {0}")]
    Decode(#[source] serde_json::Error),
}

impl Error {
    /// True if the request stage failed
    pub fn is_request(&self) -> bool {
        matches!(self, Error::Request(_))
    }

    /// True if the response could not be decoded
    pub fn is_decode(&self) -> bool {
        matches!(self, Error::Decode(_))
    }

    /// HTTP status reported by the API, if the failure was a non-success status
    pub fn status(&self) -> Option<reqwest::StatusCode> {
        match self {
            Error::Request(TransportError::Status { status, .. }) => Some(*status),
            Error::Request(TransportError::Http(e)) => e.status(),
            _ => None,
        }
    }
}
