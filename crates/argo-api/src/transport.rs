//! Transport abstraction for API requests
//!
//! The tunnel client only formats paths and decodes envelopes; everything
//! that touches the network (authentication, headers, status handling) sits
//! behind this trait. That keeps the client usable with a mock transport in
//! tests or a caller-provided HTTP stack.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

pub use reqwest::{Method, StatusCode};

/// Errors reported by a [`Transport`]
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("failed to encode request body: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API returned {status}: {message}")]
    Status { status: StatusCode, message: String },

    #[error("{0}")]
    Other(String),
}

/// Performs a single API request and returns the raw response body
///
/// Implementations must treat a non-success HTTP status as an error. The
/// `path` is relative to the API base URL and the `body`, when present, is
/// already-serialized JSON.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<Vec<u8>>,
    ) -> Result<Bytes, TransportError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<Vec<u8>>,
    ) -> Result<Bytes, TransportError> {
        (**self).request(method, path, body).await
    }
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Box<T> {
    async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<Vec<u8>>,
    ) -> Result<Bytes, TransportError> {
        (**self).request(method, path, body).await
    }
}
