//! End-to-end test utilities for the Argo tunnel API client
//!
//! Runs the real `HttpTransport` against a local mock of the API, so the
//! tests exercise URL building, authentication headers, status handling and
//! envelope decoding over actual HTTP.

pub mod mock_api;

pub use mock_api::{MockApiServer, RecordedRequest};

use argo_api::{Credentials, HttpTransport, TunnelClient};

/// Token the helpers authenticate with
pub const TEST_TOKEN: &str = "test-token";

/// Build a tunnel client pointed at the mock server using token credentials
pub fn client_for(server: &MockApiServer) -> TunnelClient<HttpTransport> {
    client_with_credentials(server, Credentials::Token(TEST_TOKEN.to_string()))
}

/// Build a tunnel client pointed at the mock server
pub fn client_with_credentials(
    server: &MockApiServer,
    credentials: Credentials,
) -> TunnelClient<HttpTransport> {
    let transport = HttpTransport::builder(credentials)
        .base_url(server.base_url())
        .build()
        .expect("Failed to build transport");
    TunnelClient::new(transport)
}
