//! `reqwest`-backed transport for the public API

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use reqwest::{Client, Method, RequestBuilder};

use crate::response::Response;
use crate::transport::{Transport, TransportError};

/// Public API endpoint
pub const DEFAULT_BASE_URL: &str = "https://api.cloudflare.com/client/v4";

const DEFAULT_USER_AGENT: &str = concat!("argo-api/", env!("CARGO_PKG_VERSION"));

/// API credentials
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    /// Scoped API token, sent as `Authorization: Bearer <token>`
    Token(String),

    /// Legacy global API key, sent as `X-Auth-Email` / `X-Auth-Key`
    Key { email: String, key: String },
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credentials::Token(_) => f.debug_tuple("Token").field(&"<redacted>").finish(),
            Credentials::Key { email, .. } => f
                .debug_struct("Key")
                .field("email", email)
                .field("key", &"<redacted>")
                .finish(),
        }
    }
}

/// HTTP transport that authenticates every request against the API
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
    user_agent: String,
    credentials: Credentials,
}

impl HttpTransport {
    /// Create a transport for the public API with default settings
    pub fn new(credentials: Credentials) -> Result<Self, TransportError> {
        Self::builder(credentials).build()
    }

    pub fn builder(credentials: Credentials) -> HttpTransportBuilder {
        HttpTransportBuilder {
            credentials,
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: None,
            client: None,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.credentials {
            Credentials::Token(token) => request.header(AUTHORIZATION, format!("Bearer {}", token)),
            Credentials::Key { email, key } => request
                .header("X-Auth-Email", email)
                .header("X-Auth-Key", key),
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<Vec<u8>>,
    ) -> Result<Bytes, TransportError> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(%method, path, "Sending API request");

        let mut request = self
            .authorize(self.client.request(method.clone(), &url))
            .header(USER_AGENT, &self.user_agent);
        if let Some(body) = body {
            request = request.header(CONTENT_TYPE, "application/json").body(body);
        }

        let response = request.send().await.map_err(|e| {
            tracing::warn!(%method, path, "API request failed: {}", e);
            TransportError::Http(e)
        })?;

        let status = response.status();
        let bytes = response.bytes().await?;

        if !status.is_success() {
            let message = error_message(&bytes);
            tracing::warn!(%method, path, %status, "API returned error: {}", message);
            return Err(TransportError::Status { status, message });
        }

        tracing::debug!(%method, path, %status, len = bytes.len(), "API request completed");
        Ok(bytes)
    }
}

/// Builder for [`HttpTransport`]
#[derive(Debug)]
pub struct HttpTransportBuilder {
    credentials: Credentials,
    base_url: String,
    user_agent: String,
    timeout: Option<Duration>,
    client: Option<Client>,
}

impl HttpTransportBuilder {
    /// Override the API base URL (e.g. for a proxy or a test server)
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Total timeout per request. Unset by default; ignored when a custom
    /// client is supplied.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Use an existing `reqwest` client
    pub fn client(mut self, client: Client) -> Self {
        self.client = Some(client);
        self
    }

    pub fn build(self) -> Result<HttpTransport, TransportError> {
        let client = match self.client {
            Some(client) => client,
            None => {
                let mut builder = Client::builder();
                if let Some(timeout) = self.timeout {
                    builder = builder.timeout(timeout);
                }
                builder.build()?
            }
        };

        Ok(HttpTransport {
            client,
            base_url: self.base_url,
            user_agent: self.user_agent,
            credentials: self.credentials,
        })
    }
}

/// Extract a readable message from an error response body
fn error_message(body: &[u8]) -> String {
    serde_json::from_slice::<Response>(body)
        .ok()
        .and_then(|envelope| envelope.error_summary())
        .unwrap_or_else(|| String::from_utf8_lossy(body).trim().to_string())
}
