//! Tunnel resource: data model and lifecycle operations

use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::response::{null_as_default, Response, ResultInfo};
use crate::transport::{Transport, TransportError};

/// An Argo tunnel as returned by the API
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tunnel {
    #[serde(
        default,
        skip_serializing_if = "String::is_empty",
        deserialize_with = "null_as_default"
    )]
    pub id: String,

    #[serde(
        default,
        skip_serializing_if = "String::is_empty",
        deserialize_with = "null_as_default"
    )]
    pub name: String,

    /// Base64 tunnel secret. Only sent on create; the API does not echo it back.
    #[serde(
        rename = "tunnel_secret",
        default,
        skip_serializing_if = "String::is_empty",
        deserialize_with = "null_as_default"
    )]
    pub secret: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,

    #[serde(
        default,
        skip_serializing_if = "Vec::is_empty",
        deserialize_with = "null_as_default"
    )]
    pub connections: Vec<Connection>,
}

impl Tunnel {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// A connection between a tunnel and an edge location
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    pub colo_name: String,
    pub uuid: String,
    pub is_pending_reconnect: bool,
}

/// Envelope for endpoints returning a list of tunnels
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TunnelsDetailResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub result: Vec<Tunnel>,

    #[serde(default)]
    pub result_info: Option<ResultInfo>,

    #[serde(flatten)]
    pub response: Response,
}

/// Envelope for endpoints returning a single tunnel
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TunnelDetailResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub result: Tunnel,

    #[serde(flatten)]
    pub response: Response,
}

/// Envelope for endpoints whose result is discarded
///
/// `result` must still be an object or `null`, but its fields are not typed.
#[derive(Debug, Default, Deserialize)]
struct DiscardedDetailResponse {
    #[serde(default)]
    #[allow(dead_code)]
    result: Option<serde_json::Map<String, serde_json::Value>>,

    #[serde(flatten)]
    #[allow(dead_code)]
    response: Response,
}

/// Client for the account-scoped tunnel endpoints
///
/// Holds nothing but the transport, so it is safe to share between tasks
/// whenever the transport is.
#[derive(Debug, Clone)]
pub struct TunnelClient<T> {
    transport: T,
}

impl<T: Transport> TunnelClient<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// List all tunnels of an account
    ///
    /// Only the first page returned by the API is decoded.
    pub async fn list(&self, account_id: &str) -> Result<Vec<Tunnel>> {
        let res = self
            .transport
            .request(Method::GET, &tunnels_uri(account_id), None)
            .await?;

        let envelope: TunnelsDetailResponse = decode(&res)?;
        Ok(envelope.result)
    }

    /// Fetch a single tunnel
    pub async fn get(&self, account_id: &str, tunnel_id: &str) -> Result<Tunnel> {
        let res = self
            .transport
            .request(Method::GET, &tunnel_uri(account_id, tunnel_id), None)
            .await?;

        let envelope: TunnelDetailResponse = decode(&res)?;
        Ok(envelope.result)
    }

    /// Create a tunnel with the given name and base64 secret
    pub async fn create(&self, account_id: &str, name: &str, secret: &str) -> Result<Tunnel> {
        let tunnel = Tunnel {
            name: name.to_string(),
            secret: secret.to_string(),
            ..Default::default()
        };
        let body = serde_json::to_vec(&tunnel).map_err(TransportError::Encode)?;

        tracing::debug!(account_id, name, "Creating tunnel");
        let res = self
            .transport
            .request(Method::POST, &tunnels_uri(account_id), Some(body))
            .await?;

        let envelope: TunnelDetailResponse = decode(&res)?;
        Ok(envelope.result)
    }

    /// Delete a tunnel
    ///
    /// The response is decoded only to check its shape. A well-formed
    /// envelope with `"success": false` still returns `Ok`, and the fields
    /// of the deleted tunnel are not validated.
    pub async fn delete(&self, account_id: &str, tunnel_id: &str) -> Result<()> {
        tracing::debug!(account_id, tunnel_id, "Deleting tunnel");
        let res = self
            .transport
            .request(Method::DELETE, &tunnel_uri(account_id, tunnel_id), None)
            .await?;

        let _: DiscardedDetailResponse = decode(&res)?;
        Ok(())
    }

    /// Remove inactive connections from a tunnel
    ///
    /// Same response handling as [`delete`](Self::delete).
    pub async fn cleanup_connections(&self, account_id: &str, tunnel_id: &str) -> Result<()> {
        let uri = format!("{}/connections", tunnel_uri(account_id, tunnel_id));

        tracing::debug!(account_id, tunnel_id, "Cleaning up tunnel connections");
        let res = self.transport.request(Method::DELETE, &uri, None).await?;

        let _: DiscardedDetailResponse = decode(&res)?;
        Ok(())
    }
}

fn tunnels_uri(account_id: &str) -> String {
    format!("/accounts/{}/tunnels", account_id)
}

fn tunnel_uri(account_id: &str, tunnel_id: &str) -> String {
    format!("/accounts/{}/tunnels/{}", account_id, tunnel_id)
}

/// Decode an envelope; a bare `null` body is the empty envelope
fn decode<R: DeserializeOwned + Default>(body: &[u8]) -> Result<R> {
    serde_json::from_slice::<Option<R>>(body)
        .map(Option::unwrap_or_default)
        .map_err(Error::Decode)
}
