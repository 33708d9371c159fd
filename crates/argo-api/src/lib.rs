//! Typed client for the Argo Tunnel API
//!
//! The crate maps tunnel lifecycle calls onto the account-scoped REST surface:
//!
//! | Operation                           | Method   | Path                                          |
//! |-------------------------------------|----------|-----------------------------------------------|
//! | [`TunnelClient::list`]              | `GET`    | `/accounts/{account}/tunnels`                 |
//! | [`TunnelClient::get`]               | `GET`    | `/accounts/{account}/tunnels/{id}`            |
//! | [`TunnelClient::create`]            | `POST`   | `/accounts/{account}/tunnels`                 |
//! | [`TunnelClient::delete`]            | `DELETE` | `/accounts/{account}/tunnels/{id}`            |
//! | [`TunnelClient::cleanup_connections`] | `DELETE` | `/accounts/{account}/tunnels/{id}/connections` |
//!
//! HTTP itself is delegated to a [`Transport`]. [`HttpTransport`] is the
//! `reqwest`-backed implementation used against the real API.
//!
//! # Example
//!
//! ```rust,ignore
//! use argo_api::{Credentials, HttpTransport, TunnelClient};
//!
//! let transport = HttpTransport::new(Credentials::Token(token))?;
//! let client = TunnelClient::new(transport);
//!
//! for tunnel in client.list("023e105f4ecef8ad9ca31a8372d0c353").await? {
//!     println!("{} {}", tunnel.id, tunnel.name);
//! }
//! ```
//!
//! Every call is a single round trip. Dropping the returned future cancels the
//! in-flight request; wrap it in `tokio::time::timeout` to bound it.

mod error;
mod http;
mod response;
mod transport;
mod tunnel;

pub use error::{Error, Result};
pub use http::{Credentials, HttpTransport, HttpTransportBuilder, DEFAULT_BASE_URL};
pub use response::{Response, ResponseInfo, ResultInfo};
pub use transport::{Method, StatusCode, Transport, TransportError};
pub use tunnel::{Connection, Tunnel, TunnelClient, TunnelDetailResponse, TunnelsDetailResponse};
