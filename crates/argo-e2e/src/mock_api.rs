//! Mock API server for E2E tests
//!
//! Serves every request under [`API_PREFIX`] with a configurable status and
//! body, recording what it received so tests can assert on the exact wire
//! request the client produced.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use parking_lot::RwLock;
use tokio::net::TcpListener;

/// Path prefix the mock serves the API under
pub const API_PREFIX: &str = "/client/v4";

/// A request received by the mock API
#[derive(Clone, Debug)]
pub struct RecordedRequest {
    pub method: String,
    /// Path relative to [`API_PREFIX`]
    pub path: String,
    /// Header names are lowercase
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl RecordedRequest {
    /// First value of a header (name is case-insensitive)
    pub fn header(&self, name: &str) -> Option<&str> {
        let name = name.to_ascii_lowercase();
        self.headers
            .iter()
            .find(|(k, _)| *k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn body_str(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

#[derive(Clone)]
struct Reply {
    status: StatusCode,
    body: Vec<u8>,
    delay: Option<Duration>,
}

/// Mock of the tunnel API listening on an ephemeral port
pub struct MockApiServer {
    addr: SocketAddr,
    requests: Arc<RwLock<Vec<RecordedRequest>>>,
    reply: Arc<RwLock<Reply>>,
}

impl MockApiServer {
    /// Start the mock, answering `{"result":null,"success":true}` until configured
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock API");
        let addr = listener.local_addr().unwrap();

        let requests: Arc<RwLock<Vec<RecordedRequest>>> = Arc::new(RwLock::new(Vec::new()));
        let reply = Arc::new(RwLock::new(Reply {
            status: StatusCode::OK,
            body: br#"{"result":null,"success":true,"errors":[],"messages":[]}"#.to_vec(),
            delay: None,
        }));

        let requests_clone = requests.clone();
        let reply_clone = reply.clone();

        tokio::spawn(async move {
            loop {
                let (stream, _) = match listener.accept().await {
                    Ok(conn) => conn,
                    Err(_) => break,
                };

                let requests = requests_clone.clone();
                let reply = reply_clone.clone();

                tokio::spawn(async move {
                    let service = service_fn(move |req: Request<Incoming>| {
                        let requests = requests.clone();
                        let reply = reply.clone();
                        async move {
                            let method = req.method().to_string();
                            let path = req
                                .uri()
                                .path()
                                .strip_prefix(API_PREFIX)
                                .unwrap_or(req.uri().path())
                                .to_string();
                            let headers = req
                                .headers()
                                .iter()
                                .map(|(k, v)| {
                                    (k.to_string(), v.to_str().unwrap_or("").to_string())
                                })
                                .collect();
                            let body = req
                                .into_body()
                                .collect()
                                .await
                                .map(|b| b.to_bytes().to_vec())
                                .unwrap_or_default();

                            tracing::debug!("MockApiServer: {} {}", method, path);
                            requests.write().push(RecordedRequest {
                                method,
                                path,
                                headers,
                                body,
                            });

                            let reply = reply.read().clone();
                            if let Some(delay) = reply.delay {
                                tokio::time::sleep(delay).await;
                            }

                            Ok::<_, Infallible>(
                                Response::builder()
                                    .status(reply.status)
                                    .header("content-type", "application/json")
                                    .body(Full::new(Bytes::from(reply.body)))
                                    .unwrap(),
                            )
                        }
                    });

                    let _ = http1::Builder::new()
                        .serve_connection(TokioIo::new(stream), service)
                        .await;
                });
            }
        });

        Self {
            addr,
            requests,
            reply,
        }
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Base URL to configure the transport with
    pub fn base_url(&self) -> String {
        format!("http://{}{}", self.addr, API_PREFIX)
    }

    /// Answer subsequent requests with this status and body
    pub fn respond(&self, status: StatusCode, body: impl Into<Vec<u8>>) {
        let mut reply = self.reply.write();
        reply.status = status;
        reply.body = body.into();
    }

    /// Delay every response (for timeout and cancellation tests)
    pub fn set_delay(&self, delay: Duration) {
        self.reply.write().delay = Some(delay);
    }

    pub fn get_requests(&self) -> Vec<RecordedRequest> {
        self.requests.read().clone()
    }

    pub fn last_request(&self) -> Option<RecordedRequest> {
        self.requests.read().last().cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_records_path_relative_to_prefix() {
        let server = MockApiServer::start().await;
        server.respond(StatusCode::CREATED, r#"{"ok":true}"#);

        let resp = reqwest::Client::new()
            .post(format!("{}/accounts/a/tunnels", server.base_url()))
            .header("X-Test", "yes")
            .body("payload")
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 201);
        assert_eq!(resp.text().await.unwrap(), r#"{"ok":true}"#);

        let req = server.last_request().unwrap();
        assert_eq!(req.method, "POST");
        assert_eq!(req.path, "/accounts/a/tunnels");
        assert_eq!(req.header("x-test"), Some("yes"));
        assert_eq!(req.body_str(), "payload");
    }
}
