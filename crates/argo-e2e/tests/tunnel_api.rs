//! Tunnel API end-to-end tests over real HTTP

use std::time::Duration;

use argo_api::{Credentials, Error, HttpTransport, TransportError, TunnelClient};
use argo_e2e::{client_for, client_with_credentials, MockApiServer, TEST_TOKEN};
use hyper::StatusCode;

/// Initialize tracing for tests
fn init_test() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("argo_api=debug,argo_e2e=debug")
        .with_test_writer()
        .try_init();
}

#[tokio::test]
async fn test_create_tunnel_request() {
    init_test();

    let server = MockApiServer::start().await;
    server.respond(
        StatusCode::OK,
        r#"{"result":{"id":"t1","name":"mytunnel","created_at":"2021-03-04T05:06:07Z"},"success":true,"errors":[],"messages":[]}"#,
    );

    let client = client_for(&server);
    let tunnel = client
        .create("acct1", "mytunnel", "s3cr3t")
        .await
        .expect("create failed");

    assert_eq!(tunnel.id, "t1");
    assert_eq!(tunnel.name, "mytunnel");
    assert!(tunnel.created_at.is_some());
    assert!(tunnel.connections.is_empty());

    let req = server.last_request().expect("no request recorded");
    assert_eq!(req.method, "POST");
    assert_eq!(req.path, "/accounts/acct1/tunnels");
    assert_eq!(req.body_str(), r#"{"name":"mytunnel","tunnel_secret":"s3cr3t"}"#);
    assert_eq!(req.header("content-type"), Some("application/json"));
    assert_eq!(
        req.header("authorization"),
        Some(format!("Bearer {}", TEST_TOKEN).as_str())
    );
    assert!(req
        .header("user-agent")
        .is_some_and(|ua| ua.starts_with("argo-api/")));
}

#[tokio::test]
async fn test_list_tunnels() {
    init_test();

    let server = MockApiServer::start().await;
    server.respond(
        StatusCode::OK,
        r#"{
            "result": [
                {"id": "t1", "name": "blog", "connections": [
                    {"colo_name": "DFW", "uuid": "c1", "is_pending_reconnect": false}
                ]},
                {"id": "t2", "name": "api", "deleted_at": "2021-03-04T05:06:07Z"}
            ],
            "result_info": {"page": 1, "per_page": 20, "count": 2, "total_count": 2, "total_pages": 1},
            "success": true,
            "errors": [],
            "messages": []
        }"#,
    );

    let tunnels = client_for(&server).list("acct1").await.expect("list failed");

    assert_eq!(tunnels.len(), 2);
    assert_eq!(tunnels[0].id, "t1");
    assert_eq!(tunnels[0].connections[0].colo_name, "DFW");
    assert_eq!(tunnels[1].id, "t2");
    assert!(tunnels[1].is_deleted());

    let req = server.last_request().unwrap();
    assert_eq!(req.method, "GET");
    assert_eq!(req.path, "/accounts/acct1/tunnels");
    assert!(req.body.is_empty());
    assert!(req.header("content-type").is_none());
}

#[tokio::test]
async fn test_get_delete_and_cleanup_paths() {
    init_test();

    let server = MockApiServer::start().await;
    let client = client_for(&server);

    client.get("acct1", "t1").await.expect("get failed");
    client.delete("acct1", "t1").await.expect("delete failed");
    client
        .cleanup_connections("acct1", "t1")
        .await
        .expect("cleanup failed");

    let requests = server.get_requests();
    let calls: Vec<(&str, &str)> = requests
        .iter()
        .map(|r| (r.method.as_str(), r.path.as_str()))
        .collect();
    assert_eq!(
        calls,
        [
            ("GET", "/accounts/acct1/tunnels/t1"),
            ("DELETE", "/accounts/acct1/tunnels/t1"),
            ("DELETE", "/accounts/acct1/tunnels/t1/connections"),
        ]
    );
}

#[tokio::test]
async fn test_delete_ignores_unsuccessful_envelope() {
    init_test();

    let server = MockApiServer::start().await;
    server.respond(
        StatusCode::OK,
        r#"{"result":null,"success":false,"errors":[{"code":1022,"message":"tunnel has active connections"}],"messages":[]}"#,
    );

    let client = client_for(&server);
    client
        .delete("acct1", "t1")
        .await
        .expect("delete should not inspect the envelope");
    client
        .cleanup_connections("acct1", "t1")
        .await
        .expect("cleanup should not inspect the envelope");
}

#[tokio::test]
async fn test_error_status_is_request_error() {
    init_test();

    let server = MockApiServer::start().await;
    server.respond(
        StatusCode::FORBIDDEN,
        r#"{"result":null,"success":false,"errors":[{"code":10000,"message":"Authentication error"}],"messages":[]}"#,
    );

    let err = client_for(&server)
        .list("acct1")
        .await
        .expect_err("403 should fail");

    assert!(err.is_request());
    assert_eq!(err.status(), Some(StatusCode::FORBIDDEN));
    match &err {
        Error::Request(TransportError::Status { message, .. }) => {
            assert_eq!(message, "Authentication error (10000)");
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert!(err.to_string().starts_with("request failed"));
}

#[tokio::test]
async fn test_malformed_body_is_decode_error() {
    init_test();

    let server = MockApiServer::start().await;
    server.respond(StatusCode::OK, "<html>gateway</html>");

    let client = client_for(&server);
    assert!(client.list("acct1").await.unwrap_err().is_decode());
    assert!(client.get("acct1", "t1").await.unwrap_err().is_decode());
    assert!(client
        .create("acct1", "n", "s")
        .await
        .unwrap_err()
        .is_decode());
    assert!(client.delete("acct1", "t1").await.unwrap_err().is_decode());
    assert!(client
        .cleanup_connections("acct1", "t1")
        .await
        .unwrap_err()
        .is_decode());
}

#[tokio::test]
async fn test_connection_refused_is_request_error() {
    init_test();

    // Bind and drop to get a port nothing listens on
    let addr = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };
    let transport = HttpTransport::builder(Credentials::Token(TEST_TOKEN.into()))
        .base_url(format!("http://{}/client/v4", addr))
        .build()
        .unwrap();

    let err = TunnelClient::new(transport)
        .list("acct1")
        .await
        .expect_err("nothing is listening");
    assert!(err.is_request());
    assert!(matches!(err, Error::Request(TransportError::Http(_))));
}

#[tokio::test]
async fn test_key_credentials_headers() {
    init_test();

    let server = MockApiServer::start().await;
    let client = client_with_credentials(
        &server,
        Credentials::Key {
            email: "ops@example.com".into(),
            key: "global-key".into(),
        },
    );

    client.list("acct1").await.expect("list failed");

    let req = server.last_request().unwrap();
    assert_eq!(req.header("x-auth-email"), Some("ops@example.com"));
    assert_eq!(req.header("x-auth-key"), Some("global-key"));
    assert!(req.header("authorization").is_none());
}

#[tokio::test]
async fn test_transport_timeout_is_request_error() {
    init_test();

    let server = MockApiServer::start().await;
    server.set_delay(Duration::from_secs(5));

    let transport = HttpTransport::builder(Credentials::Token(TEST_TOKEN.into()))
        .base_url(server.base_url())
        .timeout(Duration::from_millis(100))
        .build()
        .unwrap();

    let err = TunnelClient::new(transport)
        .get("acct1", "t1")
        .await
        .expect_err("request should time out");
    assert!(err.is_request());
}

#[tokio::test]
async fn test_caller_cancellation_drops_request() {
    init_test();

    let server = MockApiServer::start().await;
    server.set_delay(Duration::from_secs(5));

    let client = client_for(&server);
    let result = tokio::time::timeout(Duration::from_millis(100), client.list("acct1")).await;
    assert!(result.is_err(), "caller timeout should win");

    // The request reached the server before it was abandoned
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(server.get_requests().len(), 1);
}
