mod common;

use common::{quiet_logger, test_config_at};
use knative_deploy::managers::knative::client::GraphQlClient;
use knative_deploy::managers::knative::ServiceApi;
use serde_json::{json, Value};
use std::collections::HashMap;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

struct CapturedRequest {
    request_line: String,
    headers: HashMap<String, String>,
    body: Value,
}

fn find_header_end(buffer: &[u8]) -> Option<usize> {
    buffer.windows(4).position(|w| w == b"\r\n\r\n")
}

/// Answers each incoming connection with the next canned JSON body and
/// hands back what was received.
async fn serve(responses: Vec<Value>) -> (String, JoinHandle<Vec<CapturedRequest>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    let handle = tokio::spawn(async move {
        let mut captured = Vec::new();
        for response in responses {
            let (mut socket, _) = listener.accept().await.expect("accept");
            let mut buffer = Vec::new();
            let mut chunk = [0u8; 4096];
            let header_end = loop {
                let read = socket.read(&mut chunk).await.expect("read");
                assert!(read > 0, "connection closed before headers");
                buffer.extend_from_slice(&chunk[..read]);
                if let Some(end) = find_header_end(&buffer) {
                    break end;
                }
            };

            let head = String::from_utf8_lossy(&buffer[..header_end]).to_string();
            let mut lines = head.split("\r\n");
            let request_line = lines.next().unwrap_or_default().to_string();
            let headers: HashMap<String, String> = lines
                .filter_map(|line| line.split_once(':'))
                .map(|(k, v)| (k.trim().to_lowercase(), v.trim().to_string()))
                .collect();
            let length: usize = headers
                .get("content-length")
                .and_then(|v| v.parse().ok())
                .unwrap_or(0);
            let body_start = header_end + 4;
            while buffer.len() < body_start + length {
                let read = socket.read(&mut chunk).await.expect("read body");
                assert!(read > 0, "connection closed before body");
                buffer.extend_from_slice(&chunk[..read]);
            }
            let body: Value = serde_json::from_slice(&buffer[body_start..body_start + length])
                .expect("json body");

            let payload = response.to_string();
            let reply = format!(
                "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                payload.len(),
                payload
            );
            socket.write_all(reply.as_bytes()).await.expect("write");
            socket.shutdown().await.ok();

            captured.push(CapturedRequest {
                request_line,
                headers,
                body,
            });
        }
        captured
    });
    (format!("http://{}/graphql", addr), handle)
}

#[tokio::test]
async fn fetch_sends_auth_tenant_and_request_id() {
    let (url, server) = serve(vec![json!({
        "data": { "knativeServiceByCluster": { "__typename": "KnativeService", "name": "svc-a" } }
    })])
    .await;
    let config = test_config_at(&url, Some("apps"));
    let client = GraphQlClient::new(quiet_logger(), &config, "req-0001").expect("client");

    let record = client
        .fetch("test-cluster", "svc-a", Some("apps"))
        .await
        .expect("fetch");
    assert_eq!(record.and_then(|r| r.get("name").cloned()), Some(json!("svc-a")));

    let captured = server.await.expect("server task");
    assert_eq!(captured.len(), 1);
    let request = &captured[0];
    assert_eq!(request.request_line, "POST /graphql HTTP/1.1");
    assert_eq!(
        request.headers.get("authorization").map(String::as_str),
        Some("Bearer test-token")
    );
    assert_eq!(
        request.headers.get("x-tenant").map(String::as_str),
        Some("test-tenant")
    );
    assert_eq!(
        request.headers.get("x-request-id").map(String::as_str),
        Some("req-0001")
    );
    assert_eq!(request.body["operationName"], json!("KnativeServiceByCluster"));
    assert_eq!(
        request.body["variables"],
        json!({ "clusterId": "test-cluster", "name": "svc-a", "namespace": "apps" })
    );
    assert!(request.body["query"]
        .as_str()
        .unwrap_or_default()
        .contains("knativeServiceByCluster("));
}

#[tokio::test]
async fn create_posts_input_and_reads_status() {
    let input = json!({ "name": "svc-a", "namespace": "apps" });
    let (url, server) = serve(vec![json!({
        "data": { "createKnativeService": {
            "name": "svc-a",
            "status": { "url": "https://svc-a.example", "latestReadyRevisionName": "svc-a-00001" }
        } }
    })])
    .await;
    let config = test_config_at(&url, None);
    let client = GraphQlClient::new(quiet_logger(), &config, "req-0002").expect("client");

    let result = client.create("test-cluster", &input).await.expect("create");
    assert_eq!(result.address, "https://svc-a.example");
    assert_eq!(result.revision, "svc-a-00001");

    let captured = server.await.expect("server task");
    let request = &captured[0];
    assert_eq!(request.body["operationName"], json!("CreateKnativeService"));
    assert_eq!(
        request.body["variables"],
        json!({ "clusterId": "test-cluster", "input": input })
    );
}

#[tokio::test]
async fn empty_fetch_record_is_absent() {
    let (url, server) = serve(vec![json!({ "data": { "knativeServiceByCluster": {} } })]).await;
    let config = test_config_at(&url, None);
    let client = GraphQlClient::new(quiet_logger(), &config, "req-0003").expect("client");

    let record = client.fetch("test-cluster", "svc-a", None).await.expect("fetch");
    assert!(record.is_none());
    server.await.expect("server task");
}
