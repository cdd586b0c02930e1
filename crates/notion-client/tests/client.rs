use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use notion_blocks::{divider, heading, paragraph, Block, DEFAULT_COLOR};
use notion_client::{
    ClientConfig, ClientError, NotionClient, PageDraft, Parent, RetryPolicy, DEFAULT_API_VERSION,
};
use reqwest::StatusCode;
use serde_json::{json, Value};
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::{TcpListener, TcpStream},
};

#[derive(Debug, Clone)]
struct Captured {
    request_line: String,
    headers: Vec<(String, String)>,
    body: Value,
}

impl Captured {
    fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

type Requests = Arc<Mutex<Vec<Captured>>>;

/// Serves one canned response per incoming connection, in order.
async fn spawn_server(responses: Vec<(u16, Value)>) -> (String, Requests) {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    let requests: Requests = Arc::new(Mutex::new(Vec::new()));
    let sink = requests.clone();

    tokio::spawn(async move {
        for (status, body) in responses {
            let (mut stream, _) = listener.accept().await.expect("accept");
            let captured = read_request(&mut stream).await;
            sink.lock().expect("lock").push(captured);

            let payload = body.to_string();
            let response = format!(
                "HTTP/1.1 {status} Canned\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{payload}",
                payload.len()
            );
            stream
                .write_all(response.as_bytes())
                .await
                .expect("write response");
            let _ = stream.shutdown().await;
        }
    });

    (format!("http://{addr}/v1"), requests)
}

async fn read_request(stream: &mut TcpStream) -> Captured {
    let mut buffer = Vec::new();
    let mut chunk = [0u8; 4096];
    let header_end = loop {
        let read = stream.read(&mut chunk).await.expect("read request");
        assert!(read > 0, "connection closed before headers");
        buffer.extend_from_slice(&chunk[..read]);
        if let Some(pos) = buffer.windows(4).position(|window| window == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buffer[..header_end]).to_string();
    let mut lines = head.split("\r\n");
    let request_line = lines.next().unwrap_or_default().to_string();
    let headers: Vec<(String, String)> = lines
        .filter_map(|line| line.split_once(':'))
        .map(|(key, value)| (key.trim().to_ascii_lowercase(), value.trim().to_string()))
        .collect();
    let length = headers
        .iter()
        .find(|(key, _)| key == "content-length")
        .and_then(|(_, value)| value.parse::<usize>().ok())
        .unwrap_or(0);

    while buffer.len() < header_end + length {
        let read = stream.read(&mut chunk).await.expect("read body");
        assert!(read > 0, "connection closed before body");
        buffer.extend_from_slice(&chunk[..read]);
    }
    let body =
        serde_json::from_slice(&buffer[header_end..header_end + length]).unwrap_or(Value::Null);

    Captured {
        request_line,
        headers,
        body,
    }
}

fn client(base_url: String, max_attempts: u32) -> NotionClient {
    NotionClient::with_config(ClientConfig {
        base_url,
        timeout: Duration::from_secs(5),
        use_env_proxy: false,
        retry: RetryPolicy {
            max_attempts,
            base_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(5),
        },
        ..ClientConfig::new("secret-token")
    })
    .expect("client builds")
}

fn ids(count: usize, prefix: &str) -> Value {
    let results: Vec<Value> = (0..count)
        .map(|index| json!({"object": "block", "id": format!("{prefix}-{index}")}))
        .collect();
    json!({"object": "list", "results": results})
}

fn paragraphs(count: usize) -> Vec<Block> {
    (0..count)
        .map(|index| paragraph(format!("line {index}"), false, false, DEFAULT_COLOR))
        .collect()
}

#[tokio::test]
async fn create_page_posts_draft_with_auth_headers() {
    let (base_url, requests) = spawn_server(vec![(
        200,
        json!({"object": "page", "id": "page-1", "url": "https://www.notion.so/page-1"}),
    )])
    .await;
    let client = client(base_url, 3);

    let draft = PageDraft::new("Balance", Parent::PageId("parent-1".to_string()))
        .with_children(vec![heading("Balance", 1, false).expect("heading"), divider()]);
    let page = client.create_page(&draft).await.expect("page created");

    assert_eq!(page.id, "page-1");
    assert_eq!(page.url.as_deref(), Some("https://www.notion.so/page-1"));

    let requests = requests.lock().expect("lock").clone();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert_eq!(request.request_line, "POST /v1/pages HTTP/1.1");
    assert_eq!(request.header("authorization"), Some("Bearer secret-token"));
    assert_eq!(request.header("notion-version"), Some(DEFAULT_API_VERSION));
    assert_eq!(
        request.body,
        serde_json::to_value(draft.request_body()).expect("serialize draft")
    );
    assert_eq!(request.body["parent"], json!({"page_id": "parent-1"}));
}

#[tokio::test]
async fn server_errors_are_retried() {
    let (base_url, requests) = spawn_server(vec![
        (503, json!({"object": "error", "code": "service_unavailable", "message": "busy"})),
        (200, json!({"object": "page", "id": "page-2"})),
    ])
    .await;
    let client = client(base_url, 3);

    let draft = PageDraft::new("Retry", Parent::Workspace);
    let page = client.create_page(&draft).await.expect("page created");

    assert_eq!(page.id, "page-2");
    assert!(page.url.is_none());
    assert_eq!(requests.lock().expect("lock").len(), 2);
}

#[tokio::test]
async fn client_errors_are_not_retried() {
    let (base_url, requests) = spawn_server(vec![(
        400,
        json!({
            "object": "error",
            "status": 400,
            "code": "validation_error",
            "message": "body failed validation"
        }),
    )])
    .await;
    let client = client(base_url, 3);

    let error = client
        .create_page(&PageDraft::new("Bad", Parent::PageId("p".to_string())))
        .await
        .expect_err("validation error");

    match error {
        ClientError::Status {
            status,
            code,
            message,
        } => {
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(code.as_deref(), Some("validation_error"));
            assert_eq!(message, "body failed validation");
        }
        other => panic!("unexpected error {other:?}"),
    }
    assert_eq!(requests.lock().expect("lock").len(), 1);
}

#[tokio::test]
async fn retries_stop_after_max_attempts() {
    let failure = json!({"object": "error", "code": "internal_server_error", "message": "boom"});
    let (base_url, requests) = spawn_server(vec![
        (502, failure.clone()),
        (502, failure.clone()),
        (502, failure),
    ])
    .await;
    let client = client(base_url, 3);

    let error = client
        .create_page(&PageDraft::new("Down", Parent::Workspace))
        .await
        .expect_err("gives up");

    assert!(matches!(
        error,
        ClientError::Status { status, .. } if status == StatusCode::BAD_GATEWAY
    ));
    assert_eq!(requests.lock().expect("lock").len(), 3);
}

#[tokio::test]
async fn append_blocks_batches_large_payloads() {
    let (base_url, requests) =
        spawn_server(vec![(200, ids(100, "a")), (200, ids(50, "b"))]).await;
    let client = client(base_url, 1);

    let created = client
        .append_blocks("page-9", &paragraphs(150))
        .await
        .expect("blocks appended");

    assert_eq!(created.len(), 150);
    assert_eq!(created[0], "a-0");
    assert_eq!(created[149], "b-49");

    let requests = requests.lock().expect("lock").clone();
    assert_eq!(requests.len(), 2);
    assert_eq!(
        requests[0].request_line,
        "PATCH /v1/blocks/page-9/children HTTP/1.1"
    );
    assert_eq!(requests[0].body["children"].as_array().map(Vec::len), Some(100));
    assert_eq!(requests[1].body["children"].as_array().map(Vec::len), Some(50));
    assert_eq!(
        requests[1].body["children"][0]["paragraph"]["rich_text"][0]["text"]["content"],
        "line 100"
    );
}

#[tokio::test]
async fn oversized_page_is_created_then_appended() {
    let (base_url, requests) = spawn_server(vec![
        (200, json!({"object": "page", "id": "page-big"})),
        (200, ids(20, "c")),
    ])
    .await;
    let client = client(base_url, 1);

    let draft =
        PageDraft::new("Long", Parent::PageId("root".to_string())).with_children(paragraphs(120));
    let page = client.create_page(&draft).await.expect("page created");
    assert_eq!(page.id, "page-big");

    let requests = requests.lock().expect("lock").clone();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].body["children"].as_array().map(Vec::len), Some(100));
    assert_eq!(
        requests[1].request_line,
        "PATCH /v1/blocks/page-big/children HTTP/1.1"
    );
    assert_eq!(requests[1].body["children"].as_array().map(Vec::len), Some(20));
}

#[tokio::test]
async fn failed_follow_up_append_still_reports_the_page() {
    let (base_url, requests) = spawn_server(vec![
        (
            200,
            json!({"object": "page", "id": "page-big", "url": "https://notion.so/page-big"}),
        ),
        (
            400,
            json!({
                "object": "error",
                "status": 400,
                "code": "validation_error",
                "message": "bad"
            }),
        ),
    ])
    .await;
    let client = client(base_url, 3);

    let draft =
        PageDraft::new("Long", Parent::PageId("root".to_string())).with_children(paragraphs(120));
    let error = client.create_page(&draft).await.expect_err("append fails");

    match error {
        ClientError::PartialCreate { page, source } => {
            assert_eq!(page.id, "page-big");
            assert_eq!(page.url.as_deref(), Some("https://notion.so/page-big"));
            assert!(matches!(
                *source,
                ClientError::Status { status, .. } if status == StatusCode::BAD_REQUEST
            ));
        }
        other => panic!("unexpected error {other:?}"),
    }
    assert!(!ClientError::PartialCreate {
        page: notion_client::CreatedPage {
            id: "p".to_string(),
            url: None,
        },
        source: Box::new(ClientError::Http("reset".to_string())),
    }
    .is_retryable());
    assert_eq!(requests.lock().expect("lock").len(), 2);
}
