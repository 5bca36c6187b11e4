//! HttpGateway against a local stub server.

use std::sync::{Arc, Mutex};

use fuschia_config::GatewaySettings;
use fuschia_gateway::{ExecutionGateway, GatewayError, GatewayStatus, HttpGateway};
use fuschia_test_plan::ExecutionRequest;
use serde_json::json;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// A request as seen by the stub server.
#[derive(Debug, Clone)]
struct Recorded {
  method: String,
  path: String,
  authorization: Option<String>,
  body: String,
}

struct StubServer {
  base_url: String,
  requests: Arc<Mutex<Vec<Recorded>>>,
}

impl StubServer {
  /// Answer each incoming connection with the next canned `(status, body)`.
  async fn start(responses: Vec<(u16, &'static str)>) -> Self {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());
    let requests = Arc::new(Mutex::new(Vec::new()));

    let recorded = requests.clone();
    tokio::spawn(async move {
      for (status, body) in responses {
        let (mut stream, _) = listener.accept().await.unwrap();
        let request = read_request(&mut stream).await;
        recorded.lock().unwrap().push(request);

        let response = format!(
          "HTTP/1.1 {} Stub\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
          status,
          body.len(),
          body
        );
        stream.write_all(response.as_bytes()).await.unwrap();
        let _ = stream.shutdown().await;
      }
    });

    Self { base_url, requests }
  }

  fn gateway(&self, api_token: Option<&str>) -> HttpGateway {
    let settings = GatewaySettings {
      base_url: self.base_url.clone(),
      api_token: api_token.map(str::to_string),
      ..GatewaySettings::default()
    };
    HttpGateway::new(&settings).unwrap()
  }

  fn requests(&self) -> Vec<Recorded> {
    self.requests.lock().unwrap().clone()
  }
}

async fn read_request(stream: &mut TcpStream) -> Recorded {
  let mut buf = Vec::new();
  let mut chunk = [0u8; 1024];

  let header_end = loop {
    let n = stream.read(&mut chunk).await.unwrap();
    assert!(n > 0, "connection closed before the request headers ended");
    buf.extend_from_slice(&chunk[..n]);
    if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
      break pos + 4;
    }
  };

  let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
  let mut lines = head.split("\r\n");
  let mut request_line = lines.next().unwrap_or_default().split(' ');
  let method = request_line.next().unwrap_or_default().to_string();
  let path = request_line.next().unwrap_or_default().to_string();

  let mut authorization = None;
  let mut content_length = 0;
  for line in lines {
    let Some((name, value)) = line.split_once(':') else {
      continue;
    };
    match name.trim().to_ascii_lowercase().as_str() {
      "authorization" => authorization = Some(value.trim().to_string()),
      "content-length" => content_length = value.trim().parse().unwrap(),
      _ => {}
    }
  }

  while buf.len() < header_end + content_length {
    let n = stream.read(&mut chunk).await.unwrap();
    assert!(n > 0, "connection closed before the request body ended");
    buf.extend_from_slice(&chunk[..n]);
  }
  let body = String::from_utf8_lossy(&buf[header_end..header_end + content_length]).to_string();

  Recorded {
    method,
    path,
    authorization,
    body,
  }
}

fn create_request() -> ExecutionRequest {
  serde_json::from_value(json!({
    "actions": [{ "id": "A", "kind": "set", "name": "Shape", "inputs": { "v": 1 } }],
    "edges": [{ "from": "$source", "to": "A" }]
  }))
  .unwrap()
}

#[tokio::test]
async fn test_submit_posts_request_with_bearer_token() {
  let server = StubServer::start(vec![(200, r#"{"sessionId":"gw-42"}"#)]).await;
  let gateway = server.gateway(Some("secret"));

  let response = gateway.submit(&create_request()).await.unwrap();

  assert_eq!(response.session_id, "gw-42");
  let requests = server.requests();
  assert_eq!(requests.len(), 1);
  assert_eq!(requests[0].method, "POST");
  assert_eq!(requests[0].path, "/executions");
  assert_eq!(requests[0].authorization.as_deref(), Some("Bearer secret"));

  let body: serde_json::Value = serde_json::from_str(&requests[0].body).unwrap();
  assert_eq!(body["actions"][0]["id"], "A");
  assert_eq!(body["edges"][0]["from"], "$source");
  assert!(body.get("state").is_none());
}

#[tokio::test]
async fn test_poll_gets_session_status_without_token() {
  let server = StubServer::start(vec![(
    200,
    r#"{"status":"succeeded","data":{"A":{"v":1}}}"#,
  )])
  .await;
  let gateway = server.gateway(None);

  let response = gateway.poll_status("gw-42").await.unwrap();

  assert_eq!(response.status, GatewayStatus::Succeeded);
  assert_eq!(response.data, Some(json!({ "A": { "v": 1 } })));
  let requests = server.requests();
  assert_eq!(requests[0].method, "GET");
  assert_eq!(requests[0].path, "/executions/gw-42");
  assert!(requests[0].authorization.is_none());
}

#[tokio::test]
async fn test_cancel_posts_to_session_cancel_path() {
  let server = StubServer::start(vec![(200, r#"{"ack":true}"#)]).await;
  let gateway = server.gateway(Some("secret"));

  let response = gateway.cancel("gw/42").await.unwrap();

  assert!(response.ack);
  let requests = server.requests();
  assert_eq!(requests[0].method, "POST");
  assert_eq!(requests[0].path, "/executions/gw%2F42/cancel");
  assert_eq!(requests[0].authorization.as_deref(), Some("Bearer secret"));
}

#[tokio::test]
async fn test_non_success_status_keeps_body() {
  let server = StubServer::start(vec![(503, "overloaded")]).await;
  let gateway = server.gateway(None);

  let err = gateway.submit(&create_request()).await.unwrap_err();

  assert!(matches!(
    err,
    GatewayError::Status { status: 503, ref body } if body == "overloaded"
  ));
}

#[tokio::test]
async fn test_success_with_unexpected_body_is_invalid_response() {
  let server = StubServer::start(vec![(200, r#"{"status":"exploded"}"#), (200, "not json")]).await;
  let gateway = server.gateway(None);

  let err = gateway.poll_status("gw-1").await.unwrap_err();
  assert!(matches!(err, GatewayError::InvalidResponse(_)));

  let err = gateway.cancel("gw-1").await.unwrap_err();
  assert!(matches!(err, GatewayError::InvalidResponse(_)));
}

#[tokio::test]
async fn test_unreachable_gateway_is_transport_error() {
  let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
  let base_url = format!("http://{}", listener.local_addr().unwrap());
  drop(listener);

  let settings = GatewaySettings {
    base_url,
    ..GatewaySettings::default()
  };
  let gateway = HttpGateway::new(&settings).unwrap();

  let err = gateway.poll_status("gw-1").await.unwrap_err();
  assert!(matches!(err, GatewayError::Transport(_)));
}
