//! End-to-end tests for the completion request path, against a canned local
//! HTTP backend.
//!
//! The cooldown behavior is intrinsic to error surfacing, so the error-path
//! tests here are wall-clock tests and deliberately slow (the overload kinds
//! pause 25-35 seconds before the error crosses the API boundary).

use std::time::{Duration, Instant};
use synthia::{Client, Completion, ErrorKind};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

const SUCCESS_BODY: &str = r#"{"id": "cmpl-1", "object": "chat.completion", "choices": [{"index": 0, "message": {"role": "assistant", "content": "4"}, "finish_reason": "stop"}], "usage": {"prompt_tokens": 350, "completion_tokens": 1, "total_tokens": 351}}"#;

const CONTEXT_LENGTH_BODY: &str = r#"{"error": {"message": "This model's maximum context length is 16384 tokens. However, you requested 20000 tokens.", "type": "invalid_request_error"}}"#;

fn client_for(base_url: String) -> Client {
    Client::builder()
        .api_key("EMPTY")
        .base_url(base_url)
        .timeout_secs(10)
        .build()
        .unwrap()
}

/// Serve exactly one request with a canned response; returns the base URL.
async fn spawn_backend(status: &'static str, body: &'static str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        read_request(&mut stream).await;

        let response = format!(
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        stream.write_all(response.as_bytes()).await.unwrap();
        stream.flush().await.unwrap();
    });

    format!("http://{addr}/v1")
}

/// Drain the request (headers plus content-length body) before responding.
async fn read_request(stream: &mut TcpStream) {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    loop {
        let n = stream.read(&mut chunk).await.unwrap();
        if n == 0 {
            return;
        }
        buf.extend_from_slice(&chunk[..n]);

        if let Some(header_end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            let headers = String::from_utf8_lossy(&buf[..header_end]);
            let content_length = headers
                .lines()
                .find_map(|line| {
                    let (name, value) = line.split_once(':')?;
                    if name.eq_ignore_ascii_case("content-length") {
                        value.trim().parse::<usize>().ok()
                    } else {
                        None
                    }
                })
                .unwrap_or(0);
            if buf.len() >= header_end + 4 + content_length {
                return;
            }
        }
    }
}

#[tokio::test]
async fn test_returns_first_choice_content_verbatim() {
    let base_url = spawn_backend("200 OK", SUCCESS_BODY).await;
    let model = client_for(base_url).completion_model("test-model");

    let start = Instant::now();
    let completion = model.request("What is 2+2?").await.unwrap();

    assert_eq!(completion, Completion::Text("4".to_string()));
    assert!(start.elapsed() < Duration::from_secs(5), "no delay on success");
}

#[tokio::test]
async fn test_context_length_rejection_is_data_not_error() {
    let base_url = spawn_backend("400 Bad Request", CONTEXT_LENGTH_BODY).await;
    let model = client_for(base_url).completion_model("test-model");

    let start = Instant::now();
    let completion = model.request("What is 2+2?").await.unwrap();

    assert!(completion.is_truncated());
    assert_eq!(
        completion,
        Completion::Truncated {
            end_reason: "max length exceeded"
        }
    );
    assert!(start.elapsed() < Duration::from_secs(5), "no cooldown on truncation");
}

#[tokio::test]
async fn test_generic_api_error_pauses_one_second() {
    let base_url = spawn_backend(
        "500 Internal Server Error",
        r#"{"error": {"message": "internal server error while generating"}}"#,
    )
    .await;
    let model = client_for(base_url).completion_model("test-model");

    let start = Instant::now();
    let err = model.request("What is 2+2?").await.unwrap_err();
    let elapsed = start.elapsed();

    assert_eq!(err.kind, ErrorKind::Api);
    assert_eq!(err.to_string(), "internal server error while generating");
    assert!(elapsed >= Duration::from_secs(1));
    assert!(elapsed < Duration::from_secs(5));
}

#[tokio::test]
async fn test_rate_limit_cools_down_before_surfacing() {
    let base_url = spawn_backend(
        "429 Too Many Requests",
        r#"{"error": {"message": "rate limit exceeded, slow down"}}"#,
    )
    .await;
    let model = client_for(base_url).completion_model("test-model");

    let start = Instant::now();
    let err = model.request("What is 2+2?").await.unwrap_err();
    let elapsed = start.elapsed();

    assert_eq!(err.kind, ErrorKind::RateLimited);
    assert_eq!(err.to_string(), "rate limit exceeded, slow down");
    assert!(elapsed >= Duration::from_secs(25));
    assert!(elapsed < Duration::from_secs(40));
}

#[tokio::test]
async fn test_malformed_response_carries_object_message() {
    let base_url = spawn_backend("200 OK", r#"{"message": "backend overloaded"}"#).await;
    let model = client_for(base_url).completion_model("test-model");

    let start = Instant::now();
    let err = model.request("What is 2+2?").await.unwrap_err();
    let elapsed = start.elapsed();

    assert_eq!(err.kind, ErrorKind::MalformedResponse);
    assert_eq!(err.to_string(), "backend overloaded");
    assert!(elapsed >= Duration::from_secs(25));
    assert!(elapsed < Duration::from_secs(40));
}

#[tokio::test]
async fn test_connection_failure_is_network_kind() {
    // Bind then drop so the port is very likely unoccupied.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let model = client_for(format!("http://{addr}/v1")).completion_model("test-model");

    let start = Instant::now();
    let err = model.request("What is 2+2?").await.unwrap_err();

    assert_eq!(err.kind, ErrorKind::Network);
    assert!(!err.to_string().is_empty());
    assert!(start.elapsed() >= Duration::from_secs(25));
}
