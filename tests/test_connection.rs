use std::io;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};

use ember::Error;
use ember::http::connection::{Connection, ConnectionLimits};
use ember::server::{App, ConnectionRegistry};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, DuplexStream, ReadBuf};

fn test_app() -> Arc<App> {
    let mut builder = App::builder();
    builder
        .router()
        .get("/", |_req, res| {
            res.text("Hello, World!");
            Ok(())
        })
        .get("/users/{id}", |req, res| {
            res.text(format!("user {}", req.param("id").unwrap_or_default()));
            Ok(())
        })
        .post("/echo", |req, res| {
            res.set_header("Content-Type", "application/octet-stream");
            res.set_body(req.body.clone());
            Ok(())
        })
        .get("/panic", |_req, _res| panic!("handler exploded"));
    Arc::new(builder.build())
}

struct Harness {
    client: DuplexStream,
    registry: ConnectionRegistry,
    task: tokio::task::JoinHandle<Result<(), ember::Error>>,
}

async fn start(limits: ConnectionLimits) -> Harness {
    let (client, server) = tokio::io::duplex(64 * 1024);
    let registry = ConnectionRegistry::new();
    let id = registry.register("127.0.0.1:50000").await;

    let conn = Connection::new(id, server, test_app(), registry.clone(), limits);
    let task = tokio::spawn(conn.run());

    Harness {
        client,
        registry,
        task,
    }
}

async fn exchange(raw: &[u8]) -> (String, Harness) {
    let mut h = start(ConnectionLimits::default()).await;
    h.client.write_all(raw).await.unwrap();

    let mut out = Vec::new();
    h.client.read_to_end(&mut out).await.unwrap();
    (String::from_utf8(out).unwrap(), h)
}

fn split_response(text: &str) -> (&str, &str) {
    text.split_once("\r\n\r\n").unwrap()
}

#[tokio::test]
async fn test_get_root() {
    let (text, h) = exchange(b"GET / HTTP/1.1\r\nHost: localhost\r\n\r\n").await;
    h.task.await.unwrap().unwrap();

    let (head, body) = split_response(&text);
    assert!(head.starts_with("HTTP/1.1 200 OK\r\n"));
    assert!(head.contains("Content-Length: 13"));
    assert!(head.contains("Connection: close"));
    assert_eq!(body, "Hello, World!");
}

#[tokio::test]
async fn test_path_params_reach_handler() {
    let (text, _h) = exchange(b"GET /users/42 HTTP/1.1\r\n\r\n").await;

    assert_eq!(split_response(&text).1, "user 42");
}

#[tokio::test]
async fn test_post_body_echoed() {
    let (text, _h) =
        exchange(b"POST /echo HTTP/1.1\r\nContent-Length: 5\r\n\r\nhello").await;

    let (head, body) = split_response(&text);
    assert!(head.starts_with("HTTP/1.1 200 OK"));
    assert_eq!(body, "hello");
}

#[tokio::test]
async fn test_unknown_route_gets_404_json() {
    let (text, _h) = exchange(b"GET /nope HTTP/1.1\r\n\r\n").await;

    let (head, body) = split_response(&text);
    assert!(head.starts_with("HTTP/1.1 404 Not Found"));
    assert!(head.contains("Content-Type: application/json"));
    let json: serde_json::Value = serde_json::from_str(body).unwrap();
    assert_eq!(json["error"], true);
    assert_eq!(json["code"], 404);
}

#[tokio::test]
async fn test_malformed_request_gets_400() {
    let (text, _h) = exchange(b"GARBAGE\r\n\r\n").await;

    let (head, body) = split_response(&text);
    assert!(head.starts_with("HTTP/1.1 400 Bad Request"));
    let json: serde_json::Value = serde_json::from_str(body).unwrap();
    assert_eq!(json["code"], 400);
}

#[tokio::test]
async fn test_unsupported_method_gets_400() {
    let (text, _h) = exchange(b"BREW /pot HTTP/1.1\r\n\r\n").await;

    assert!(text.starts_with("HTTP/1.1 400 Bad Request"));
    assert!(text.contains("BREW"));
}

#[tokio::test]
async fn test_oversized_request_gets_413() {
    let limits = ConnectionLimits {
        read_buffer_size: 4096,
        max_request_size: 64,
    };
    let mut h = start(limits).await;
    let raw = format!("GET /{} HTTP/1.1\r\n\r\n", "a".repeat(200));
    h.client.write_all(raw.as_bytes()).await.unwrap();

    let mut out = String::new();
    h.client.read_to_string(&mut out).await.unwrap();

    assert!(out.starts_with("HTTP/1.1 413 Payload Too Large"));
}

#[tokio::test]
async fn test_handler_panic_gets_500() {
    let (text, h) = exchange(b"GET /panic HTTP/1.1\r\n\r\n").await;
    h.task.await.unwrap().unwrap();

    let (head, body) = split_response(&text);
    assert!(head.starts_with("HTTP/1.1 500 Internal Server Error"));
    let json: serde_json::Value = serde_json::from_str(body).unwrap();
    assert_eq!(json["code"], 500);
}

#[tokio::test]
async fn test_empty_read_closes_without_response() {
    let mut h = start(ConnectionLimits::default()).await;
    h.client.shutdown().await.unwrap();

    let mut out = Vec::new();
    h.client.read_to_end(&mut out).await.unwrap();

    assert!(out.is_empty());
    h.task.await.unwrap().unwrap();
    assert!(h.registry.is_empty().await);
}

#[tokio::test]
async fn test_connection_unregistered_after_close() {
    let (_text, h) = exchange(b"GET / HTTP/1.1\r\n\r\n").await;

    h.task.await.unwrap().unwrap();
    assert!(h.registry.is_empty().await);
}

/// Stream whose reads always fail; writes are captured.
struct BrokenStream {
    written: Arc<Mutex<Vec<u8>>>,
}

impl AsyncRead for BrokenStream {
    fn poll_read(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        _buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        Poll::Ready(Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset")))
    }
}

impl AsyncWrite for BrokenStream {
    fn poll_write(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        self.written.lock().unwrap().extend_from_slice(buf);
        Poll::Ready(Ok(buf.len()))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }
}

#[tokio::test]
async fn test_read_error_closes_without_response() {
    let written = Arc::new(Mutex::new(Vec::new()));
    let stream = BrokenStream {
        written: Arc::clone(&written),
    };
    let registry = ConnectionRegistry::new();
    let id = registry.register("127.0.0.1:50001").await;

    let conn = Connection::new(id, stream, test_app(), registry.clone(), ConnectionLimits::default());
    let result = conn.run().await;

    match result {
        Err(Error::ConnectionFailed(message)) => assert!(message.contains("reset")),
        other => panic!("expected ConnectionFailed, got {other:?}"),
    }
    assert!(written.lock().unwrap().is_empty());
    assert!(registry.is_empty().await);
}
