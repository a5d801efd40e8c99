use ember::http::response::{Response, ResponseBuilder, StatusCode};
use ember::http::writer::{ResponseWriter, serialize_response};

#[test]
fn test_status_code_as_u16() {
    assert_eq!(StatusCode::Ok.as_u16(), 200);
    assert_eq!(StatusCode::Created.as_u16(), 201);
    assert_eq!(StatusCode::NoContent.as_u16(), 204);
    assert_eq!(StatusCode::NotModified.as_u16(), 304);
    assert_eq!(StatusCode::BadRequest.as_u16(), 400);
    assert_eq!(StatusCode::Unauthorized.as_u16(), 401);
    assert_eq!(StatusCode::NotFound.as_u16(), 404);
    assert_eq!(StatusCode::PayloadTooLarge.as_u16(), 413);
    assert_eq!(StatusCode::InternalServerError.as_u16(), 500);
    assert_eq!(StatusCode::ServiceUnavailable.as_u16(), 503);
}

#[test]
fn test_status_code_reason_phrase() {
    assert_eq!(StatusCode::Ok.reason_phrase(), "OK");
    assert_eq!(StatusCode::NotFound.reason_phrase(), "Not Found");
    assert_eq!(StatusCode::PayloadTooLarge.reason_phrase(), "Payload Too Large");
    assert_eq!(
        StatusCode::InternalServerError.reason_phrase(),
        "Internal Server Error"
    );
}

#[test]
fn test_status_code_from_u16() {
    assert_eq!(StatusCode::from_u16(404), Some(StatusCode::NotFound));
    assert_eq!(StatusCode::from_u16(302), Some(StatusCode::Found));
    assert_eq!(StatusCode::from_u16(418), None);
}

#[test]
fn test_response_builder_auto_content_length() {
    let body = b"This is the body".to_vec();
    let response = ResponseBuilder::new(StatusCode::Ok)
        .body(body.clone())
        .build();

    let content_length = response.headers.get("Content-Length").unwrap();
    assert_eq!(content_length, body.len().to_string());
}

#[test]
fn test_response_builder_preserves_custom_content_length() {
    let response = ResponseBuilder::new(StatusCode::Ok)
        .header("Content-Length", "999")
        .body(b"test".to_vec())
        .build();

    assert_eq!(response.headers.get("content-length").unwrap(), "999");
}

#[test]
fn test_response_builder_multiple_headers() {
    let response = ResponseBuilder::new(StatusCode::Ok)
        .header("Content-Type", "application/json")
        .header("Cache-Control", "no-cache")
        .header("X-Frame-Options", "DENY")
        .body(b"{}".to_vec())
        .build();

    assert_eq!(response.headers.len(), 4); // 3 custom + 1 auto (Content-Length)
    assert_eq!(response.headers.get("Cache-Control").unwrap(), "no-cache");
}

#[test]
fn test_response_defaults() {
    let response = Response::new();

    assert_eq!(response.status, StatusCode::Ok);
    assert!(response.headers.is_empty());
    assert!(response.body.is_empty());
    assert!(!response.is_sent());
}

#[test]
fn test_response_mark_sent_once() {
    let mut response = Response::ok("done");

    assert!(response.mark_sent());
    assert!(response.is_sent());
    assert!(!response.mark_sent());
}

#[test]
fn test_response_helpers_set_content_type() {
    let mut response = Response::new();
    response.text("hi");
    assert_eq!(response.headers.get("Content-Type"), Some("text/plain; charset=utf-8"));
    assert_eq!(response.body, b"hi".to_vec());

    response.html("<p>hi</p>");
    assert_eq!(response.headers.get("content-type"), Some("text/html; charset=utf-8"));

    response.json(&serde_json::json!({ "ok": true })).unwrap();
    assert_eq!(response.headers.get("Content-Type"), Some("application/json"));
    assert_eq!(response.body, br#"{"ok":true}"#.to_vec());
}

#[test]
fn test_response_set_body_drops_stale_content_length() {
    let mut response = Response::ok("a long body");
    response.set_body("short");

    assert!(!response.headers.contains("Content-Length"));
    let wire = String::from_utf8(serialize_response(&response)).unwrap();
    assert!(wire.contains("Content-Length: 5\r\n"));
}

#[test]
fn test_response_redirect() {
    let mut response = Response::new();
    response.redirect("/login");

    assert_eq!(response.status, StatusCode::Found);
    assert_eq!(response.headers.get("Location"), Some("/login"));
}

#[test]
fn test_serialize_response_wire_format() {
    let mut response = Response::new();
    response.set_status(StatusCode::Created);
    response.set_header("X-Id", "9");
    response.append_header("Set-Cookie", "a=1");
    response.append_header("Set-Cookie", "b=2");
    response.set_header("Connection", "keep-alive");
    response.set_body("made");

    let wire = String::from_utf8(serialize_response(&response)).unwrap();

    assert!(wire.starts_with("HTTP/1.1 201 Created\r\n"));
    assert!(wire.contains("X-Id: 9\r\n"));
    assert!(wire.contains("Set-Cookie: a=1\r\nSet-Cookie: b=2\r\n"));
    assert!(wire.contains("Content-Length: 4\r\n"));
    assert!(wire.contains("Connection: close\r\n"));
    assert!(!wire.contains("keep-alive"));
    assert!(wire.ends_with("\r\n\r\nmade"));
}

#[tokio::test]
async fn test_response_writer_writes_everything() {
    let response = Response::ok("payload");
    let mut writer = ResponseWriter::new(&response);
    let expected = serialize_response(&response);

    let mut out: Vec<u8> = Vec::new();
    writer.write_to_stream(&mut out).await.unwrap();

    assert_eq!(out, expected);
    assert_eq!(writer.len(), expected.len());
}
