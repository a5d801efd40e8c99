use ember::error::Error;
use ember::http::parser::{MAX_REQUEST_SIZE, parse_http_request, parse_http_request_with_limit};
use ember::http::request::Method;

#[test]
fn test_parse_simple_get_request() {
    let req = b"GET /test HTTP/1.1\r\nHost: localhost\r\n\r\n";
    let parsed = parse_http_request(req).unwrap();

    assert_eq!(parsed.method, Method::GET);
    assert_eq!(parsed.path, "/test");
    assert_eq!(parsed.version, "1.1");
    assert_eq!(parsed.headers.len(), 1);
    assert_eq!(parsed.headers.get("Host").unwrap(), "localhost");
    assert!(parsed.body.is_empty());
    assert!(parsed.params().is_empty());
}

#[test]
fn test_parse_post_request_with_body() {
    let req = b"POST /api HTTP/1.1\r\nHost: localhost\r\nContent-Length: 5\r\n\r\nhello";
    let parsed = parse_http_request(req).unwrap();

    assert_eq!(parsed.method, Method::POST);
    assert_eq!(parsed.path, "/api");
    assert_eq!(parsed.body, b"hello".to_vec());
}

#[test]
fn test_parse_multiple_headers() {
    let req = b"GET /path HTTP/1.1\r\nHost: example.com\r\nUser-Agent: test-client\r\nAccept: */*\r\n\r\n";
    let parsed = parse_http_request(req).unwrap();

    assert_eq!(parsed.headers.get("Host").unwrap(), "example.com");
    assert_eq!(parsed.headers.get("User-Agent").unwrap(), "test-client");
    assert_eq!(parsed.headers.get("Accept").unwrap(), "*/*");
}

#[test]
fn test_parse_headers_case_insensitive() {
    let req = b"GET / HTTP/1.1\r\nContent-Type: application/json\r\n\r\n";
    let parsed = parse_http_request(req).unwrap();

    assert_eq!(parsed.header("content-type"), Some("application/json"));
    assert_eq!(parsed.header("CONTENT-TYPE"), Some("application/json"));
}

#[test]
fn test_parse_duplicate_header_last_wins() {
    let req = b"GET / HTTP/1.1\r\nX-Mode: first\r\nx-mode: second\r\n\r\n";
    let parsed = parse_http_request(req).unwrap();

    assert_eq!(parsed.header("X-Mode"), Some("second"));
    assert_eq!(parsed.headers.get_all("X-Mode"), vec!["second"]);
}

#[test]
fn test_parse_set_cookie_accumulates() {
    let req = b"GET / HTTP/1.1\r\nSet-Cookie: a=1\r\nSet-Cookie: b=2\r\n\r\n";
    let parsed = parse_http_request(req).unwrap();

    assert_eq!(parsed.headers.get_all("set-cookie"), vec!["a=1", "b=2"]);
}

#[test]
fn test_parse_request_with_path_and_query_string() {
    let req = b"GET /search?q=rust%20lang&page=2&flag HTTP/1.1\r\nHost: example.com\r\n\r\n";
    let parsed = parse_http_request(req).unwrap();

    assert_eq!(parsed.path, "/search");
    assert_eq!(parsed.raw_query.as_deref(), Some("q=rust%20lang&page=2&flag"));
    assert_eq!(parsed.query_param("q"), Some("rust lang"));
    assert_eq!(parsed.query_param("page"), Some("2"));
    assert_eq!(parsed.query_param("flag"), Some(""));
}

#[test]
fn test_parse_query_stops_at_fragment() {
    let req = b"GET /docs?section=intro#top HTTP/1.1\r\n\r\n";
    let parsed = parse_http_request(req).unwrap();

    assert_eq!(parsed.path, "/docs");
    assert_eq!(parsed.query_param("section"), Some("intro"));
    assert_eq!(parsed.query.len(), 1);
}

#[test]
fn test_parse_bare_lf_line_endings() {
    let req = b"POST /submit HTTP/1.0\nHost: localhost\nContent-Length: 2\n\nok";
    let parsed = parse_http_request(req).unwrap();

    assert_eq!(parsed.version, "1.0");
    assert_eq!(parsed.header("Host"), Some("localhost"));
    assert_eq!(parsed.body, b"ok".to_vec());
}

#[test]
fn test_parse_missing_blank_line_uses_whole_buffer_as_head() {
    let req = b"GET / HTTP/1.1\r\nHost: example.com\r\n";
    let parsed = parse_http_request(req).unwrap();

    assert_eq!(parsed.header("Host"), Some("example.com"));
    assert!(parsed.body.is_empty());
}

#[test]
fn test_parse_body_truncated_to_content_length() {
    let req = b"POST /api HTTP/1.1\r\nContent-Length: 3\r\n\r\nhello";
    let parsed = parse_http_request(req).unwrap();

    assert_eq!(parsed.body, b"hel".to_vec());
}

#[test]
fn test_parse_partial_body_is_best_effort() {
    let req = b"POST /api HTTP/1.1\r\nContent-Length: 10\r\n\r\nhello";
    let parsed = parse_http_request(req).unwrap();

    assert_eq!(parsed.body, b"hello".to_vec());
}

#[test]
fn test_parse_body_without_content_length_takes_rest() {
    let req = b"PUT /item HTTP/1.1\r\n\r\nraw-bytes";
    let parsed = parse_http_request(req).unwrap();

    assert_eq!(parsed.body, b"raw-bytes".to_vec());
}

#[test]
fn test_parse_empty_buffer_is_malformed() {
    let err = parse_http_request(b"").unwrap_err();

    assert!(matches!(err, Error::MalformedRequest(_)));
    assert_eq!(err.status().as_u16(), 400);
}

#[test]
fn test_parse_oversized_buffer() {
    let buf = vec![b'a'; MAX_REQUEST_SIZE + 1];
    let err = parse_http_request(&buf).unwrap_err();

    assert!(matches!(
        err,
        Error::RequestTooLarge { size, max } if size == MAX_REQUEST_SIZE + 1 && max == MAX_REQUEST_SIZE
    ));
    assert_eq!(err.status().as_u16(), 413);
}

#[test]
fn test_parse_custom_limit() {
    let req = b"GET / HTTP/1.1\r\n\r\n";
    let err = parse_http_request_with_limit(req, 8).unwrap_err();

    assert!(matches!(err, Error::RequestTooLarge { max: 8, .. }));
}

#[test]
fn test_parse_invalid_http_method() {
    let req = b"INVALID / HTTP/1.1\r\n\r\n";
    let err = parse_http_request(req).unwrap_err();

    assert!(matches!(err, Error::UnsupportedHttpMethod(ref m) if m == "INVALID"));
}

#[test]
fn test_parse_invalid_http_version() {
    for version in ["HTTP/2.0", "HTTP/1.2", "FTP/1.1", "1.1"] {
        let req = format!("GET / {version}\r\n\r\n");
        let err = parse_http_request(req.as_bytes()).unwrap_err();
        assert!(matches!(err, Error::InvalidHttpVersion(_)), "{version}");
    }
}

#[test]
fn test_parse_malformed_request_line() {
    let err = parse_http_request(b"GET /\r\n\r\n").unwrap_err();
    assert!(matches!(err, Error::MalformedRequest(_)));

    let err = parse_http_request(b"GET / HTTP/1.1 extra\r\n\r\n").unwrap_err();
    assert!(matches!(err, Error::MalformedRequest(_)));

    let err = parse_http_request(b"\r\n\r\n").unwrap_err();
    assert!(matches!(err, Error::MalformedRequest(_)));
}

#[test]
fn test_parse_target_must_be_absolute_path() {
    let err = parse_http_request(b"GET index.html HTTP/1.1\r\n\r\n").unwrap_err();

    assert!(matches!(err, Error::InvalidRequest(_)));
}

#[test]
fn test_parse_malformed_header() {
    let req = b"GET / HTTP/1.1\r\nBrokenHeader\r\n\r\n";
    let err = parse_http_request(req).unwrap_err();

    assert!(matches!(err, Error::InvalidHeaders(_)));
}

#[test]
fn test_parse_header_name_with_space() {
    let req = b"GET / HTTP/1.1\r\nBad Name: x\r\n\r\n";
    let err = parse_http_request(req).unwrap_err();

    assert!(matches!(err, Error::InvalidHeaders(_)));
}

#[test]
fn test_parse_invalid_content_length() {
    let req = b"POST / HTTP/1.1\r\nContent-Length: ten\r\n\r\n";
    let err = parse_http_request(req).unwrap_err();

    assert!(matches!(err, Error::InvalidHeaders(_)));
}

#[test]
fn test_parse_non_utf8_head() {
    let req = b"GET /\xff HTTP/1.1\r\n\r\n";
    let err = parse_http_request(req).unwrap_err();

    assert!(matches!(err, Error::MalformedRequest(_)));
}

#[test]
fn test_parse_various_http_methods() {
    let methods = vec![
        ("GET", Method::GET),
        ("POST", Method::POST),
        ("PUT", Method::PUT),
        ("DELETE", Method::DELETE),
        ("HEAD", Method::HEAD),
        ("OPTIONS", Method::OPTIONS),
        ("PATCH", Method::PATCH),
    ];

    for (method_str, expected_method) in methods {
        let req = format!("{} / HTTP/1.1\r\n\r\n", method_str);
        let parsed = parse_http_request(req.as_bytes()).unwrap();
        assert_eq!(parsed.method, expected_method);
    }
}

#[test]
fn test_parse_request_with_binary_body() {
    let req = b"POST /upload HTTP/1.1\r\nContent-Length: 4\r\n\r\n\x00\x01\x02\x03";
    let parsed = parse_http_request(req).unwrap();

    assert_eq!(parsed.body, vec![0, 1, 2, 3]);
}
