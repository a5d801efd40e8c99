use crate::error::{Error, Result};
use crate::http::headers::Headers;
use crate::http::request::{Method, Request};

/// Largest request accepted by the parser, in bytes.
pub const MAX_REQUEST_SIZE: usize = 1024 * 1024;

const SUPPORTED_VERSIONS: [&str; 2] = ["1.0", "1.1"];

/// Parses one complete request from `buf` using [`MAX_REQUEST_SIZE`].
pub fn parse_http_request(buf: &[u8]) -> Result<Request> {
    parse_http_request_with_limit(buf, MAX_REQUEST_SIZE)
}

/// Parses one complete request from `buf`.
///
/// The buffer is whatever a single socket read produced. If no blank line
/// separates the head from the body, the whole buffer is treated as the
/// head. The body is sliced to `Content-Length` when present and shorter
/// than the remaining bytes; a longer declared length yields what arrived.
pub fn parse_http_request_with_limit(buf: &[u8], max_size: usize) -> Result<Request> {
    if buf.is_empty() {
        return Err(Error::MalformedRequest("empty request".to_string()));
    }
    if buf.len() > max_size {
        return Err(Error::RequestTooLarge {
            size: buf.len(),
            max: max_size,
        });
    }

    let (head_bytes, body_bytes) = match find_headers_end(buf) {
        Some((end, sep_len)) => (&buf[..end], &buf[end + sep_len..]),
        None => (buf, &buf[buf.len()..]),
    };

    let head = std::str::from_utf8(head_bytes)
        .map_err(|_| Error::MalformedRequest("request head is not valid UTF-8".to_string()))?;

    let mut lines = head.split('\n').map(|line| line.strip_suffix('\r').unwrap_or(line));

    // Request line
    let request_line = lines
        .next()
        .filter(|line| !line.trim().is_empty())
        .ok_or_else(|| Error::MalformedRequest("missing request line".to_string()))?;
    let (method, target, version) = parse_request_line(request_line)?;

    // Headers
    let mut headers = Headers::new();

    for line in lines {
        if line.is_empty() {
            continue;
        }

        let (key, value) = line
            .split_once(':')
            .ok_or_else(|| Error::InvalidHeaders(format!("missing ':' in header line {line:?}")))?;

        let key = key.trim();
        if key.is_empty() || key.contains(char::is_whitespace) {
            return Err(Error::InvalidHeaders(format!("invalid header name {key:?}")));
        }

        if key.eq_ignore_ascii_case("Set-Cookie") {
            headers.append(key, value.trim());
        } else {
            headers.insert(key, value.trim());
        }
    }

    // Body
    let content_length = headers
        .get("Content-Length")
        .map(|v| {
            v.trim()
                .parse::<usize>()
                .map_err(|_| Error::InvalidHeaders(format!("invalid Content-Length {v:?}")))
        })
        .transpose()?;

    let body = match content_length {
        Some(len) if len <= body_bytes.len() => body_bytes[..len].to_vec(),
        Some(len) => {
            tracing::debug!(
                declared = len,
                received = body_bytes.len(),
                "Body shorter than Content-Length, using received bytes"
            );
            body_bytes.to_vec()
        }
        None => body_bytes.to_vec(),
    };

    Ok(Request::new(method, target, version, headers, body))
}

fn parse_request_line(line: &str) -> Result<(Method, &str, String)> {
    let mut parts = line.split_whitespace();

    let (Some(method_str), Some(target), Some(version_str), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(Error::MalformedRequest(format!("invalid request line {line:?}")));
    };

    let method = Method::from_str(method_str)
        .ok_or_else(|| Error::UnsupportedHttpMethod(method_str.to_string()))?;

    let version = version_str
        .strip_prefix("HTTP/")
        .filter(|v| SUPPORTED_VERSIONS.contains(v))
        .ok_or_else(|| Error::InvalidHttpVersion(version_str.to_string()))?;

    if !target.starts_with('/') {
        return Err(Error::InvalidRequest(format!("invalid request target {target:?}")));
    }

    Ok((method, target, version.to_string()))
}

/// Finds the blank line ending the head; returns its offset and length.
fn find_headers_end(buf: &[u8]) -> Option<(usize, usize)> {
    let crlf = buf.windows(4).position(|w| w == b"\r\n\r\n");
    let lf = buf.windows(2).position(|w| w == b"\n\n");

    match (crlf, lf) {
        (Some(c), Some(l)) if l < c => Some((l, 2)),
        (Some(c), _) => Some((c, 4)),
        (None, Some(l)) => Some((l, 2)),
        (None, None) => None,
    }
}
