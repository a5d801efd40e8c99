use serde::Serialize;

use crate::http::headers::Headers;

/// HTTP status codes supported by the server.
///
/// Common HTTP status codes used in responses:
/// - `Ok` (200): Request successful
/// - `Created` (201): Resource created successfully
/// - `NoContent` (204): Successful request with no content
/// - `NotModified` (304): Cached representation is still valid
/// - `BadRequest` (400): Malformed request
/// - `Unauthorized` (401): Missing or invalid credentials
/// - `NotFound` (404): Resource not found
/// - `PayloadTooLarge` (413): Request exceeded the size limit
/// - `InternalServerError` (500): Server error
/// - `ServiceUnavailable` (503): Connection could not be served
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    /// 200 OK
    Ok,
    /// 201 Created
    Created,
    /// 204 No Content
    NoContent,
    /// 301 Moved Permanently
    MovedPermanently,
    /// 302 Found
    Found,
    /// 304 Not Modified
    NotModified,
    /// 400 Bad Request
    BadRequest,
    /// 401 Unauthorized
    Unauthorized,
    /// 403 Forbidden
    Forbidden,
    /// 404 Not Found
    NotFound,
    /// 405 Method Not Allowed
    MethodNotAllowed,
    /// 413 Payload Too Large
    PayloadTooLarge,
    /// 500 Internal Server Error
    InternalServerError,
    /// 503 Service Unavailable
    ServiceUnavailable,
}

impl StatusCode {
    /// Returns the numeric HTTP status code.
    ///
    /// # Example
    ///
    /// ```
    /// # use ember::http::response::StatusCode;
    /// assert_eq!(StatusCode::Ok.as_u16(), 200);
    /// assert_eq!(StatusCode::NotFound.as_u16(), 404);
    /// ```
    pub fn as_u16(&self) -> u16 {
        match self {
            StatusCode::Ok => 200,
            StatusCode::Created => 201,
            StatusCode::NoContent => 204,
            StatusCode::MovedPermanently => 301,
            StatusCode::Found => 302,
            StatusCode::NotModified => 304,
            StatusCode::BadRequest => 400,
            StatusCode::Unauthorized => 401,
            StatusCode::Forbidden => 403,
            StatusCode::NotFound => 404,
            StatusCode::MethodNotAllowed => 405,
            StatusCode::PayloadTooLarge => 413,
            StatusCode::InternalServerError => 500,
            StatusCode::ServiceUnavailable => 503,
        }
    }

    pub fn from_u16(code: u16) -> Option<Self> {
        let status = match code {
            200 => StatusCode::Ok,
            201 => StatusCode::Created,
            204 => StatusCode::NoContent,
            301 => StatusCode::MovedPermanently,
            302 => StatusCode::Found,
            304 => StatusCode::NotModified,
            400 => StatusCode::BadRequest,
            401 => StatusCode::Unauthorized,
            403 => StatusCode::Forbidden,
            404 => StatusCode::NotFound,
            405 => StatusCode::MethodNotAllowed,
            413 => StatusCode::PayloadTooLarge,
            500 => StatusCode::InternalServerError,
            503 => StatusCode::ServiceUnavailable,
            _ => return None,
        };
        Some(status)
    }

    /// Returns the standard HTTP reason phrase for this status code.
    ///
    /// # Example
    ///
    /// ```
    /// # use ember::http::response::StatusCode;
    /// assert_eq!(StatusCode::Ok.reason_phrase(), "OK");
    /// assert_eq!(StatusCode::NotFound.reason_phrase(), "Not Found");
    /// ```
    pub fn reason_phrase(&self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::Created => "Created",
            StatusCode::NoContent => "No Content",
            StatusCode::MovedPermanently => "Moved Permanently",
            StatusCode::Found => "Found",
            StatusCode::NotModified => "Not Modified",
            StatusCode::BadRequest => "Bad Request",
            StatusCode::Unauthorized => "Unauthorized",
            StatusCode::Forbidden => "Forbidden",
            StatusCode::NotFound => "Not Found",
            StatusCode::MethodNotAllowed => "Method Not Allowed",
            StatusCode::PayloadTooLarge => "Payload Too Large",
            StatusCode::InternalServerError => "Internal Server Error",
            StatusCode::ServiceUnavailable => "Service Unavailable",
        }
    }
}

/// Response accumulated while a request moves through the middleware chain.
///
/// Starts as `200 OK` with no headers and an empty body. The connection
/// writes it to the wire once; [`Response::mark_sent`] guards that.
#[derive(Debug)]
pub struct Response {
    /// The HTTP status code
    pub status: StatusCode,
    /// HTTP headers, matched case-insensitively
    pub headers: Headers,
    /// Response body as bytes
    pub body: Vec<u8>,
    sent: bool,
}

/// Builder for constructing HTTP responses in a fluent style.
///
/// # Example
///
/// ```ignore
/// let response = ResponseBuilder::new(StatusCode::Ok)
///     .header("Content-Type", "application/json")
///     .body(b"{}".to_vec())
///     .build();
/// ```
pub struct ResponseBuilder {
    status: StatusCode,
    headers: Headers,
    body: Vec<u8>,
}

impl ResponseBuilder {
    /// Creates a new response builder with the specified status code.
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: Headers::new(),
            body: Vec::new(),
        }
    }

    /// Adds or replaces a header.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key, value);
        self
    }

    /// Sets the response body.
    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Builds the final Response.
    ///
    /// Automatically adds the Content-Length header based on body size if not already present.
    pub fn build(mut self) -> Response {
        if !self.headers.contains("Content-Length") {
            self.headers
                .insert("Content-Length", self.body.len().to_string());
        }

        Response {
            status: self.status,
            headers: self.headers,
            body: self.body,
            sent: false,
        }
    }
}

impl Default for Response {
    fn default() -> Self {
        Self::new()
    }
}

impl Response {
    /// Empty `200 OK` response shell.
    pub fn new() -> Self {
        Self {
            status: StatusCode::Ok,
            headers: Headers::new(),
            body: Vec::new(),
            sent: false,
        }
    }

    /// Creates a simple 200 OK response with the given body.
    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        ResponseBuilder::new(StatusCode::Ok)
            .body(body)
            .build()
    }

    pub fn set_status(&mut self, status: StatusCode) -> &mut Self {
        self.status = status;
        self
    }

    pub fn set_header(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.headers.insert(key, value);
        self
    }

    pub fn append_header(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.headers.append(key, value);
        self
    }

    /// Replaces the body. A stale Content-Length is dropped so the writer
    /// recomputes it.
    pub fn set_body(&mut self, body: impl Into<Vec<u8>>) -> &mut Self {
        self.body = body.into();
        self.headers.remove("Content-Length");
        self
    }

    pub fn text(&mut self, body: impl Into<String>) -> &mut Self {
        self.set_header("Content-Type", "text/plain; charset=utf-8");
        self.set_body(body.into())
    }

    pub fn html(&mut self, body: impl Into<String>) -> &mut Self {
        self.set_header("Content-Type", "text/html; charset=utf-8");
        self.set_body(body.into())
    }

    /// Serializes `value` as the JSON body.
    pub fn json<T: Serialize>(&mut self, value: &T) -> serde_json::Result<&mut Self> {
        let body = serde_json::to_vec(value)?;
        self.set_header("Content-Type", "application/json");
        Ok(self.set_body(body))
    }

    pub fn redirect(&mut self, location: impl Into<String>) -> &mut Self {
        self.set_status(StatusCode::Found);
        self.set_header("Location", location);
        self.set_body(Vec::new())
    }

    pub fn is_sent(&self) -> bool {
        self.sent
    }

    /// Flags the response as written. Returns `false` if it already was.
    pub fn mark_sent(&mut self) -> bool {
        if self.sent {
            return false;
        }
        self.sent = true;
        true
    }
}
