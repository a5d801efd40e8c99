//! Error taxonomy and the mapping from errors to HTTP responses.
//!
//! Every variant maps to exactly one status code. Errors are never persisted;
//! at the connection boundary they are rendered as a JSON body of the form
//! `{"error": true, "code": 404, "status": "Not Found", "message": "...", "timestamp": "..."}`.

use serde::Serialize;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::http::response::{Response, StatusCode};

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("malformed request: {0}")]
    MalformedRequest(String),

    #[error("unsupported HTTP method: {0}")]
    UnsupportedHttpMethod(String),

    #[error("invalid HTTP version: {0}")]
    InvalidHttpVersion(String),

    #[error("invalid headers: {0}")]
    InvalidHeaders(String),

    #[error("request of {size} bytes exceeds the maximum of {max} bytes")]
    RequestTooLarge { size: usize, max: usize },

    #[error("missing required headers: {}", .0.join(", "))]
    MissingRequiredHeaders(Vec<String>),

    #[error("file not found: {0}")]
    FileNotFound(String),

    #[error("failed to read file: {0}")]
    FileReadError(String),

    #[error("no route for {method} {path}")]
    RouteNotFound { method: String, path: String },

    #[error("route handler failed: {0}")]
    RouteHandlerError(String),

    #[error("middleware {middleware} failed: {message}")]
    MiddlewareError { middleware: String, message: String },

    #[error("internal server error: {0}")]
    InternalServerError(String),

    #[error("invalid JSON: {0}")]
    JsonParsingError(String),

    #[error("invalid content encoding: {0}")]
    ContentEncodingError(String),

    #[error("unexpected error: {0}")]
    Unexpected(#[from] anyhow::Error),
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::ConnectionFailed(err.to_string())
    }
}

impl Error {
    /// HTTP status this error is reported with.
    pub fn status(&self) -> StatusCode {
        match self {
            Error::ConnectionFailed(_) => StatusCode::ServiceUnavailable,
            Error::InvalidRequest(_)
            | Error::MalformedRequest(_)
            | Error::UnsupportedHttpMethod(_)
            | Error::InvalidHttpVersion(_)
            | Error::InvalidHeaders(_)
            | Error::MissingRequiredHeaders(_)
            | Error::JsonParsingError(_)
            | Error::ContentEncodingError(_) => StatusCode::BadRequest,
            Error::RequestTooLarge { .. } => StatusCode::PayloadTooLarge,
            Error::FileNotFound(_) | Error::RouteNotFound { .. } => StatusCode::NotFound,
            Error::FileReadError(_)
            | Error::RouteHandlerError(_)
            | Error::MiddlewareError { .. }
            | Error::InternalServerError(_)
            | Error::Unexpected(_) => StatusCode::InternalServerError,
        }
    }

    /// Stable name of the variant, used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::ConnectionFailed(_) => "ConnectionFailed",
            Error::InvalidRequest(_) => "InvalidRequest",
            Error::MalformedRequest(_) => "MalformedRequest",
            Error::UnsupportedHttpMethod(_) => "UnsupportedHTTPMethod",
            Error::InvalidHttpVersion(_) => "InvalidHTTPVersion",
            Error::InvalidHeaders(_) => "InvalidHeaders",
            Error::RequestTooLarge { .. } => "RequestTooLarge",
            Error::MissingRequiredHeaders(_) => "MissingRequiredHeaders",
            Error::FileNotFound(_) => "FileNotFound",
            Error::FileReadError(_) => "FileReadError",
            Error::RouteNotFound { .. } => "RouteNotFound",
            Error::RouteHandlerError(_) => "RouteHandlerError",
            Error::MiddlewareError { .. } => "MiddlewareError",
            Error::InternalServerError(_) => "InternalServerError",
            Error::JsonParsingError(_) => "JSONParsingError",
            Error::ContentEncodingError(_) => "ContentEncodingError",
            Error::Unexpected(_) => "UnexpectedError",
        }
    }

    /// True for errors raised outside the HTTP taxonomy.
    pub fn is_foreign(&self) -> bool {
        matches!(self, Error::Unexpected(_))
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: bool,
    code: u16,
    status: &'a str,
    message: String,
    timestamp: String,
}

fn timestamp() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|_| "1970-01-01T00:00:00Z".to_string())
}

/// Renders the JSON error body for `err`.
///
/// If serialization fails a hand-built body is returned instead, so the
/// error is never dropped.
pub fn error_body(err: &Error) -> String {
    let status = err.status();
    let body = ErrorBody {
        error: true,
        code: status.as_u16(),
        status: status.reason_phrase(),
        message: err.to_string(),
        timestamp: timestamp(),
    };

    match serde_json::to_string(&body) {
        Ok(json) => json,
        Err(e) => {
            tracing::error!(error = %e, "Failed to encode error body");
            fallback_body(status, &body.message, &body.timestamp)
        }
    }
}

fn fallback_body(status: StatusCode, message: &str, timestamp: &str) -> String {
    let message: String = message
        .chars()
        .filter(|c| !c.is_control())
        .map(|c| if c == '"' || c == '\\' { '\'' } else { c })
        .collect();

    format!(
        "{{\"error\":true,\"code\":{},\"status\":\"{}\",\"message\":\"{}\",\"timestamp\":\"{}\"}}",
        status.as_u16(),
        status.reason_phrase(),
        message,
        timestamp
    )
}

/// Rewrites a partially built response to report `err`.
///
/// Headers set by earlier middleware (CORS, cookies) are kept; status, body
/// and content headers are replaced.
pub fn apply_error(err: &Error, response: &mut Response) {
    response.set_status(err.status());
    response.headers.remove("Content-Length");
    response.set_header("Content-Type", "application/json");
    response.set_body(error_body(err));
}

/// Raw wire bytes for an error raised before any `Response` exists.
pub fn error_response_bytes(err: &Error) -> Vec<u8> {
    let status = err.status();
    let body = error_body(err);

    format!(
        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status.as_u16(),
        status.reason_phrase(),
        body.len(),
        body
    )
    .into_bytes()
}

/// Logs an error raised inside the middleware chain, naming the unit.
pub fn log_middleware_error(middleware: &str, err: &Error) {
    let status = err.status().as_u16();
    if status >= 500 {
        tracing::error!(%middleware, kind = err.kind(), status, error = %err, "Middleware failed");
    } else {
        tracing::warn!(%middleware, kind = err.kind(), status, error = %err, "Middleware rejected request");
    }
}

/// Logs `err` at a level matching its status class.
pub fn log_error(err: &Error) {
    let status = err.status().as_u16();
    if status >= 500 {
        tracing::error!(kind = err.kind(), status, error = %err, "Request failed");
    } else {
        tracing::warn!(kind = err.kind(), status, error = %err, "Request rejected");
    }
}
