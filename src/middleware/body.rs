use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::http::query;
use crate::http::request::Request;
use crate::http::response::Response;
use crate::middleware::{Middleware, Next};

/// Request body decoded according to its `Content-Type`.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedBody {
    Json(serde_json::Value),
    Form(HashMap<String, String>),
    Text(String),
}

/// Decodes JSON, form-urlencoded and text bodies into [`ParsedBody`].
///
/// Empty bodies and other content types are left alone.
#[derive(Debug, Default)]
pub struct BodyParser;

fn media_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

fn utf8(body: &[u8]) -> Result<&str> {
    std::str::from_utf8(body)
        .map_err(|e| Error::ContentEncodingError(format!("body is not valid UTF-8: {e}")))
}

impl Middleware for BodyParser {
    fn execute(&self, req: &mut Request, _res: &mut Response, next: &mut Next) -> Result<()> {
        if req.body.is_empty() {
            next.proceed();
            return Ok(());
        }

        let media = req.content_type().map(media_type).unwrap_or_default();

        let parsed = match media.as_str() {
            "application/json" => {
                let value = serde_json::from_slice(&req.body)
                    .map_err(|e| Error::JsonParsingError(e.to_string()))?;
                Some(ParsedBody::Json(value))
            }
            "application/x-www-form-urlencoded" => {
                Some(ParsedBody::Form(query::parse_query_string(utf8(&req.body)?)))
            }
            m if m.starts_with("text/") => Some(ParsedBody::Text(utf8(&req.body)?.to_string())),
            _ => None,
        };

        if let Some(parsed) = parsed {
            req.extensions_mut().insert(parsed);
        }
        next.proceed();
        Ok(())
    }
}
