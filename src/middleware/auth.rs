use std::sync::Arc;

use serde_json::json;

use crate::error::Result;
use crate::http::request::Request;
use crate::http::response::{Response, StatusCode};
use crate::middleware::{Middleware, Next};
use crate::router::path_has_prefix;

/// Bearer token accepted by [`BearerAuth`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BearerToken(pub String);

type Validator = Arc<dyn Fn(&str) -> bool + Send + Sync>;

/// Requires `Authorization: Bearer <token>` accepted by a validator.
///
/// Rejected requests get a 401 JSON body and the chain stops there.
/// Paths under a public prefix skip the check.
pub struct BearerAuth {
    validator: Validator,
    public_prefixes: Vec<String>,
}

impl BearerAuth {
    pub fn new<F>(validator: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        Self {
            validator: Arc::new(validator),
            public_prefixes: Vec::new(),
        }
    }

    pub fn public_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.public_prefixes.push(prefix.into());
        self
    }

    fn reject(res: &mut Response, message: &str) {
        let body = json!({
            "error": true,
            "code": StatusCode::Unauthorized.as_u16(),
            "status": StatusCode::Unauthorized.reason_phrase(),
            "message": message,
        });
        res.set_status(StatusCode::Unauthorized);
        res.set_header("WWW-Authenticate", "Bearer");
        res.set_header("Content-Type", "application/json");
        res.set_body(body.to_string());
    }
}

impl Middleware for BearerAuth {
    fn execute(&self, req: &mut Request, res: &mut Response, next: &mut Next) -> Result<()> {
        if self.public_prefixes.iter().any(|p| path_has_prefix(&req.path, p)) {
            next.proceed();
            return Ok(());
        }

        let token = req
            .header("Authorization")
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());

        let Some(token) = token else {
            tracing::debug!(path = %req.path, "Missing bearer token");
            Self::reject(res, "missing bearer token");
            return Ok(());
        };

        if !(self.validator)(&token) {
            tracing::debug!(path = %req.path, "Invalid bearer token");
            Self::reject(res, "invalid bearer token");
            return Ok(());
        }

        req.extensions_mut().insert(BearerToken(token));
        next.proceed();
        Ok(())
    }
}
