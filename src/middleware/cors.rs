use crate::error::Result;
use crate::http::request::{Method, Request};
use crate::http::response::{Response, StatusCode};
use crate::middleware::{Middleware, Next};

/// Cross-origin resource sharing.
///
/// Adds `Access-Control-Allow-*` headers for allowed origins and answers
/// preflight `OPTIONS` requests with 204 without continuing the chain.
#[derive(Debug, Clone)]
pub struct Cors {
    allowed_origins: Vec<String>,
    allowed_methods: Vec<Method>,
    allowed_headers: Vec<String>,
    max_age: Option<u64>,
}

impl Default for Cors {
    fn default() -> Self {
        Self {
            allowed_origins: vec!["*".to_string()],
            allowed_methods: vec![
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::PATCH,
                Method::OPTIONS,
            ],
            allowed_headers: vec!["Content-Type".to_string(), "Authorization".to_string()],
            max_age: Some(86400),
        }
    }
}

impl Cors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allow_origins<I, S>(mut self, origins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_origins = origins.into_iter().map(Into::into).collect();
        self
    }

    pub fn allow_methods(mut self, methods: impl IntoIterator<Item = Method>) -> Self {
        self.allowed_methods = methods.into_iter().collect();
        self
    }

    pub fn allow_headers<I, S>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_headers = headers.into_iter().map(Into::into).collect();
        self
    }

    pub fn max_age(mut self, seconds: Option<u64>) -> Self {
        self.max_age = seconds;
        self
    }

    /// Value for `Access-Control-Allow-Origin`, if `origin` is allowed.
    fn allow_origin_value(&self, origin: &str) -> Option<String> {
        if self.allowed_origins.iter().any(|o| o == "*") {
            Some("*".to_string())
        } else {
            self.allowed_origins
                .iter()
                .find(|o| o.eq_ignore_ascii_case(origin))
                .cloned()
        }
    }
}

impl Middleware for Cors {
    fn execute(&self, req: &mut Request, res: &mut Response, next: &mut Next) -> Result<()> {
        let Some(origin) = req.header("Origin") else {
            next.proceed();
            return Ok(());
        };

        let Some(allow) = self.allow_origin_value(origin) else {
            tracing::debug!(origin, "Origin not allowed");
            next.proceed();
            return Ok(());
        };

        if allow != "*" {
            res.append_header("Vary", "Origin");
        }
        res.set_header("Access-Control-Allow-Origin", allow);

        let preflight = req.method == Method::OPTIONS
            && req.header("Access-Control-Request-Method").is_some();
        if !preflight {
            next.proceed();
            return Ok(());
        }

        let methods: Vec<&str> = self.allowed_methods.iter().map(|m| m.as_str()).collect();
        res.set_header("Access-Control-Allow-Methods", methods.join(", "));
        res.set_header("Access-Control-Allow-Headers", self.allowed_headers.join(", "));
        if let Some(max_age) = self.max_age {
            res.set_header("Access-Control-Max-Age", max_age.to_string());
        }
        res.set_status(StatusCode::NoContent);
        res.set_body(Vec::new());

        tracing::debug!(path = %req.path, "Answered CORS preflight");
        Ok(())
    }
}
