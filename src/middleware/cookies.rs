use std::collections::HashMap;

use crate::error::Result;
use crate::http::request::Request;
use crate::http::response::Response;
use crate::middleware::{Middleware, Next};

/// Cookies sent by the client, by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cookies(pub HashMap<String, String>);

impl Cookies {
    /// Parses a `Cookie` header value: `a=1; b=2`.
    pub fn parse(header: &str) -> Self {
        let cookies = header
            .split(';')
            .filter_map(|pair| {
                let (name, value) = pair.trim().split_once('=')?;
                let name = name.trim();
                if name.is_empty() {
                    return None;
                }
                let value = value.trim().trim_matches('"');
                Some((name.to_string(), value.to_string()))
            })
            .collect();
        Cookies(cookies)
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(|v| v.as_str())
    }
}

/// Parses the `Cookie` header into [`Cookies`].
#[derive(Debug, Default)]
pub struct CookieParser;

impl Middleware for CookieParser {
    fn execute(&self, req: &mut Request, _res: &mut Response, next: &mut Next) -> Result<()> {
        let cookies = req.header("Cookie").map(Cookies::parse).unwrap_or_default();
        req.extensions_mut().insert(cookies);
        next.proceed();
        Ok(())
    }
}

/// Appends a `Set-Cookie` header. `attributes` are emitted verbatim,
/// e.g. `["Path=/", "HttpOnly"]`.
pub fn set_cookie(res: &mut Response, name: &str, value: &str, attributes: &[&str]) {
    let mut cookie = format!("{name}={value}");
    for attr in attributes {
        cookie.push_str("; ");
        cookie.push_str(attr);
    }
    res.append_header("Set-Cookie", cookie);
}
