use std::collections::HashMap;
use std::fmt;

use crate::http::extensions::Extensions;
use crate::http::headers::Headers;
use crate::http::params::PathParams;
use crate::http::query;

/// HTTP request methods.
///
/// Represents the HTTP method/verb of a request. Any other token on the
/// request line is rejected by the parser as unsupported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// GET - Retrieve a resource
    GET,
    /// POST - Create or submit data
    POST,
    /// PUT - Replace a resource
    PUT,
    /// DELETE - Delete a resource
    DELETE,
    /// HEAD - Like GET but without the response body
    HEAD,
    /// OPTIONS - Describe communication options
    OPTIONS,
    /// PATCH - Partial modification of a resource
    PATCH,
}

impl Method {
    /// Parses an HTTP method from a string.
    ///
    /// # Arguments
    ///
    /// * `s` - String representation of the method (case-sensitive, typically uppercase)
    ///
    /// # Returns
    ///
    /// `Some(Method)` if the string matches a known method, `None` otherwise.
    ///
    /// # Example
    ///
    /// ```
    /// # use ember::http::request::Method;
    /// assert_eq!(Method::from_str("GET"), Some(Method::GET));
    /// assert_eq!(Method::from_str("get"), None);
    /// ```
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "GET" => Some(Method::GET),
            "POST" => Some(Method::POST),
            "PUT" => Some(Method::PUT),
            "DELETE" => Some(Method::DELETE),
            "HEAD" => Some(Method::HEAD),
            "OPTIONS" => Some(Method::OPTIONS),
            "PATCH" => Some(Method::PATCH),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Method::GET => "GET",
            Method::POST => "POST",
            Method::PUT => "PUT",
            Method::DELETE => "DELETE",
            Method::HEAD => "HEAD",
            Method::OPTIONS => "OPTIONS",
            Method::PATCH => "PATCH",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Represents a parsed HTTP request from a client.
///
/// Immutable after parsing apart from two things: the typed
/// [`Extensions`] storage middleware use to hand data forward, and the path
/// parameters, which the router fills in once after a match.
#[derive(Debug)]
pub struct Request {
    /// The HTTP method (GET, POST, etc.)
    pub method: Method,
    /// The path component of the target, always starting with `/`
    pub path: String,
    /// Raw query component (without `?` and fragment), if any
    pub raw_query: Option<String>,
    /// HTTP version number, e.g. `1.1`
    pub version: String,
    /// Request headers, matched case-insensitively
    pub headers: Headers,
    /// Request body for POST/PUT requests
    pub body: Vec<u8>,
    /// Decoded query parameters
    pub query: HashMap<String, String>,
    params: PathParams,
    params_set: bool,
    extensions: Extensions,
}

/// Builder for constructing Request objects.
pub struct RequestBuilder {
    method: Option<Method>,
    target: Option<String>,
    version: Option<String>,
    headers: Headers,
    body: Vec<u8>,
}

impl RequestBuilder {
    pub fn new() -> Self {
        Self {
            method: None,
            target: None,
            version: None,
            headers: Headers::new(),
            body: Vec::new(),
        }
    }

    pub fn method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    /// Sets the request target; a `?query` suffix is split off and decoded.
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.target = Some(path.into());
        self
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key, value);
        self
    }

    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    pub fn build(self) -> Result<Request, &'static str> {
        let method = self.method.ok_or("method missing")?;
        let target = self.target.ok_or("path missing")?;
        if !target.starts_with('/') {
            return Err("path must start with '/'");
        }
        Ok(Request::new(
            method,
            &target,
            self.version.unwrap_or_else(|| "1.1".to_string()),
            self.headers,
            self.body,
        ))
    }
}

impl Default for RequestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl Request {
    /// Assembles a request from its parsed parts.
    ///
    /// `target` is the raw request target; its query component (up to any
    /// `#` fragment) is decoded into [`Request::query`].
    pub fn new(
        method: Method,
        target: &str,
        version: String,
        headers: Headers,
        body: Vec<u8>,
    ) -> Self {
        let target = match target.find('#') {
            Some(pos) => &target[..pos],
            None => target,
        };
        let (path, raw_query) = match target.split_once('?') {
            Some((path, q)) => (path.to_string(), Some(q.to_string())),
            None => (target.to_string(), None),
        };
        let query = raw_query
            .as_deref()
            .map(query::parse_query_string)
            .unwrap_or_default();

        Self {
            method,
            path,
            raw_query,
            version,
            headers,
            body,
            query,
            params: PathParams::new(),
            params_set: false,
            extensions: Extensions::new(),
        }
    }

    /// Retrieves a header value by name, ignoring ASCII case.
    ///
    /// # Arguments
    ///
    /// * `key` - Header name to look up
    ///
    /// # Returns
    ///
    /// `Some(&str)` with the header value if present, `None` otherwise.
    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers.get(key)
    }

    /// Retrieves the Content-Length header value and parses it as a usize.
    ///
    /// Returns 0 if the header is missing or not a valid number.
    pub fn content_length(&self) -> usize {
        self.header("Content-Length")
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(0)
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header("Content-Type")
    }

    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(|v| v.as_str())
    }

    /// Path parameters captured by the router. Empty until a route matched.
    pub fn params(&self) -> &PathParams {
        &self.params
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name)
    }

    /// Injects path parameters. Only the first call has any effect.
    pub fn set_path_params(&mut self, params: PathParams) -> bool {
        if self.params_set {
            return false;
        }
        self.params = params;
        self.params_set = true;
        true
    }

    pub fn extensions(&self) -> &Extensions {
        &self.extensions
    }

    pub fn extensions_mut(&mut self) -> &mut Extensions {
        &mut self.extensions
    }

    /// Body as UTF-8 text, if it is valid UTF-8.
    pub fn body_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.body).ok()
    }
}
