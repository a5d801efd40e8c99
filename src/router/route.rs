//! Compiled routes and route matches.

use std::fmt;
use std::sync::Arc;

use crate::error::Result;
use crate::http::params::PathParams;
use crate::http::request::{Method, Request};
use crate::http::response::Response;

/// Route handler: reads the request and fills in the response.
pub type Handler = Arc<dyn Fn(&Request, &mut Response) -> Result<()> + Send + Sync>;

/// One `/`-separated piece of a route pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Must equal the request segment exactly
    Literal(String),
    /// `{name}`: captures the request segment under `name`
    Param(String),
}

/// Splits a path into its non-empty segments.
pub(crate) fn path_segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

/// True when `prefix` covers `path` on a segment boundary: `/api` covers
/// `/api` and `/api/users` but not `/apiary`.
pub fn path_has_prefix(path: &str, prefix: &str) -> bool {
    path.strip_prefix(prefix)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/') || prefix.ends_with('/'))
}

/// Compiles a pattern such as `/users/{id}/posts` into segments.
pub fn compile_pattern(pattern: &str) -> Vec<Segment> {
    path_segments(pattern)
        .map(|seg| {
            match seg.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
                Some(name) if !name.is_empty() => Segment::Param(name.to_string()),
                _ => Segment::Literal(seg.to_string()),
            }
        })
        .collect()
}

/// A registered route. Immutable once compiled.
#[derive(Clone)]
pub struct Route {
    pub method: Method,
    pub pattern: String,
    pub segments: Vec<Segment>,
    pub(crate) handler: Handler,
}

impl Route {
    pub fn new(method: Method, pattern: impl Into<String>, handler: Handler) -> Self {
        let pattern = pattern.into();
        let segments = compile_pattern(&pattern);
        Self {
            method,
            pattern,
            segments,
            handler,
        }
    }

    /// Names of the `{name}` segments, in pattern order.
    pub fn param_names(&self) -> Vec<&str> {
        self.segments
            .iter()
            .filter_map(|s| match s {
                Segment::Param(name) => Some(name.as_str()),
                Segment::Literal(_) => None,
            })
            .collect()
    }

    /// Matches `path` against this route's segments, capturing parameters.
    pub fn match_path(&self, path: &str) -> Option<PathParams> {
        let parts: Vec<&str> = path_segments(path).collect();
        if parts.len() != self.segments.len() {
            return None;
        }

        let mut params = PathParams::new();
        for (segment, part) in self.segments.iter().zip(parts) {
            match segment {
                Segment::Literal(lit) if lit == part => {}
                Segment::Literal(_) => return None,
                Segment::Param(name) => {
                    params.push(name.as_str(), part);
                }
            }
        }
        Some(params)
    }

    /// Runs the handler.
    pub fn invoke(&self, req: &Request, res: &mut Response) -> Result<()> {
        (self.handler)(req, res)
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("method", &self.method)
            .field("pattern", &self.pattern)
            .field("segments", &self.segments)
            .finish_non_exhaustive()
    }
}

/// A route paired with the parameters extracted for one request.
#[derive(Debug)]
pub struct RouteMatch<'a> {
    pub route: &'a Route,
    pub params: PathParams,
}
