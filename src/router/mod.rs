//! Pattern-based routing.
//!
//! Routes are kept in registration order and searched front to back; the
//! first route whose method and segments match wins, regardless of how
//! specific later routes are. Register specific patterns before general
//! ones. Duplicate registrations are not merged.
//!
//! The router has no internal locking. Configure it fully before serving
//! traffic; the server shares it read-only afterwards.

pub mod route;

pub use route::{Handler, Route, RouteMatch, Segment, path_has_prefix};

use std::sync::Arc;

use crate::error::Result;
use crate::http::request::{Method, Request};
use crate::http::response::Response;

#[derive(Debug, Default, Clone)]
pub struct Router {
    routes: Vec<Route>,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compiles `pattern` and appends the route.
    pub fn add_route<F>(&mut self, method: Method, pattern: &str, handler: F) -> &mut Self
    where
        F: Fn(&Request, &mut Response) -> Result<()> + Send + Sync + 'static,
    {
        let route = Route::new(method, pattern, Arc::new(handler));
        tracing::debug!(method = %method, pattern, "Registered route");
        self.routes.push(route);
        self
    }

    pub fn get<F>(&mut self, pattern: &str, handler: F) -> &mut Self
    where
        F: Fn(&Request, &mut Response) -> Result<()> + Send + Sync + 'static,
    {
        self.add_route(Method::GET, pattern, handler)
    }

    pub fn post<F>(&mut self, pattern: &str, handler: F) -> &mut Self
    where
        F: Fn(&Request, &mut Response) -> Result<()> + Send + Sync + 'static,
    {
        self.add_route(Method::POST, pattern, handler)
    }

    pub fn put<F>(&mut self, pattern: &str, handler: F) -> &mut Self
    where
        F: Fn(&Request, &mut Response) -> Result<()> + Send + Sync + 'static,
    {
        self.add_route(Method::PUT, pattern, handler)
    }

    pub fn delete<F>(&mut self, pattern: &str, handler: F) -> &mut Self
    where
        F: Fn(&Request, &mut Response) -> Result<()> + Send + Sync + 'static,
    {
        self.add_route(Method::DELETE, pattern, handler)
    }

    pub fn patch<F>(&mut self, pattern: &str, handler: F) -> &mut Self
    where
        F: Fn(&Request, &mut Response) -> Result<()> + Send + Sync + 'static,
    {
        self.add_route(Method::PATCH, pattern, handler)
    }

    /// First route matching the request's method and path.
    pub fn find_route(&self, request: &Request) -> Option<RouteMatch<'_>> {
        self.find(request.method, &request.path)
    }

    pub fn find(&self, method: Method, path: &str) -> Option<RouteMatch<'_>> {
        self.routes
            .iter()
            .filter(|route| route.method == method)
            .find_map(|route| {
                route
                    .match_path(path)
                    .map(|params| RouteMatch { route, params })
            })
    }

    /// Removes every route registered with `pattern`, restricted to
    /// `method` when given. Returns how many were removed.
    pub fn remove_routes(&mut self, method: Option<Method>, pattern: &str) -> usize {
        let before = self.routes.len();
        self.routes.retain(|route| {
            let same_method = method.is_none_or(|m| m == route.method);
            !(same_method && route.pattern == pattern)
        });
        before - self.routes.len()
    }

    pub fn clear_routes(&mut self) {
        self.routes.clear();
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
