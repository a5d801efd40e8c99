//! Middleware pipeline.
//!
//! A chain is an ordered list of [`Middleware`] units run one at a time
//! against a single request/response pair. Each unit receives a [`Next`]
//! cursor; calling [`Next::proceed`] lets the chain move on to the
//! following unit. A unit that returns without proceeding ends the chain
//! quietly, having produced the response itself (CORS preflight, auth
//! rejection, route dispatch).
//!
//! ```text
//!  global units ──► scoped units (prefix / method) ──► RouteDispatch
//!       │ error: typed errors propagate, foreign errors become MiddlewareError
//!       ▼
//!  Error Mapper
//! ```
//!
//! After a chain ends without error, [`Middleware::finalize`] runs on every
//! unit that executed, last to first.

pub mod auth;
pub mod body;
pub mod cookies;
pub mod cors;
pub mod dispatch;
pub mod etag;
pub mod headers;
pub mod logging;

pub use auth::{BearerAuth, BearerToken};
pub use body::{BodyParser, ParsedBody};
pub use cookies::{CookieParser, Cookies, set_cookie};
pub use cors::Cors;
pub use dispatch::RouteDispatch;
pub use etag::ETag;
pub use headers::RequireHeaders;
pub use logging::{RequestLogger, RequestStart};

use std::sync::Arc;

use crate::error::{self, Error, Result};
use crate::http::request::{Method, Request};
use crate::http::response::Response;
use crate::router::path_has_prefix;

/// A unit of request processing.
///
/// Implementations are shared across requests and must not keep
/// per-request state in `self`; stash it in the request's extensions.
pub trait Middleware: Send + Sync {
    /// Name used in logs and in wrapped errors.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
            .rsplit("::")
            .next()
            .unwrap_or("middleware")
    }

    /// Processes the request. Call `next.proceed()` to continue the chain.
    fn execute(&self, req: &mut Request, res: &mut Response, next: &mut Next) -> Result<()>;

    /// Runs after a successful chain, in reverse order of execution.
    fn finalize(&self, _req: &Request, _res: &mut Response) {}
}

/// Continuation handed to each middleware.
#[derive(Debug, Default)]
pub struct Next {
    proceed: bool,
}

impl Next {
    /// Lets the chain continue with the following unit.
    pub fn proceed(&mut self) {
        self.proceed = true;
    }

    pub fn has_proceeded(&self) -> bool {
        self.proceed
    }
}

/// How a chain that did not fail came to an end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainOutcome {
    /// Every unit proceeded
    Exhausted,
    /// A unit returned without proceeding
    Halted { index: usize, middleware: String },
}

/// Restricts a middleware to a path prefix and/or a set of methods.
#[derive(Debug, Clone, Default)]
pub struct Scope {
    pub prefix: Option<String>,
    pub methods: Vec<Method>,
}

impl Scope {
    pub fn prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: Some(prefix.into()),
            methods: Vec::new(),
        }
    }

    pub fn methods(methods: impl IntoIterator<Item = Method>) -> Self {
        Self {
            prefix: None,
            methods: methods.into_iter().collect(),
        }
    }

    pub fn with_methods(mut self, methods: impl IntoIterator<Item = Method>) -> Self {
        self.methods = methods.into_iter().collect();
        self
    }

    /// Empty prefix and method list match everything.
    pub fn matches(&self, req: &Request) -> bool {
        let prefix_ok = self
            .prefix
            .as_deref()
            .is_none_or(|p| path_has_prefix(&req.path, p));
        let method_ok = self.methods.is_empty() || self.methods.contains(&req.method);
        prefix_ok && method_ok
    }
}

/// A middleware registered with a [`Scope`].
#[derive(Clone)]
pub struct ScopedMiddleware {
    pub scope: Scope,
    pub middleware: Arc<dyn Middleware>,
}

/// Ordered list of middleware for one request.
#[derive(Clone, Default)]
pub struct MiddlewareChain {
    units: Vec<Arc<dyn Middleware>>,
}

impl MiddlewareChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, middleware: Arc<dyn Middleware>) -> &mut Self {
        self.units.push(middleware);
        self
    }

    /// Inserts at `index`, clamped to the chain length.
    pub fn insert(&mut self, index: usize, middleware: Arc<dyn Middleware>) -> &mut Self {
        let index = index.min(self.units.len());
        self.units.insert(index, middleware);
        self
    }

    /// Removes every unit called `name`; returns whether any was removed.
    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.units.len();
        self.units.retain(|m| m.name() != name);
        before != self.units.len()
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.units.iter().map(|m| m.name()).collect()
    }

    /// Runs the chain.
    ///
    /// Stops at the first error: typed errors come back unchanged, foreign
    /// errors are wrapped as [`Error::MiddlewareError`] naming the unit.
    /// Either way the failure is logged with the unit's name.
    /// Finalizers run only when no error occurred.
    pub fn execute(&self, req: &mut Request, res: &mut Response) -> Result<ChainOutcome> {
        let mut outcome = ChainOutcome::Exhausted;
        let mut executed = 0;

        for (index, unit) in self.units.iter().enumerate() {
            let mut next = Next::default();
            executed = index + 1;

            if let Err(err) = unit.execute(req, res, &mut next) {
                let err = wrap_error(unit.name(), err);
                error::log_middleware_error(unit.name(), &err);
                return Err(err);
            }

            if !next.has_proceeded() {
                tracing::trace!(middleware = unit.name(), index, "Chain halted");
                outcome = ChainOutcome::Halted {
                    index,
                    middleware: unit.name().to_string(),
                };
                break;
            }
        }

        for unit in self.units[..executed].iter().rev() {
            unit.finalize(req, res);
        }

        Ok(outcome)
    }
}

fn wrap_error(middleware: &str, err: Error) -> Error {
    match err {
        Error::Unexpected(source) => Error::MiddlewareError {
            middleware: middleware.to_string(),
            message: format!("{source:#}"),
        },
        other => other,
    }
}
