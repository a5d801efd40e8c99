//! Application: routes, middleware and static files, assembled per request.

use std::sync::Arc;

use crate::error::{self, Error, Result};
use crate::http::request::Request;
use crate::http::response::Response;
use crate::middleware::{
    ChainOutcome, Middleware, MiddlewareChain, RouteDispatch, Scope, ScopedMiddleware,
};
use crate::router::Router;
use crate::static_files::StaticResolver;

/// Builder for an [`App`].
#[derive(Default)]
pub struct AppBuilder {
    router: Router,
    global: Vec<Arc<dyn Middleware>>,
    scoped: Vec<ScopedMiddleware>,
    static_files: Option<Arc<dyn StaticResolver>>,
    not_found_page: Option<String>,
}

impl AppBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Gives access to the router for registering routes.
    pub fn router(&mut self) -> &mut Router {
        &mut self.router
    }

    pub fn with_router(mut self, router: Router) -> Self {
        self.router = router;
        self
    }

    /// Middleware run for every request, in registration order.
    pub fn wrap<M: Middleware + 'static>(mut self, middleware: M) -> Self {
        self.global.push(Arc::new(middleware));
        self
    }

    /// Middleware run only for requests matching `scope`, after all global ones.
    pub fn wrap_scoped<M: Middleware + 'static>(mut self, scope: Scope, middleware: M) -> Self {
        self.scoped.push(ScopedMiddleware {
            scope,
            middleware: Arc::new(middleware),
        });
        self
    }

    pub fn static_files<R: StaticResolver + 'static>(mut self, resolver: R) -> Self {
        self.static_files = Some(Arc::new(resolver));
        self
    }

    pub fn not_found_page(mut self, page: impl Into<String>) -> Self {
        self.not_found_page = Some(page.into());
        self
    }

    pub fn build(self) -> App {
        let mut dispatch = RouteDispatch::new(Arc::new(self.router));
        if let Some(resolver) = self.static_files {
            dispatch = dispatch.with_static_files(resolver);
        }
        if let Some(page) = self.not_found_page {
            dispatch = dispatch.with_not_found_page(page);
        }

        App {
            global: self.global,
            scoped: self.scoped,
            dispatch: Arc::new(dispatch),
        }
    }
}

/// Read-only request pipeline shared by all connections.
pub struct App {
    global: Vec<Arc<dyn Middleware>>,
    scoped: Vec<ScopedMiddleware>,
    dispatch: Arc<dyn Middleware>,
}

impl App {
    pub fn builder() -> AppBuilder {
        AppBuilder::new()
    }

    /// Chain for `req`: global units, matching scoped units, dispatch.
    pub fn chain_for(&self, req: &Request) -> MiddlewareChain {
        let mut chain = MiddlewareChain::new();
        for unit in &self.global {
            chain.push(Arc::clone(unit));
        }
        for scoped in self.scoped.iter().filter(|s| s.scope.matches(req)) {
            chain.push(Arc::clone(&scoped.middleware));
        }
        chain.push(Arc::clone(&self.dispatch));
        chain
    }

    /// Runs the pipeline, leaving errors to the caller.
    pub fn execute(&self, req: &mut Request, res: &mut Response) -> Result<ChainOutcome> {
        self.chain_for(req).execute(req, res)
    }

    /// Produces the response for `req`, mapping any error into it.
    pub fn handle(&self, mut req: Request) -> Response {
        let mut res = Response::new();
        if let Err(err) = self.execute(&mut req, &mut res) {
            Self::report(&err, &req);
            error::apply_error(&err, &mut res);
        }
        res
    }

    // the chain already logged the failing unit
    fn report(err: &Error, req: &Request) {
        tracing::debug!(
            method = %req.method,
            path = %req.path,
            kind = err.kind(),
            "Pipeline aborted"
        );
    }
}
