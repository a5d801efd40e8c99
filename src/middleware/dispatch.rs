//! Terminal unit of every chain: route lookup and handler invocation.

use std::sync::Arc;

use crate::error::{Error, Result};
use crate::http::mime;
use crate::http::request::{Method, Request};
use crate::http::response::{Response, StatusCode};
use crate::middleware::{Middleware, Next};
use crate::router::Router;
use crate::static_files::StaticResolver;

/// Looks the request up in the router and runs the matched handler.
///
/// Unmatched GET requests fall back to the static resolver, then to the
/// custom 404 page. Anything still unmatched is `RouteNotFound`. This unit
/// never proceeds.
pub struct RouteDispatch {
    router: Arc<Router>,
    static_files: Option<Arc<dyn StaticResolver>>,
    not_found_page: Option<String>,
}

impl RouteDispatch {
    pub fn new(router: Arc<Router>) -> Self {
        Self {
            router,
            static_files: None,
            not_found_page: None,
        }
    }

    pub fn with_static_files(mut self, resolver: Arc<dyn StaticResolver>) -> Self {
        self.static_files = Some(resolver);
        self
    }

    /// URL path of the page served for unmatched GET requests.
    pub fn with_not_found_page(mut self, page: impl Into<String>) -> Self {
        self.not_found_page = Some(page.into());
        self
    }

    fn serve_file(&self, url_path: &str, status: StatusCode, res: &mut Response) -> Result<bool> {
        let Some(resolver) = &self.static_files else {
            return Ok(false);
        };
        let Some(file) = resolver.resolve(url_path) else {
            return Ok(false);
        };

        let contents = std::fs::read(&file).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => Error::FileNotFound(file.display().to_string()),
            _ => Error::FileReadError(format!("{}: {}", file.display(), e)),
        })?;

        tracing::debug!(file = %file.display(), status = status.as_u16(), "Serving static file");
        res.set_status(status);
        res.set_header("Content-Type", mime::content_type_for(&file));
        res.set_body(contents);
        Ok(true)
    }
}

impl Middleware for RouteDispatch {
    fn name(&self) -> &str {
        "RouteDispatch"
    }

    fn execute(&self, req: &mut Request, res: &mut Response, _next: &mut Next) -> Result<()> {
        if let Some(matched) = self.router.find_route(req) {
            tracing::debug!(
                method = %req.method,
                path = %req.path,
                pattern = %matched.route.pattern,
                "Route matched"
            );
            req.set_path_params(matched.params);

            return matched.route.invoke(req, res).map_err(|err| match err {
                Error::Unexpected(source) => Error::RouteHandlerError(format!("{source:#}")),
                other => other,
            });
        }

        if req.method == Method::GET {
            if self.serve_file(&req.path, StatusCode::Ok, res)? {
                return Ok(());
            }
            if let Some(page) = &self.not_found_page {
                if self.serve_file(page, StatusCode::NotFound, res)? {
                    return Ok(());
                }
            }
        }

        Err(Error::RouteNotFound {
            method: req.method.to_string(),
            path: req.path.clone(),
        })
    }
}
