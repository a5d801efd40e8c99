use std::time::Instant;

use crate::error::Result;
use crate::http::request::Request;
use crate::http::response::Response;
use crate::middleware::{Middleware, Next};

/// When the request entered the chain.
#[derive(Debug, Clone, Copy)]
pub struct RequestStart(pub Instant);

/// Access log: one line when the request arrives, one when it completes.
#[derive(Debug, Default)]
pub struct RequestLogger;

impl Middleware for RequestLogger {
    fn execute(&self, req: &mut Request, _res: &mut Response, next: &mut Next) -> Result<()> {
        tracing::info!(
            method = %req.method,
            path = %req.path,
            version = %req.version,
            "Request received"
        );
        req.extensions_mut().insert(RequestStart(Instant::now()));
        next.proceed();
        Ok(())
    }

    fn finalize(&self, req: &Request, res: &mut Response) {
        let elapsed_ms = req
            .extensions()
            .get::<RequestStart>()
            .map(|start| start.0.elapsed().as_secs_f64() * 1000.0)
            .unwrap_or_default();

        tracing::info!(
            method = %req.method,
            path = %req.path,
            status = res.status.as_u16(),
            elapsed_ms,
            "Request completed"
        );
    }
}
