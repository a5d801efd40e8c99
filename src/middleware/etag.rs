use sha2::{Digest, Sha256};

use crate::error::Result;
use crate::http::request::{Method, Request};
use crate::http::response::{Response, StatusCode};
use crate::middleware::{Middleware, Next};

/// Strong ETags for successful GET responses.
///
/// Works in the finalize phase: hashes the finished body, sets `ETag`, and
/// answers a matching `If-None-Match` with an empty 304.
#[derive(Debug, Default)]
pub struct ETag;

/// Quoted SHA-256 tag for `body`.
pub fn compute_etag(body: &[u8]) -> String {
    let digest = Sha256::digest(body);
    format!("\"{:x}\"", digest)
}

fn if_none_match_hits(header: &str, etag: &str) -> bool {
    header
        .split(',')
        .map(|t| t.trim().trim_start_matches("W/"))
        .any(|t| t == "*" || t == etag)
}

impl Middleware for ETag {
    fn execute(&self, _req: &mut Request, _res: &mut Response, next: &mut Next) -> Result<()> {
        next.proceed();
        Ok(())
    }

    fn finalize(&self, req: &Request, res: &mut Response) {
        if req.method != Method::GET || res.status != StatusCode::Ok || res.body.is_empty() {
            return;
        }

        let etag = compute_etag(&res.body);
        let not_modified = req
            .header("If-None-Match")
            .is_some_and(|h| if_none_match_hits(h, &etag));

        res.set_header("ETag", etag);
        if not_modified {
            res.set_status(StatusCode::NotModified);
            res.set_body(Vec::new());
        }
    }
}
