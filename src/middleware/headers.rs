use crate::error::{Error, Result};
use crate::http::request::Request;
use crate::http::response::Response;
use crate::middleware::{Middleware, Next};

/// Rejects requests missing any of the listed headers.
#[derive(Debug, Clone)]
pub struct RequireHeaders {
    names: Vec<String>,
}

impl RequireHeaders {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }
}

impl Middleware for RequireHeaders {
    fn execute(&self, req: &mut Request, _res: &mut Response, next: &mut Next) -> Result<()> {
        let missing: Vec<String> = self
            .names
            .iter()
            .filter(|name| !req.headers.contains(name))
            .cloned()
            .collect();

        if !missing.is_empty() {
            return Err(Error::MissingRequiredHeaders(missing));
        }

        next.proceed();
        Ok(())
    }
}
