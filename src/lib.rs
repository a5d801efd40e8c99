//! Ember - a small HTTP/1.1 server engine
//!
//! Core library: byte-stream handling, request parsing, routing with path
//! parameters, and the middleware pipeline with its error mapping.

pub mod config;
pub mod error;
pub mod http;
pub mod middleware;
pub mod router;
pub mod server;
pub mod static_files;

pub use error::{Error, Result};
pub use http::request::{Method, Request};
pub use http::response::{Response, StatusCode};
pub use middleware::{Middleware, Next};
pub use router::Router;
pub use server::{App, AppBuilder};
