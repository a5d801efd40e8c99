//! HTTP protocol implementation.
//!
//! This module implements a one-request-per-connection HTTP/1.1 server.
//!
//! # Architecture
//!
//! The HTTP layer is organized into several submodules:
//!
//! - **`connection`**: Owns an accepted stream: single read, parse, pipeline, write, close
//! - **`parser`**: Parses an HTTP request from a byte buffer
//! - **`request`**: HTTP request representation
//! - **`headers`**: Case-insensitive header map
//! - **`extensions`**: Typed per-request storage shared between middleware
//! - **`params`**: Ordered path parameters captured by the router
//! - **`query`**: Query string parsing and building
//! - **`response`**: HTTP response accumulator with builder pattern
//! - **`writer`**: Serializes and writes HTTP responses to the client
//! - **`mime`**: MIME type detection based on file extensions
//!
//! # Connection State Machine
//!
//! Each client connection goes through a state machine:
//!
//! ```text
//!        ┌─────────────┐
//!        │   Reading   │ ← One read of up to 4096 bytes
//!        └──────┬──────┘
//!               │ Request parsed        (parse error → error bytes → Writing)
//!               ▼
//!        ┌──────────────────┐
//!        │   Processing     │ ← Middleware chain + route dispatch
//!        └──────┬───────────┘
//!               │ Response ready
//!               ▼
//!        ┌──────────────────┐
//!        │    Writing       │ ← Send response to client
//!        └──────┬───────────┘
//!               │ Response sent
//!               ▼
//!            Closed            ← stream shut down, registry entry removed
//! ```
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use ember::server::{App, ConnectionRegistry, listener};
//! use tokio::net::TcpListener;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let listener = TcpListener::bind("127.0.0.1:8080").await?;
//!     let app = Arc::new(App::builder().build());
//!     listener::serve(listener, Default::default(), app, ConnectionRegistry::new()).await
//! }
//! ```

pub mod connection;
pub mod extensions;
pub mod headers;
pub mod mime;
pub mod params;
pub mod parser;
pub mod query;
pub mod request;
pub mod response;
pub mod writer;
