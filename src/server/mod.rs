//! Server runtime: the accept loop, the shared application pipeline, and
//! the registry of open connections.

pub mod app;
pub mod listener;
pub mod registry;

pub use app::{App, AppBuilder};
pub use registry::{ConnectionId, ConnectionRegistry};
