use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;

use crate::config::Config;
use crate::http::connection::{Connection, ConnectionLimits};
use crate::server::app::App;
use crate::server::registry::ConnectionRegistry;

/// Accept loop: one task per connection.
pub async fn run(cfg: &Config, app: Arc<App>, registry: ConnectionRegistry) -> anyhow::Result<()> {
    let listener = TcpListener::bind(&cfg.server.listen_addr).await?;
    info!("Listening on {}", cfg.server.listen_addr);

    serve(listener, cfg.limits(), app, registry).await
}

/// Serves connections from an already bound listener.
pub async fn serve(
    listener: TcpListener,
    limits: ConnectionLimits,
    app: Arc<App>,
    registry: ConnectionRegistry,
) -> anyhow::Result<()> {
    loop {
        let (socket, peer) = listener.accept().await?;
        let id = registry.register(peer.to_string()).await;
        info!(connection = %id, %peer, "Accepted connection");

        let conn = Connection::new(id, socket, Arc::clone(&app), registry.clone(), limits);
        tokio::spawn(async move {
            if let Err(e) = conn.run().await {
                tracing::debug!(connection = %id, %peer, error = %e, "Connection ended with error");
            }
        });
    }
}
