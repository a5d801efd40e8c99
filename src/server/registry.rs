//! Registry of open connections.
//!
//! Shared by the accept loop and every connection task. Inserts and
//! removals go through one mutex so concurrent disconnects cannot lose
//! updates.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use tokio::sync::Mutex;

/// Identifier assigned to a connection when it is registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(pub u64);

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// What the registry knows about an open connection.
#[derive(Debug, Clone)]
pub struct ConnectionInfo {
    pub peer: String,
    pub accepted_at: Instant,
}

#[derive(Debug, Clone, Default)]
pub struct ConnectionRegistry {
    inner: Arc<Mutex<HashMap<ConnectionId, ConnectionInfo>>>,
    next_id: Arc<AtomicU64>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn register(&self, peer: impl Into<String>) -> ConnectionId {
        let id = ConnectionId(self.next_id.fetch_add(1, Ordering::Relaxed) + 1);
        let info = ConnectionInfo {
            peer: peer.into(),
            accepted_at: Instant::now(),
        };
        self.inner.lock().await.insert(id, info);
        id
    }

    /// Removes `id`. Returns `false` if it was not registered.
    pub async fn unregister(&self, id: ConnectionId) -> bool {
        let removed = self.inner.lock().await.remove(&id);
        if let Some(info) = &removed {
            tracing::trace!(
                connection = %id,
                peer = %info.peer,
                open_ms = info.accepted_at.elapsed().as_millis() as u64,
                "Connection unregistered"
            );
        }
        removed.is_some()
    }

    pub async fn contains(&self, id: ConnectionId) -> bool {
        self.inner.lock().await.contains_key(&id)
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.is_empty()
    }

    pub async fn ids(&self) -> Vec<ConnectionId> {
        let mut ids: Vec<ConnectionId> = self.inner.lock().await.keys().copied().collect();
        ids.sort();
        ids
    }
}
