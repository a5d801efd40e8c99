use ember::server::{ConnectionId, ConnectionRegistry};

#[tokio::test]
async fn test_register_assigns_increasing_ids() {
    let registry = ConnectionRegistry::new();

    let a = registry.register("10.0.0.1:1000").await;
    let b = registry.register("10.0.0.2:1000").await;

    assert_eq!(a, ConnectionId(1));
    assert_eq!(b, ConnectionId(2));
    assert_eq!(a.to_string(), "conn-1");
    assert_eq!(registry.ids().await, vec![a, b]);
}

#[tokio::test]
async fn test_unregister_is_idempotent() {
    let registry = ConnectionRegistry::new();
    let id = registry.register("peer").await;

    assert!(registry.contains(id).await);
    assert!(registry.unregister(id).await);
    assert!(!registry.unregister(id).await);
    assert!(registry.is_empty().await);
}

#[tokio::test]
async fn test_clones_share_state() {
    let registry = ConnectionRegistry::new();
    let clone = registry.clone();

    let id = clone.register("peer").await;
    assert_eq!(registry.len().await, 1);

    registry.unregister(id).await;
    assert!(clone.is_empty().await);
}

#[tokio::test]
async fn test_concurrent_disconnects_lose_nothing() {
    let registry = ConnectionRegistry::new();
    let mut ids = Vec::new();
    for n in 0..50 {
        ids.push(registry.register(format!("peer-{n}")).await);
    }

    let tasks: Vec<_> = ids
        .into_iter()
        .map(|id| {
            let registry = registry.clone();
            tokio::spawn(async move { registry.unregister(id).await })
        })
        .collect();

    for task in tasks {
        assert!(task.await.unwrap());
    }
    assert!(registry.is_empty().await);
}
