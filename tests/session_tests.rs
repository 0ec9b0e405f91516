//! Tests for the session store and the transport close lifecycle.

use serde_json::json;
use std::sync::Arc;

use vestibule::error::TransportError;
use vestibule::mcp::{InMemoryEventLog, McpServer, ServerAssembler, StreamableHttpTransport};
use vestibule::session::{InMemorySessionStore, SessionStore};

async fn bare_server(session_id: &str) -> Arc<McpServer> {
    let assembler = ServerAssembler::new("0.0.0", None);
    Arc::new(assembler.assemble("user-1", session_id).await)
}

fn transport(session_id: &str) -> Arc<StreamableHttpTransport> {
    Arc::new(StreamableHttpTransport::new(
        session_id.to_string(),
        Arc::new(InMemoryEventLog::new()),
    ))
}

#[tokio::test]
async fn generate_id_is_unique() {
    let store = InMemorySessionStore::new();
    let a = store.generate_id();
    let b = store.generate_id();
    assert_ne!(a, b);
}

#[tokio::test]
async fn create_then_restore_returns_the_same_session() {
    let store = InMemorySessionStore::new();
    let id = store.generate_id();
    let server = bare_server(&id).await;

    let created = store
        .create(&id, "user-1", server, transport(&id))
        .await;
    let restored = store.restore(&id).await.unwrap();
    assert!(Arc::ptr_eq(&created, &restored));
    assert_eq!(restored.user_id, "user-1");
}

#[tokio::test]
async fn create_is_idempotent_and_keeps_the_first_session() {
    let store = InMemorySessionStore::new();
    let id = store.generate_id();

    let first = store
        .create(&id, "user-1", bare_server(&id).await, transport(&id))
        .await;
    // Second create for the same id: arguments are discarded.
    let second = store
        .create(&id, "user-2", bare_server(&id).await, transport(&id))
        .await;

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(second.user_id, "user-1");
    assert_eq!(store.len().await, 1);
}

#[tokio::test]
async fn restore_unknown_id_returns_none() {
    let store = InMemorySessionStore::new();
    assert!(store.restore("missing").await.is_none());
}

#[tokio::test]
async fn delete_is_tolerant_of_unknown_ids() {
    let store = InMemorySessionStore::new();
    store.delete("missing").await;
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn closing_the_transport_deletes_the_session() {
    let store = Arc::new(InMemorySessionStore::new());
    let id = store.generate_id();
    let tx = transport(&id);

    {
        let store = Arc::clone(&store);
        let id = id.clone();
        tx.on_close(move || async move { store.delete(&id).await })
            .await;
    }

    store
        .create(&id, "user-1", bare_server(&id).await, Arc::clone(&tx))
        .await;
    assert_eq!(store.len().await, 1);

    tx.close().await;
    assert!(store.restore(&id).await.is_none());
}

#[tokio::test]
async fn closing_twice_runs_the_hook_once() {
    let store = Arc::new(InMemorySessionStore::new());
    let id = store.generate_id();
    let tx = transport(&id);

    let counter = Arc::new(std::sync::atomic::AtomicUsize::new(0));
    {
        let counter = Arc::clone(&counter);
        tx.on_close(move || async move {
            counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        })
        .await;
    }

    tx.close().await;
    tx.close().await;
    assert_eq!(counter.load(std::sync::atomic::Ordering::SeqCst), 1);
}

#[tokio::test]
async fn requests_on_a_closed_transport_fail() {
    let id = "session-1";
    let tx = transport(id);
    let server = bare_server(id).await;

    tx.close().await;
    let err = tx
        .handle_request(&server, json!({"jsonrpc": "2.0", "id": 1, "method": "ping"}))
        .await
        .unwrap_err();
    assert!(matches!(err, TransportError::Closed));
}

#[tokio::test]
async fn open_transport_dispatches_to_the_server() {
    let id = "session-1";
    let tx = transport(id);
    let server = bare_server(id).await;

    let reply = tx
        .handle_request(&server, json!({"jsonrpc": "2.0", "id": 7, "method": "ping"}))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(reply["id"], 7);
    assert_eq!(reply["result"], json!({}));
}
