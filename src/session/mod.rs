use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::mcp::{McpServer, StreamableHttpTransport};

/// One live session: the protocol unit and transport bound to a user.
pub struct Session {
    pub session_id: String,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    pub server: Arc<McpServer>,
    pub transport: Arc<StreamableHttpTransport>,
}

/// Keyed store of live sessions.
///
/// `create` is idempotent: if the id is already present the stored
/// session is returned untouched and the caller's server and transport
/// are discarded. Check-then-insert happens under one write lock, so
/// two concurrent creates for the same id always converge on a single
/// session.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Produces a fresh, unguessable session id.
    fn generate_id(&self) -> String;

    async fn create(
        &self,
        session_id: &str,
        user_id: &str,
        server: Arc<McpServer>,
        transport: Arc<StreamableHttpTransport>,
    ) -> Arc<Session>;

    async fn restore(&self, session_id: &str) -> Option<Arc<Session>>;

    /// Removes the session if present. Deleting an unknown id is a no-op.
    async fn delete(&self, session_id: &str);
}

/// Session store backed by an in-process map. Sessions do not survive a
/// restart; clients recover by bootstrapping a new session.
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<String, Arc<Session>>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
        }
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    fn generate_id(&self) -> String {
        Uuid::new_v4().to_string()
    }

    async fn create(
        &self,
        session_id: &str,
        user_id: &str,
        server: Arc<McpServer>,
        transport: Arc<StreamableHttpTransport>,
    ) -> Arc<Session> {
        let mut sessions = self.sessions.write().await;
        if let Some(existing) = sessions.get(session_id) {
            tracing::debug!(session_id = %session_id, "session already exists, reusing");
            return Arc::clone(existing);
        }

        let session = Arc::new(Session {
            session_id: session_id.to_string(),
            user_id: user_id.to_string(),
            created_at: Utc::now(),
            server,
            transport,
        });
        sessions.insert(session_id.to_string(), Arc::clone(&session));
        tracing::info!(session_id = %session_id, user_id = %user_id, "session created");
        session
    }

    async fn restore(&self, session_id: &str) -> Option<Arc<Session>> {
        self.sessions.read().await.get(session_id).cloned()
    }

    async fn delete(&self, session_id: &str) {
        let removed = self.sessions.write().await.remove(session_id);
        if removed.is_some() {
            tracing::info!(session_id = %session_id, "session deleted");
        }
    }
}
