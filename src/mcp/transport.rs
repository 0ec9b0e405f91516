use async_trait::async_trait;
use serde_json::{json, Value};
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

use super::event_log::EventLog;
use super::server::McpServer;
use crate::error::TransportError;
use crate::registry::UpdateSink;

type CloseHook = Box<dyn FnOnce() -> Pin<Box<dyn Future<Output = ()> + Send>> + Send>;

/// Streamable-HTTP style transport for one session.
///
/// Requests arrive as single JSON bodies and are answered in the same
/// HTTP exchange; server-initiated messages go through the event log so
/// a client can pick them up (or replay them) on a separate connection.
/// The session id doubles as the event stream id.
pub struct StreamableHttpTransport {
    session_id: String,
    event_log: Arc<dyn EventLog>,
    closed: AtomicBool,
    on_close: Mutex<Option<CloseHook>>,
}

impl StreamableHttpTransport {
    pub fn new(session_id: String, event_log: Arc<dyn EventLog>) -> Self {
        Self {
            session_id,
            event_log,
            closed: AtomicBool::new(false),
            on_close: Mutex::new(None),
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Registers the hook run when the transport closes. The session
    /// store uses this to drop its record, so teardown needs no
    /// knowledge of who created the session.
    pub async fn on_close<F, Fut>(&self, hook: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        *self.on_close.lock().await = Some(Box::new(move || Box::pin(hook())));
    }

    /// Closes the transport and runs the close hook. Closing twice runs
    /// the hook once; later requests on this transport fail.
    pub async fn close(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        tracing::debug!(session_id = %self.session_id, "transport closed");
        let hook = self.on_close.lock().await.take();
        if let Some(hook) = hook {
            hook().await;
        }
    }

    /// Dispatches one client message through the session's protocol
    /// unit. `None` means the message was a notification and produced
    /// no response body.
    pub async fn handle_request(
        &self,
        server: &McpServer,
        message: Value,
    ) -> Result<Option<Value>, TransportError> {
        if self.is_closed() {
            return Err(TransportError::Closed);
        }
        Ok(server.handle_message(message).await)
    }

    /// Stores a server-initiated notification on this session's stream.
    pub async fn push_notification(
        &self,
        method: &str,
        params: Value,
    ) -> Result<(), TransportError> {
        if self.is_closed() {
            return Err(TransportError::Closed);
        }
        let message = json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
        });
        let event_id = self.event_log.store_event(&self.session_id, message).await;
        tracing::debug!(
            session_id = %self.session_id,
            event_id = %event_id,
            method = %method,
            "notification queued"
        );
        Ok(())
    }
}

/// Produces transports bound to a session id.
pub trait TransportFactory: Send + Sync {
    fn create(&self, session_id: &str) -> Arc<StreamableHttpTransport>;
}

/// Factory for streamable HTTP transports sharing one event log, so
/// replay works across the transports it hands out.
pub struct HttpTransportFactory {
    event_log: Arc<dyn EventLog>,
}

impl HttpTransportFactory {
    pub fn new(event_log: Arc<dyn EventLog>) -> Self {
        Self { event_log }
    }
}

impl TransportFactory for HttpTransportFactory {
    fn create(&self, session_id: &str) -> Arc<StreamableHttpTransport> {
        Arc::new(StreamableHttpTransport::new(
            session_id.to_string(),
            Arc::clone(&self.event_log),
        ))
    }
}

#[async_trait]
impl UpdateSink for StreamableHttpTransport {
    async fn resource_updated(&self, uri: &str, payload: Value) -> Result<(), TransportError> {
        self.push_notification(
            "notifications/resources/updated",
            json!({ "uri": uri, "updates": payload }),
        )
        .await
    }
}
