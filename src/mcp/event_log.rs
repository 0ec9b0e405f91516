use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Opaque identifier of one stored event.
pub type EventId = String;

/// Identifier of the stream an event belongs to. One stream per session.
pub type StreamId = String;

/// Append-only log of server-to-client messages, keyed per stream, so a
/// client that reconnects can resume delivery from the last event it saw.
#[async_trait]
pub trait EventLog: Send + Sync {
    /// Appends `message` to `stream_id`'s stream and returns the id
    /// assigned to the stored event.
    async fn store_event(&self, stream_id: &str, message: Value) -> EventId;

    /// Returns every event stored after `last_event_id` on the same
    /// stream, oldest first, along with the stream id. `None` when the
    /// event id is unknown.
    async fn replay_events_after(
        &self,
        last_event_id: &str,
    ) -> Option<(StreamId, Vec<(EventId, Value)>)>;

    /// Returns the full stream for `stream_id`, oldest first.
    async fn replay_stream(&self, stream_id: &str) -> Vec<(EventId, Value)>;
}

struct StoredEvent {
    id: EventId,
    stream_id: StreamId,
    message: Value,
}

/// Event log backed by a plain in-process vector. Suitable for a single
/// gateway instance; nothing is persisted across restarts.
pub struct InMemoryEventLog {
    events: RwLock<Vec<StoredEvent>>,
}

impl InMemoryEventLog {
    pub fn new() -> Self {
        Self {
            events: RwLock::new(Vec::new()),
        }
    }
}

impl Default for InMemoryEventLog {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventLog for InMemoryEventLog {
    async fn store_event(&self, stream_id: &str, message: Value) -> EventId {
        let id = Uuid::new_v4().to_string();
        let mut events = self.events.write().await;
        events.push(StoredEvent {
            id: id.clone(),
            stream_id: stream_id.to_string(),
            message,
        });
        tracing::debug!(event_id = %id, stream_id = %stream_id, "event stored");
        id
    }

    async fn replay_events_after(
        &self,
        last_event_id: &str,
    ) -> Option<(StreamId, Vec<(EventId, Value)>)> {
        let events = self.events.read().await;
        let position = events.iter().position(|e| e.id == last_event_id)?;
        let stream_id = events[position].stream_id.clone();
        let replayed = events[position + 1..]
            .iter()
            .filter(|e| e.stream_id == stream_id)
            .map(|e| (e.id.clone(), e.message.clone()))
            .collect();
        Some((stream_id, replayed))
    }

    async fn replay_stream(&self, stream_id: &str) -> Vec<(EventId, Value)> {
        let events = self.events.read().await;
        events
            .iter()
            .filter(|e| e.stream_id == stream_id)
            .map(|e| (e.id.clone(), e.message.clone()))
            .collect()
    }
}
