use std::collections::HashSet;
use tokio::sync::RwLock;

/// Set of resource URIs with active update subscriptions.
///
/// Subscribing twice is the same as subscribing once; membership gates
/// whether an update notification is delivered at all. The tracker is
/// shared between the resource registry and every assembled unit, so
/// subscriptions made on one session's connection stay visible when the
/// registry pushes updates later.
pub struct SubscriptionTracker {
    uris: RwLock<HashSet<String>>,
}

impl SubscriptionTracker {
    pub fn new() -> Self {
        Self {
            uris: RwLock::new(HashSet::new()),
        }
    }

    /// Adds `uri` to the subscription set. Idempotent.
    pub async fn subscribe(&self, uri: &str) {
        self.uris.write().await.insert(uri.to_string());
    }

    pub async fn unsubscribe(&self, uri: &str) {
        self.uris.write().await.remove(uri);
    }

    pub async fn contains(&self, uri: &str) -> bool {
        self.uris.read().await.contains(uri)
    }
}

impl Default for SubscriptionTracker {
    fn default() -> Self {
        Self::new()
    }
}
