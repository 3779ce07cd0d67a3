use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{RwLock, broadcast};
use tracing::debug;

use crate::db::models::roadmap::Roadmap;

const DEFAULT_CAPACITY: usize = 16;

/// Change notification pushed to a user's live sessions.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum RoadmapEvent {
    /// Initial frame sent on subscribe
    Snapshot(Roadmap),
    Updated(Roadmap),
    /// The current document was removed (reset, path change, account deletion)
    Deleted,
    /// No document exists yet
    Missing,
    /// The document could not be loaded
    Error { message: String },
}

/// Per-user fan-out of roadmap changes.
#[derive(Clone)]
pub struct RoadmapFeed {
    channels: Arc<RwLock<HashMap<String, broadcast::Sender<RoadmapEvent>>>>,
    capacity: usize,
}

impl Default for RoadmapFeed {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl RoadmapFeed {
    pub fn new(capacity: usize) -> Self {
        Self {
            channels: Arc::new(RwLock::new(HashMap::new())),
            capacity: capacity.max(1),
        }
    }

    pub async fn subscribe(&self, user_id: &str) -> broadcast::Receiver<RoadmapEvent> {
        let mut channels = self.channels.write().await;
        channels
            .entry(user_id.to_string())
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .subscribe()
    }

    /// Delivers `event` to every live subscriber of `user_id`.
    /// Returns the number of receivers reached.
    pub async fn publish(&self, user_id: &str, event: RoadmapEvent) -> usize {
        let delivered = {
            let channels = self.channels.read().await;
            match channels.get(user_id) {
                Some(tx) => tx.send(event).unwrap_or(0),
                None => 0,
            }
        };

        if delivered == 0 {
            self.prune(user_id).await;
        }
        debug!(user_id = %user_id, delivered, "Roadmap event published");
        delivered
    }

    pub async fn subscriber_count(&self, user_id: &str) -> usize {
        self.channels
            .read()
            .await
            .get(user_id)
            .map(|tx| tx.receiver_count())
            .unwrap_or(0)
    }

    async fn prune(&self, user_id: &str) {
        let mut channels = self.channels.write().await;
        if channels
            .get(user_id)
            .is_some_and(|tx| tx.receiver_count() == 0)
        {
            channels.remove(user_id);
        }
    }
}
