//! Pending message queue
//!
//! This module persists user messages whose delivery failed:
//! - Ordered retry queue, oldest first
//! - Single well-known key in the durable local store
//! - An empty queue and an absent key are the same state
//!
//! The queue is drained by [`crate::messaging::ChatController::sync`].

use crate::Result;
use crate::message::ChatMessage;
use crate::store::LocalStore;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::warn;

/// Store key holding the serialized pending queue
pub const PENDING_QUEUE_KEY: &str = "healthx.pending_messages";

/// Ordered retry queue over a durable local store
///
/// All updates are read-modify-write under the store lock, so an append
/// racing a drain cannot lose entries.
pub struct PendingQueue<S> {
    store: Arc<Mutex<S>>,
}

impl<S> Clone for PendingQueue<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
        }
    }
}

impl<S: LocalStore> PendingQueue<S> {
    /// Create a queue over a shared store handle
    pub fn new(store: Arc<Mutex<S>>) -> Self {
        Self { store }
    }

    /// Load the pending set, oldest first
    ///
    /// A missing key is an empty queue. A corrupt payload is logged and
    /// treated as empty; the next write replaces it.
    pub async fn load(&self) -> Result<Vec<ChatMessage>> {
        let store = self.store.lock().await;
        read_pending(&*store)
    }

    /// Append a message to the pending set
    pub async fn append(&self, message: ChatMessage) -> Result<()> {
        let mut store = self.store.lock().await;
        let mut pending = read_pending(&*store)?;
        pending.push(message);
        let raw = serde_json::to_string(&pending)?;
        store.set(PENDING_QUEUE_KEY, &raw)
    }

    /// Replace the pending set with the outcome of a drain pass
    ///
    /// An empty set removes the key entirely; an empty array is never
    /// persisted.
    pub async fn replace(&self, messages: &[ChatMessage]) -> Result<()> {
        let mut store = self.store.lock().await;
        if messages.is_empty() {
            store.remove(PENDING_QUEUE_KEY)
        } else {
            let raw = serde_json::to_string(messages)?;
            store.set(PENDING_QUEUE_KEY, &raw)
        }
    }

    /// Number of queued messages
    pub async fn len(&self) -> Result<usize> {
        Ok(self.load().await?.len())
    }

    /// Whether the queue holds no messages
    pub async fn is_empty(&self) -> Result<bool> {
        Ok(self.load().await?.is_empty())
    }
}

/// Read and deserialize the pending set under an already-held store lock
fn read_pending<S: LocalStore>(store: &S) -> Result<Vec<ChatMessage>> {
    let Some(raw) = store.get(PENDING_QUEUE_KEY)? else {
        return Ok(Vec::new());
    };
    match serde_json::from_str(&raw) {
        Ok(messages) => Ok(messages),
        Err(e) => {
            warn!("Corrupt pending queue payload, treating as empty: {}", e);
            Ok(Vec::new())
        }
    }
}
