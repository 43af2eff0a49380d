//! High-level chat messaging
//!
//! This module combines the delivery endpoint, pending queue and
//! connectivity signal into the offline-resilient submitter: a message the
//! user submits is either delivered and recorded, or retained in the
//! persisted queue for a later drain - never silently lost. Delivery
//! failures are absorbed here; nothing in this module returns an error to
//! the caller.

use crate::api::ChatApi;
use crate::connectivity::ConnectivitySignal;
use crate::fallback;
use crate::message::ChatMessage;
use crate::queue::PendingQueue;
use crate::store::LocalStore;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::{Mutex, watch};
use tracing::{debug, info, warn};

/// Offline-resilient message submitter for one chat session
///
/// Cloning is cheap; clones share the conversation, the pending queue and
/// the sync guard, so a clone handed to a background task stays coherent
/// with the one driving the UI.
pub struct ChatController<A, S, C> {
    api: A,
    connectivity: C,
    sender_id: String,
    conversation: Arc<Mutex<Vec<ChatMessage>>>,
    queue: PendingQueue<S>,
    sync_in_flight: Arc<AtomicBool>,
}

impl<A: Clone, S, C: Clone> Clone for ChatController<A, S, C> {
    fn clone(&self) -> Self {
        Self {
            api: self.api.clone(),
            connectivity: self.connectivity.clone(),
            sender_id: self.sender_id.clone(),
            conversation: self.conversation.clone(),
            queue: self.queue.clone(),
            sync_in_flight: self.sync_in_flight.clone(),
        }
    }
}

impl<A, S, C> ChatController<A, S, C>
where
    A: ChatApi,
    S: LocalStore,
    C: ConnectivitySignal,
{
    /// Create a controller for a sender over injected collaborators
    pub fn new(
        api: A,
        store: Arc<Mutex<S>>,
        connectivity: C,
        sender_id: impl Into<String>,
    ) -> Self {
        Self {
            api,
            connectivity,
            sender_id: sender_id.into(),
            conversation: Arc::new(Mutex::new(Vec::new())),
            queue: PendingQueue::new(store),
            sync_in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Sender this controller submits for
    pub fn sender_id(&self) -> &str {
        &self.sender_id
    }

    /// Pending queue for this session
    pub fn queue(&self) -> &PendingQueue<S> {
        &self.queue
    }

    /// Snapshot of the visible conversation
    pub async fn conversation(&self) -> Vec<ChatMessage> {
        self.conversation.lock().await.clone()
    }

    /// Initialize the session
    ///
    /// Seeds the conversation from server history, then drains the pending
    /// queue once if the connection is up.
    pub async fn start(&self) {
        let history = self.fetch_history().await;
        *self.conversation.lock().await = history;

        if self.connectivity.is_online() {
            self.sync().await;
        }
    }

    /// Submit a user message
    ///
    /// The message appears in the conversation immediately with a `Sending`
    /// status, then exactly one delivery attempt is made. On failure the
    /// message is queued for retry and a locally synthesized reply is
    /// appended. Blank input is ignored.
    pub async fn submit(&self, text: &str) {
        let text = text.trim();
        if text.is_empty() {
            return;
        }

        let message = ChatMessage::user(text);
        let local_id = message.local_id;
        self.conversation.lock().await.push(message.clone());

        if !self.connectivity.is_online() {
            debug!(
                "Offline, queueing message {} without a delivery attempt",
                local_id
            );
            self.record_failure(message).await;
            return;
        }

        match self.api.send_message(&self.sender_id, text).await {
            Ok(reply) => {
                info!("Message {} delivered for {}", local_id, self.sender_id);
                let mut conversation = self.conversation.lock().await;
                if let Some(entry) = conversation.iter_mut().find(|m| m.local_id == local_id) {
                    entry.mark_sent();
                }
                conversation.push(reply);
            }
            Err(e) => {
                warn!(
                    "Failed to deliver message {} for {}: {}. Queueing for retry.",
                    local_id, self.sender_id, e
                );
                self.record_failure(message).await;
            }
        }
    }

    /// Drain the pending queue, oldest first
    ///
    /// A pass already in flight makes this call a no-op (dropped, not
    /// queued). Attempts are serialized in original creation order and every
    /// entry is tried regardless of earlier outcomes; messages that still
    /// fail stay queued. Draining the last entry removes the persisted key.
    pub async fn sync(&self) {
        if self
            .sync_in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            debug!("Sync already in flight, skipping");
            return;
        }

        self.drain_pending().await;

        self.sync_in_flight.store(false, Ordering::SeqCst);
    }

    /// Fetch recent history, sorted ascending by timestamp
    ///
    /// The server does not guarantee order; the sort is stable, so records
    /// with equal timestamps keep their arrival order. Any error yields an
    /// empty history - an empty conversation and a failed fetch are
    /// indistinguishable to the caller.
    pub async fn fetch_history(&self) -> Vec<ChatMessage> {
        match self.api.fetch_history(&self.sender_id).await {
            Ok(mut messages) => {
                messages.sort_by_key(|m| m.timestamp);
                messages
            }
            Err(e) => {
                warn!("Failed to fetch history for {}: {}", self.sender_id, e);
                Vec::new()
            }
        }
    }

    /// Mark a failed message, queue it and append the fallback reply
    async fn record_failure(&self, mut message: ChatMessage) {
        message.mark_failed();
        let reply = ChatMessage::ai(fallback::fallback_reply(&message.text));

        {
            let mut conversation = self.conversation.lock().await;
            if let Some(entry) = conversation
                .iter_mut()
                .find(|m| m.local_id == message.local_id)
            {
                entry.mark_failed();
            }
        }

        if let Err(e) = self.queue.append(message).await {
            warn!("Failed to persist pending message: {}", e);
        }

        self.conversation.lock().await.push(reply);
    }

    /// One full drain pass; caller holds the in-flight guard
    async fn drain_pending(&self) {
        let pending = match self.queue.load().await {
            Ok(pending) => pending,
            Err(e) => {
                warn!("Failed to load pending queue: {}", e);
                return;
            }
        };

        if pending.is_empty() {
            return;
        }

        info!(
            "Syncing {} pending message(s) for {}",
            pending.len(),
            self.sender_id
        );

        let mut still_pending = Vec::new();
        let mut delivered = 0usize;

        for message in pending {
            match self.api.send_message(&self.sender_id, &message.text).await {
                Ok(reply) => {
                    delivered += 1;
                    let mut conversation = self.conversation.lock().await;
                    if let Some(entry) = conversation
                        .iter_mut()
                        .find(|m| m.local_id == message.local_id)
                    {
                        entry.mark_sent();
                    }
                    conversation.push(reply);
                }
                Err(e) => {
                    warn!("Retry failed for message {}: {}", message.local_id, e);
                    still_pending.push(message);
                }
            }
        }

        info!(
            "Sync complete for {}: {} delivered, {} still pending",
            self.sender_id,
            delivered,
            still_pending.len()
        );

        if let Err(e) = self.queue.replace(&still_pending).await {
            warn!("Failed to persist pending queue: {}", e);
        }
    }
}

/// Drain the pending queue on every offline-to-online transition
///
/// Edge-triggered off the connectivity monitor's watch channel; returns
/// when the monitor side of the channel is dropped.
pub async fn run_sync_on_reconnect<A, S, C>(
    controller: ChatController<A, S, C>,
    mut online: watch::Receiver<bool>,
) where
    A: ChatApi,
    S: LocalStore,
    C: ConnectivitySignal,
{
    while online.changed().await.is_ok() {
        if *online.borrow_and_update() {
            controller.sync().await;
        }
    }
}
