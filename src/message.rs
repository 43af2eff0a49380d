//! Chat message structures and delivery status tracking

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Author of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    /// The local user
    User,
    /// The assistant
    Ai,
}

/// Delivery status of a user-authored message
///
/// Only meaningful while a user message moves through its delivery
/// lifecycle; assistant messages carry no status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryStatus {
    /// Delivery attempt in progress
    Sending,
    /// Accepted by the delivery endpoint
    Sent,
    /// Last delivery attempt failed; the message is queued for retry
    Failed,
}

/// A single message in the conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    /// Server-assigned ID, present once the endpoint has persisted the message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Client-assigned ID, stable across queue persistence
    ///
    /// Used to correlate a queued message with its conversation entry when a
    /// later retry succeeds.
    #[serde(default = "Uuid::new_v4")]
    pub local_id: Uuid,
    /// Message content
    pub text: String,
    /// Message author
    pub sender: Sender,
    /// Creation time, assigned once when the message is first created
    pub timestamp: DateTime<Utc>,
    /// Delivery status; `None` for assistant messages
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_status: Option<DeliveryStatus>,
}

impl ChatMessage {
    /// Create a user message about to be submitted
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            id: None,
            local_id: Uuid::new_v4(),
            text: text.into(),
            sender: Sender::User,
            timestamp: Utc::now(),
            delivery_status: Some(DeliveryStatus::Sending),
        }
    }

    /// Create a locally synthesized assistant message
    pub fn ai(text: impl Into<String>) -> Self {
        Self {
            id: None,
            local_id: Uuid::new_v4(),
            text: text.into(),
            sender: Sender::Ai,
            timestamp: Utc::now(),
            delivery_status: None,
        }
    }

    /// Mark message as accepted by the delivery endpoint
    pub fn mark_sent(&mut self) {
        self.delivery_status = Some(DeliveryStatus::Sent);
    }

    /// Mark message as failed; it belongs in the pending queue
    pub fn mark_failed(&mut self) {
        self.delivery_status = Some(DeliveryStatus::Failed);
    }

    /// Get human-readable delivery status indicator
    pub fn status_indicator(&self) -> &str {
        match self.delivery_status {
            Some(DeliveryStatus::Sending) => "…",
            Some(DeliveryStatus::Sent) => "✓",
            Some(DeliveryStatus::Failed) => "✗",
            None => "",
        }
    }

    /// Get full status text for display
    pub fn status_text(&self) -> &str {
        match self.delivery_status {
            Some(DeliveryStatus::Sending) => "sending",
            Some(DeliveryStatus::Sent) => "sent",
            Some(DeliveryStatus::Failed) => "failed, queued for retry",
            None => "",
        }
    }
}
