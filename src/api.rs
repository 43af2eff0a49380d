//! HTTP client for the HealthX chat backend
//!
//! This module handles the two remote endpoints the submitter consumes:
//! - `POST /chat/send` - deliver a user message, returns the assistant reply
//! - `GET /chat/history/{senderId}` - recent messages, unsorted, bounded
//!
//! Both are plain request/response JSON calls; any transport error or
//! non-success status surfaces as [`Error::Delivery`] and is handled by the
//! caller's queue-and-retry path.

use crate::message::ChatMessage;
use crate::{Error, Result};
use async_trait::async_trait;
use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::{Method, Request};
use hyper_util::client::legacy::Client;
use hyper_util::client::legacy::connect::HttpConnector;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Request body for the delivery endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendRequest {
    /// Identifier of the submitting user
    pub sender_id: String,
    /// Message content
    pub text: String,
}

/// Success body returned by the delivery endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendResponse {
    /// The generated assistant reply, with its server-assigned id
    pub message: ChatMessage,
}

/// Success body returned by the history endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryResponse {
    /// Recent messages for the sender; the server does not guarantee order
    pub messages: Vec<ChatMessage>,
}

/// Remote chat endpoints consumed by the submitter
#[async_trait]
pub trait ChatApi: Send + Sync {
    /// Deliver a user message; returns the generated assistant reply
    async fn send_message(&self, sender_id: &str, text: &str) -> Result<ChatMessage>;

    /// Fetch recent messages for a sender (unsorted, bounded count)
    async fn fetch_history(&self, sender_id: &str) -> Result<Vec<ChatMessage>>;
}

/// HTTP client for the chat backend
#[derive(Clone)]
pub struct ApiClient {
    /// Backend base URL, without trailing slash
    base_url: String,
    /// HTTP client for sending requests
    client: Client<HttpConnector, Full<Bytes>>,
}

impl ApiClient {
    /// Create a client for a backend base URL (e.g. `http://localhost:5000/api`)
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = Client::builder(hyper_util::rt::TokioExecutor::new()).build_http();
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }

        Self { base_url, client }
    }

    /// The backend base URL this client talks to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl ChatApi for ApiClient {
    async fn send_message(&self, sender_id: &str, text: &str) -> Result<ChatMessage> {
        let url = format!("{}/chat/send", self.base_url);

        let body = serde_json::to_vec(&SendRequest {
            sender_id: sender_id.to_string(),
            text: text.to_string(),
        })?;

        let req = Request::builder()
            .method(Method::POST)
            .uri(&url)
            .header("Content-Type", "application/json")
            .body(Full::new(Bytes::from(body)))
            .map_err(|e| Error::Delivery(format!("Failed to build send request: {}", e)))?;

        let response = self
            .client
            .request(req)
            .await
            .map_err(|e| Error::Delivery(format!("Send failed: {}", e)))?;

        if !response.status().is_success() {
            warn!(
                "Delivery failed with status {} for {}",
                response.status(),
                sender_id
            );
            return Err(Error::Delivery(format!(
                "Delivery failed with status {}",
                response.status()
            )));
        }

        let body = response
            .collect()
            .await
            .map_err(|e| Error::Delivery(format!("Failed to read send response: {}", e)))?
            .to_bytes();

        let parsed: SendResponse = serde_json::from_slice(&body)?;
        info!("Message delivered for {}", sender_id);
        Ok(parsed.message)
    }

    async fn fetch_history(&self, sender_id: &str) -> Result<Vec<ChatMessage>> {
        let url = format!("{}/chat/history/{}", self.base_url, sender_id);

        let req = Request::builder()
            .method(Method::GET)
            .uri(&url)
            .body(Full::new(Bytes::new()))
            .map_err(|e| Error::Delivery(format!("Failed to build history request: {}", e)))?;

        let response = self
            .client
            .request(req)
            .await
            .map_err(|e| Error::Delivery(format!("History fetch failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::Delivery(format!(
                "History fetch failed with status {}",
                response.status()
            )));
        }

        let body = response
            .collect()
            .await
            .map_err(|e| Error::Delivery(format!("Failed to read history response: {}", e)))?
            .to_bytes();

        let parsed: HistoryResponse = serde_json::from_slice(&body)?;
        Ok(parsed.messages)
    }
}
