//! HealthX chat CLI
//!
//! A line-oriented terminal client for the HealthX assistant. Messages typed
//! while offline are answered from the local advice table and queued; a
//! background task drains the queue whenever connectivity returns.

use anyhow::Result;
use healthx_chat::api::ApiClient;
use healthx_chat::connectivity::ConnectivityMonitor;
use healthx_chat::message::{ChatMessage, Sender};
use healthx_chat::messaging::{ChatController, run_sync_on_reconnect};
use healthx_chat::store::SqliteStore;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::Mutex;

#[tokio::main]
async fn main() -> Result<()> {
    healthx_chat::init();

    let base_url = std::env::var("HEALTHX_API_URL")
        .unwrap_or_else(|_| "http://localhost:5000/api".to_string());
    let sender_id =
        std::env::var("HEALTHX_SENDER_ID").unwrap_or_else(|_| "local-user".to_string());
    let state_path =
        std::env::var("HEALTHX_STATE_PATH").unwrap_or_else(|_| "healthx_chat.db".to_string());

    let api = ApiClient::new(&base_url);
    let store = Arc::new(Mutex::new(SqliteStore::new_with_path(&state_path)?));

    let monitor = ConnectivityMonitor::new(format!("{}/health", base_url), Duration::from_secs(10));
    monitor.start().await;
    let handle = monitor.handle();

    let controller = ChatController::new(api, store, handle.clone(), sender_id);
    controller.start().await;

    // Drain the queue in the background whenever connectivity returns
    tokio::spawn(run_sync_on_reconnect(
        controller.clone(),
        handle.subscribe(),
    ));

    let seeded = controller.conversation().await;
    render(&seeded);
    println!("Type a message and press Enter (Ctrl-D to quit).");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let before = controller.conversation().await.len();
        controller.submit(&line).await;
        let conversation = controller.conversation().await;
        render(&conversation[before..]);
    }

    monitor.stop().await;
    Ok(())
}

/// Print a slice of the conversation, one line per message
fn render(messages: &[ChatMessage]) {
    for message in messages {
        let author = match message.sender {
            Sender::User => "you",
            Sender::Ai => "assistant",
        };
        let indicator = message.status_indicator();
        if indicator.is_empty() {
            println!("{:>9}: {}", author, message.text);
        } else {
            println!("{:>9}: {} [{}]", author, message.text, indicator);
        }
    }
}
