//! HealthX Chat - offline-resilient client core for the HealthX assistant
//!
//! This library provides the client-side messaging core for the HealthX
//! assistant chat: submitted messages are delivered immediately when the
//! backend is reachable, and otherwise retained in a persisted retry queue
//! that is drained when connectivity returns. A message the user submits is
//! either delivered and recorded or kept pending, never silently lost.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod api;
pub mod connectivity;
pub mod fallback;
pub mod message;
pub mod messaging;
pub mod queue;
pub mod store;

/// Result type alias for HealthX chat operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for HealthX chat operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Message delivery error
    #[error("Delivery error: {0}")]
    Delivery(String),

    /// Local store operation error
    #[error("Storage error: {0}")]
    Storage(String),

    /// General I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    JsonSerialization(#[from] serde_json::Error),

    /// SQLite database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
}

/// Initialize the HealthX chat library with logging
pub fn init() {
    tracing_subscriber::fmt::init();
}

#[cfg(test)]
mod tests;
