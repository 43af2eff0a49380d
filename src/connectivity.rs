//! Connectivity monitoring
//!
//! Best-effort online/offline signal for the submitter:
//! - A background task probes the backend health endpoint on an interval
//! - Transitions are published through a watch channel, so queue drains are
//!   edge-triggered on reconnect rather than polled
//!
//! The signal makes no accuracy guarantee. A wrong "online" only costs one
//! failed delivery attempt, which takes the same queue-for-retry path as
//! being offline.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Timeout for a single health probe request
const PROBE_TIMEOUT: Duration = Duration::from_secs(3);

/// Boolean reachability signal consumed by the submitter
pub trait ConnectivitySignal: Send + Sync {
    /// Current best-effort online state
    fn is_online(&self) -> bool;
}

/// Cloneable handle to a monitor's online state
#[derive(Clone)]
pub struct ConnectivityHandle {
    online_rx: watch::Receiver<bool>,
}

impl ConnectivityHandle {
    /// Receiver that fires on every online/offline transition
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.online_rx.clone()
    }
}

impl ConnectivitySignal for ConnectivityHandle {
    fn is_online(&self) -> bool {
        *self.online_rx.borrow()
    }
}

/// Background health-probe monitor
///
/// Probes once inline on `start`, then keeps probing from a spawned task
/// until `stop` or drop.
pub struct ConnectivityMonitor {
    health_url: String,
    probe_interval: Duration,
    online_tx: Arc<watch::Sender<bool>>,
    probe_task: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl ConnectivityMonitor {
    /// Create a monitor probing `health_url` every `probe_interval`
    ///
    /// The state starts offline until the first probe completes.
    pub fn new(health_url: impl Into<String>, probe_interval: Duration) -> Self {
        let (online_tx, _) = watch::channel(false);

        Self {
            health_url: health_url.into(),
            probe_interval,
            online_tx: Arc::new(online_tx),
            probe_task: Arc::new(Mutex::new(None)),
        }
    }

    /// Handle for querying and subscribing to the online state
    pub fn handle(&self) -> ConnectivityHandle {
        ConnectivityHandle {
            online_rx: self.online_tx.subscribe(),
        }
    }

    /// Probe once, then keep probing in the background
    pub async fn start(&self) {
        let online = probe(&self.health_url).await;
        publish(&self.online_tx, online);
        info!(
            "Connectivity monitor started for {} (online: {})",
            self.health_url, online
        );

        // Cancel existing task if any
        if let Some(task) = self.probe_task.lock().await.take() {
            task.abort();
        }

        let health_url = self.health_url.clone();
        let interval = self.probe_interval;
        let online_tx = self.online_tx.clone();

        let task = tokio::spawn(async move {
            loop {
                tokio::time::sleep(interval).await;
                let online = probe(&health_url).await;
                publish(&online_tx, online);
            }
        });

        *self.probe_task.lock().await = Some(task);
    }

    /// Stop background probing
    pub async fn stop(&self) {
        if let Some(task) = self.probe_task.lock().await.take() {
            task.abort();
        }
    }
}

impl Drop for ConnectivityMonitor {
    fn drop(&mut self) {
        // Cancel probe task on drop
        if let Some(task) = self
            .probe_task
            .try_lock()
            .ok()
            .and_then(|mut guard| guard.take())
        {
            task.abort();
        }
    }
}

/// Publish a probe result, notifying subscribers only on transitions
fn publish(online_tx: &watch::Sender<bool>, online: bool) {
    let changed = online_tx.send_if_modified(|state| {
        if *state != online {
            *state = online;
            true
        } else {
            false
        }
    });

    if changed {
        if online {
            info!("Connectivity restored");
        } else {
            warn!("Connectivity lost");
        }
    }
}

/// Probe the health endpoint once
async fn probe(health_url: &str) -> bool {
    let client = match reqwest::Client::builder().timeout(PROBE_TIMEOUT).build() {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to create HTTP client for health probe: {}", e);
            return false;
        }
    };

    match client.get(health_url).send().await {
        Ok(response) => {
            if response.status().is_success() {
                true
            } else {
                debug!(
                    "Health endpoint returned non-success status: {}",
                    response.status()
                );
                false
            }
        }
        Err(e) => {
            if e.is_timeout() || e.is_connect() {
                debug!("Health probe unreachable: {}", e);
            } else {
                warn!("Health probe request failed: {}", e);
            }
            false
        }
    }
}
