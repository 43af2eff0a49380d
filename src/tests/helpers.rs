// Shared test doubles for controller-level tests

use crate::api::ChatApi;
use crate::connectivity::ConnectivitySignal;
use crate::message::ChatMessage;
use crate::messaging::ChatController;
use crate::store::{LocalStore, MemoryStore};
use crate::{Error, Result};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Semaphore;

/// Scripted delivery endpoint recording every attempt
#[derive(Clone, Default)]
pub struct FakeApi {
    fail_sends: Arc<AtomicBool>,
    fail_history: Arc<AtomicBool>,
    fail_matching: Arc<Mutex<Option<String>>>,
    history: Arc<Mutex<Vec<ChatMessage>>>,
    sent: Arc<Mutex<Vec<String>>>,
    started: Arc<AtomicUsize>,
    reply_seq: Arc<AtomicUsize>,
    gate: Arc<Mutex<Option<Arc<Semaphore>>>>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every send attempt fail
    pub fn set_failing(&self, failing: bool) {
        self.fail_sends.store(failing, Ordering::SeqCst);
    }

    /// Make history fetches fail
    pub fn set_history_failing(&self, failing: bool) {
        self.fail_history.store(failing, Ordering::SeqCst);
    }

    /// Fail only sends whose text contains `pattern`
    pub fn fail_texts_containing(&self, pattern: &str) {
        *self.fail_matching.lock().unwrap() = Some(pattern.to_string());
    }

    /// Script the history endpoint's records (server order, unsorted)
    pub fn set_history(&self, messages: Vec<ChatMessage>) {
        *self.history.lock().unwrap() = messages;
    }

    /// Park send attempts on `gate` until permits are added
    pub fn set_gate(&self, gate: Arc<Semaphore>) {
        *self.gate.lock().unwrap() = Some(gate);
    }

    /// Texts attempted so far, in attempt order (failures included)
    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }

    /// Number of send attempts entered, counted before any gate
    pub fn attempts_started(&self) -> usize {
        self.started.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChatApi for FakeApi {
    async fn send_message(&self, _sender_id: &str, text: &str) -> Result<ChatMessage> {
        self.started.fetch_add(1, Ordering::SeqCst);

        let gate = self.gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.acquire().await.expect("gate closed").forget();
        }

        self.sent.lock().unwrap().push(text.to_string());

        if self.fail_sends.load(Ordering::SeqCst) {
            return Err(Error::Delivery("scripted send failure".to_string()));
        }
        let matching = self.fail_matching.lock().unwrap().clone();
        if let Some(pattern) = matching {
            if text.contains(&pattern) {
                return Err(Error::Delivery("scripted send failure".to_string()));
            }
        }

        let seq = self.reply_seq.fetch_add(1, Ordering::SeqCst);
        let mut reply = ChatMessage::ai(format!("Advice for: {}", text));
        reply.id = Some(format!("srv-{}", seq));
        Ok(reply)
    }

    async fn fetch_history(&self, _sender_id: &str) -> Result<Vec<ChatMessage>> {
        if self.fail_history.load(Ordering::SeqCst) {
            return Err(Error::Delivery("scripted history failure".to_string()));
        }
        Ok(self.history.lock().unwrap().clone())
    }
}

/// Manually switched connectivity signal
#[derive(Clone)]
pub struct FakeSignal {
    online: Arc<AtomicBool>,
}

impl FakeSignal {
    pub fn new(online: bool) -> Self {
        Self {
            online: Arc::new(AtomicBool::new(online)),
        }
    }

    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }
}

impl ConnectivitySignal for FakeSignal {
    fn is_online(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }
}

/// Memory store counting every write (set or remove)
pub struct CountingStore {
    inner: MemoryStore,
    writes: Arc<AtomicUsize>,
}

impl CountingStore {
    pub fn new() -> (Self, Arc<AtomicUsize>) {
        let writes = Arc::new(AtomicUsize::new(0));
        (
            Self {
                inner: MemoryStore::new(),
                writes: writes.clone(),
            },
            writes,
        )
    }
}

impl LocalStore for CountingStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.inner.get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.remove(key)
    }
}

/// Controller over a fresh in-memory store, returning the store handle too
pub fn controller(
    api: FakeApi,
    signal: FakeSignal,
) -> (
    ChatController<FakeApi, MemoryStore, FakeSignal>,
    Arc<tokio::sync::Mutex<MemoryStore>>,
) {
    let store = Arc::new(tokio::sync::Mutex::new(MemoryStore::new()));
    let controller = ChatController::new(api, store.clone(), signal, "user-1");
    (controller, store)
}
