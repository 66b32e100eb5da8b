//! Keyed publisher for push subscriptions.
//!
//! One publisher serves all sessions of a store; subscribers are
//! keyed by session id. Subscribing delivers the current snapshot
//! immediately; publishing fans the new value out to every live
//! subscriber of that key. Closed subscribers are pruned on the next
//! publish.

use scadcollab_core::subscription::Subscription;
use std::collections::HashMap;
use std::sync::Mutex;
use tokio::sync::mpsc;

/// Fan-out of values of type `T`, keyed by session id.
pub struct Publisher<T> {
    subscribers: Mutex<HashMap<String, Vec<mpsc::UnboundedSender<T>>>>,
}

impl<T: Clone + Send + 'static> Publisher<T> {
    pub fn new() -> Self {
        Self {
            subscribers: Mutex::new(HashMap::new()),
        }
    }

    /// Registers a subscriber for `key`, delivering `snapshot` as the
    /// first value.
    pub fn subscribe(&self, key: &str, snapshot: T) -> Subscription<T> {
        let (tx, rx) = mpsc::unbounded_channel();
        // The receiver is alive, so this send cannot fail.
        let _ = tx.send(snapshot);
        self.subscribers
            .lock()
            .unwrap()
            .entry(key.to_string())
            .or_default()
            .push(tx);
        Subscription::new(rx)
    }

    /// Delivers `value` to every live subscriber of `key`.
    pub fn publish(&self, key: &str, value: T) {
        let mut subscribers = self.subscribers.lock().unwrap();
        if let Some(senders) = subscribers.get_mut(key) {
            senders.retain(|tx| tx.send(value.clone()).is_ok());
            if senders.is_empty() {
                subscribers.remove(key);
            }
        }
    }

    /// Drops all subscribers of `key`. Their `next()` yields whatever
    /// was already queued (e.g. a final absent), then completes.
    pub fn close(&self, key: &str) {
        self.subscribers.lock().unwrap().remove(key);
    }
}

impl<T: Clone + Send + 'static> Default for Publisher<T> {
    fn default() -> Self {
        Self::new()
    }
}
