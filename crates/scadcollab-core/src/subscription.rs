//! Push-subscription primitive.
//!
//! A `Subscription` is the receiving half of a publisher keyed by
//! session id. The current snapshot is delivered immediately on
//! subscribe, then a new value on every subsequent mutation. Dropping
//! the subscription (or calling [`Subscription::unsubscribe`]) stops
//! delivery; no value is ever observed after that point.

use tokio::sync::mpsc;

/// The receiving end of a session-keyed publisher.
pub struct Subscription<T> {
    rx: mpsc::UnboundedReceiver<T>,
}

impl<T> Subscription<T> {
    /// Wraps a channel receiver. Used by store implementations.
    pub fn new(rx: mpsc::UnboundedReceiver<T>) -> Self {
        Self { rx }
    }

    /// Waits for the next delivery. Returns `None` once the publisher
    /// side is gone (e.g. the store dropped the key after a delete).
    pub async fn next(&mut self) -> Option<T> {
        self.rx.recv().await
    }

    /// Non-blocking variant of [`Subscription::next`].
    pub fn try_next(&mut self) -> Option<T> {
        self.rx.try_recv().ok()
    }

    /// Cancels the subscription. Equivalent to dropping it; spelled
    /// out so call sites read like the protocol they implement.
    pub fn unsubscribe(self) {}
}
