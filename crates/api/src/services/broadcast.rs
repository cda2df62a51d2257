//! Best-effort event broadcasting to WebSocket observers.
//!
//! Mutating handlers publish domain events through the [`Broadcaster`].
//! Each connected WebSocket registers an observer channel; delivery is
//! fire-and-forget and a slow or closed observer never blocks the
//! handler that produced the event.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;

use domain::events::EventEnvelope;

struct Observer {
    id: u64,
    tx: mpsc::UnboundedSender<String>,
}

/// Registry of connected WebSocket observers.
///
/// Cloning is cheap; all clones share the same observer list, so the
/// one instance stored in application state reaches every handler.
#[derive(Clone)]
pub struct Broadcaster {
    observers: Arc<Mutex<Vec<Observer>>>,
    next_id: Arc<AtomicU64>,
}

impl Default for Broadcaster {
    fn default() -> Self {
        Self::new()
    }
}

impl Broadcaster {
    pub fn new() -> Self {
        Self {
            observers: Arc::new(Mutex::new(Vec::new())),
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Registers a new observer and returns its id and message receiver.
    pub fn subscribe(&self) -> (u64, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        if let Ok(mut observers) = self.observers.lock() {
            observers.push(Observer { id, tx });
        }
        (id, rx)
    }

    /// Removes an observer after its connection closes.
    pub fn unsubscribe(&self, id: u64) {
        if let Ok(mut observers) = self.observers.lock() {
            observers.retain(|obs| obs.id != id);
        }
    }

    /// Publishes an event to every connected observer.
    ///
    /// Observers whose channel has closed are pruned during the send
    /// pass. Failures are logged and never propagated to the caller.
    pub fn broadcast(&self, event: &str, data: serde_json::Value) {
        let envelope = EventEnvelope::new(event, data);
        let message = envelope.to_message();

        let mut delivered = 0usize;
        let mut pruned = 0usize;
        if let Ok(mut observers) = self.observers.lock() {
            observers.retain(|obs| {
                if obs.tx.send(message.clone()).is_ok() {
                    delivered += 1;
                    true
                } else {
                    pruned += 1;
                    false
                }
            });
        }

        tracing::debug!(event, delivered, pruned, "Broadcast event");
    }

    /// Number of currently registered observers.
    pub fn observer_count(&self) -> usize {
        self.observers.lock().map(|obs| obs.len()).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_broadcast_with_no_observers_does_not_panic() {
        let broadcaster = Broadcaster::new();
        broadcaster.broadcast("transaction_created", json!({"id": "t1"}));
        assert_eq!(broadcaster.observer_count(), 0);
    }

    #[tokio::test]
    async fn test_subscribed_observer_receives_envelope() {
        let broadcaster = Broadcaster::new();
        let (_id, mut rx) = broadcaster.subscribe();

        broadcaster.broadcast("group_created", json!({"name": "Roommates"}));

        let message = rx.recv().await.expect("observer should receive message");
        let parsed: serde_json::Value = serde_json::from_str(&message).unwrap();
        assert_eq!(parsed["event"], "group_created");
        assert_eq!(parsed["data"]["name"], "Roommates");
        assert!(parsed["timestamp"].is_string());
    }

    #[tokio::test]
    async fn test_all_observers_receive_each_event() {
        let broadcaster = Broadcaster::new();
        let (_a, mut rx_a) = broadcaster.subscribe();
        let (_b, mut rx_b) = broadcaster.subscribe();

        broadcaster.broadcast("member-joined", json!({"member": "dana"}));

        assert!(rx_a.recv().await.is_some());
        assert!(rx_b.recv().await.is_some());
    }

    #[tokio::test]
    async fn test_closed_observer_is_pruned_on_broadcast() {
        let broadcaster = Broadcaster::new();
        let (_kept, _rx_kept) = broadcaster.subscribe();
        let (_dropped, rx_dropped) = broadcaster.subscribe();
        drop(rx_dropped);
        assert_eq!(broadcaster.observer_count(), 2);

        broadcaster.broadcast("invite-created", json!({}));

        assert_eq!(broadcaster.observer_count(), 1);
    }

    #[tokio::test]
    async fn test_unsubscribe_removes_observer() {
        let broadcaster = Broadcaster::new();
        let (id, _rx) = broadcaster.subscribe();
        assert_eq!(broadcaster.observer_count(), 1);

        broadcaster.unsubscribe(id);
        assert_eq!(broadcaster.observer_count(), 0);
    }
}
