//! Single-flight Module
//!
//! Per-key registry of in-flight `get_or_set` computations. The first caller
//! for a cold key becomes the leader and runs the producer; everyone arriving
//! while it runs subscribes to the leader's result instead.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use bytes::Bytes;
use tokio::sync::watch;

type Slot = watch::Receiver<Option<Bytes>>;

// == Flight Registry ==
#[derive(Debug, Default)]
pub struct FlightRegistry {
    inflight: Mutex<HashMap<String, Slot>>,
}

/// Role assigned to a caller joining a flight.
pub enum Flight<'a> {
    /// Caller must compute the value and complete the guard.
    Leader(FlightGuard<'a>),
    /// Caller waits on the leader's result.
    Follower(Slot),
}

impl FlightRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Slot>> {
        // The map stays consistent even if a holder panicked.
        self.inflight.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    // == Join ==
    /// Joins the flight for `key`, becoming its leader if none is running.
    pub fn join(&self, key: &str) -> Flight<'_> {
        let mut inflight = self.lock();
        if let Some(slot) = inflight.get(key) {
            return Flight::Follower(slot.clone());
        }

        let (tx, rx) = watch::channel(None);
        inflight.insert(key.to_string(), rx);
        Flight::Leader(FlightGuard {
            registry: self,
            key: key.to_string(),
            tx,
        })
    }

    /// Number of keys with a running leader.
    #[allow(dead_code)]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // == Wait ==
    /// Waits for the leader behind `slot` to publish a payload.
    ///
    /// Returns `None` if the leader went away without publishing.
    pub async fn wait(mut slot: Slot) -> Option<Bytes> {
        let payload = match slot.wait_for(Option::is_some).await {
            Ok(published) => published.clone(),
            Err(_) => None,
        };
        payload
    }
}

// == Flight Guard ==
/// Held by the leader; unregisters the flight when dropped.
pub struct FlightGuard<'a> {
    registry: &'a FlightRegistry,
    key: String,
    tx: watch::Sender<Option<Bytes>>,
}

impl FlightGuard<'_> {
    /// Publishes the computed payload to every follower.
    pub fn complete(self, payload: Bytes) {
        // No receivers left is fine: nobody was waiting.
        let _ = self.tx.send(Some(payload));
    }
}

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        self.registry.lock().remove(&self.key);
    }
}
