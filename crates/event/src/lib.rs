//! Topic based publish/subscribe bus.
//!
//! Each topic is a `tokio::sync::broadcast` channel. Publishing never blocks:
//! a message to an unregistered topic, or to a topic nobody listens on, is
//! dropped. Slow subscribers lag (and are told how many messages they missed)
//! instead of slowing the publisher down.
//!
//! Games publish on `update/<game id>`, see [`update_topic`].
//!
//! ```
//! use bloccs_event::Bus;
//!
//! let bus: Bus<u32> = Bus::new(16);
//! bus.add_channel("update/a");
//! let mut rx = bus.subscribe("update/a").unwrap();
//!
//! bus.publish("update/a", "tick", 7);
//! let envelope = rx.try_recv().unwrap();
//! assert_eq!(envelope.event_type, "tick");
//! assert_eq!(envelope.payload, 7);
//! ```

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use tokio::sync::broadcast;
use tracing::{debug, trace};

/// Default per-topic buffer size
pub const DEFAULT_CAPACITY: usize = 256;

/// Topic a game publishes its updates on
pub fn update_topic(game_id: &str) -> String {
    format!("update/{}", game_id)
}

/// A published message as seen by subscribers
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Envelope<E> {
    pub topic: String,
    pub event_type: String,
    pub payload: E,
}

/// Channel registry keyed by topic
pub struct Bus<E> {
    capacity: usize,
    channels: Mutex<HashMap<String, broadcast::Sender<Envelope<E>>>>,
}

impl<E: Clone + Send + 'static> Bus<E> {
    /// Create a bus whose topics buffer up to `capacity` messages per subscriber
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            channels: Mutex::new(HashMap::new()),
        }
    }

    fn channels(&self) -> MutexGuard<'_, HashMap<String, broadcast::Sender<Envelope<E>>>> {
        self.channels.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a topic; registering an existing topic keeps its subscribers
    pub fn add_channel(&self, topic: &str) {
        let mut channels = self.channels();
        if !channels.contains_key(topic) {
            let (tx, _) = broadcast::channel(self.capacity);
            channels.insert(topic.to_string(), tx);
            debug!(topic, "channel added");
        }
    }

    /// Deregister a topic; its subscribers see the channel close
    pub fn remove_channel(&self, topic: &str) {
        if self.channels().remove(topic).is_some() {
            debug!(topic, "channel removed");
        }
    }

    pub fn has_channel(&self, topic: &str) -> bool {
        self.channels().contains_key(topic)
    }

    /// Number of registered topics
    pub fn channel_count(&self) -> usize {
        self.channels().len()
    }

    /// Listen on a topic; None if the topic is not registered
    pub fn subscribe(&self, topic: &str) -> Option<broadcast::Receiver<Envelope<E>>> {
        self.channels().get(topic).map(|tx| tx.subscribe())
    }

    /// Fire-and-forget publish; returns how many subscribers received it
    pub fn publish(&self, topic: &str, event_type: &str, payload: E) -> usize {
        let channels = self.channels();
        let Some(tx) = channels.get(topic) else {
            trace!(topic, event_type, "publish to unknown topic dropped");
            return 0;
        };

        let envelope = Envelope {
            topic: topic.to_string(),
            event_type: event_type.to_string(),
            payload,
        };
        tx.send(envelope).unwrap_or(0)
    }
}

impl<E: Clone + Send + 'static> Default for Bus<E> {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
