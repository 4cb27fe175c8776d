//! In-process change feed.
//!
//! Replaces the remote realtime channel of the original deployment: every
//! committed mutation publishes a [`ChangeEvent`]; observers subscribe per
//! table and typically respond by re-fetching whatever they display. A
//! [`Subscription`] unsubscribes itself on drop, so an observer that goes
//! away can never leak a handler.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, Weak};

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Change feed topic, one per observable table plus auth state.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Topic {
    Patients,
    Departments,
    Staff,
    Tickets,
    Auth,
}

/// Kind of change that occurred.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
}

/// A single change notification.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChangeEvent {
    pub topic: Topic,
    pub kind: ChangeKind,
    /// Row id of the affected record, when known
    pub record_id: Option<String>,
}

type Handler = Box<dyn Fn(&ChangeEvent) + Send + Sync>;

#[derive(Default)]
struct Registry {
    next_id: u64,
    handlers: HashMap<u64, (Topic, Handler)>,
}

/// Synchronous publish/subscribe bus.
///
/// Cloning is cheap; clones share the same registry. Handlers run on the
/// publishing thread while the registry is locked, so a handler must not
/// subscribe or unsubscribe from inside itself.
#[derive(Clone, Default)]
pub struct EventBus {
    registry: Arc<Mutex<Registry>>,
}

impl EventBus {
    /// Create an empty bus.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for one topic. Dropping the returned handle
    /// unsubscribes it.
    pub fn subscribe<F>(&self, topic: Topic, handler: F) -> Subscription
    where
        F: Fn(&ChangeEvent) + Send + Sync + 'static,
    {
        let id = {
            let mut registry = self.registry.lock().unwrap_or_else(|e| e.into_inner());
            let id = registry.next_id;
            registry.next_id += 1;
            registry.handlers.insert(id, (topic, Box::new(handler)));
            id
        };
        Subscription {
            id,
            registry: Arc::downgrade(&self.registry),
        }
    }

    /// Deliver an event to every handler subscribed to its topic.
    pub fn publish(&self, event: &ChangeEvent) {
        debug!(topic = ?event.topic, kind = ?event.kind, "change event");
        let registry = self.registry.lock().unwrap_or_else(|e| e.into_inner());
        for (topic, handler) in registry.handlers.values() {
            if *topic == event.topic {
                handler(event);
            }
        }
    }

    /// Number of live subscriptions (for tests and diagnostics).
    pub fn subscriber_count(&self) -> usize {
        self.registry
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .handlers
            .len()
    }
}

/// Handle to a registered handler; unsubscribes on drop.
pub struct Subscription {
    id: u64,
    registry: Weak<Mutex<Registry>>,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            let mut registry = registry.lock().unwrap_or_else(|e| e.into_inner());
            registry.handlers.remove(&self.id);
        }
    }
}
