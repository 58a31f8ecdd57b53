//! In-process change feed.
//!
//! Delivers [`ChangeEvent`]s to live subscriptions. Insert events are
//! filtered by the subscriber's owner; delete events go to every subscriber.
//! A [`Subscription`] unregisters itself when its guard is dropped.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use tokio::sync::mpsc;
use tracing::{debug, trace};

use crate::types::bookmark::ChangeEvent;

struct Subscriber {
    owner: String,
    sender: mpsc::UnboundedSender<ChangeEvent>,
}

#[derive(Default)]
struct Registry {
    next_id: u64,
    subscribers: HashMap<u64, Subscriber>,
}

fn lock(registry: &Mutex<Registry>) -> MutexGuard<'_, Registry> {
    registry.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Fan-out point for row changes.
#[derive(Clone, Default)]
pub struct ChangeFeed {
    registry: Arc<Mutex<Registry>>,
}

impl ChangeFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a subscriber receiving inserts owned by `owner` and all deletes.
    pub fn subscribe(&self, owner: &str) -> Subscription {
        let (sender, events) = mpsc::unbounded_channel();
        let mut registry = lock(&self.registry);
        registry.next_id += 1;
        let id = registry.next_id;
        registry.subscribers.insert(
            id,
            Subscriber {
                owner: owner.to_string(),
                sender,
            },
        );
        debug!(subscription = id, owner, "change feed subscription opened");

        Subscription {
            guard: SubscriptionGuard {
                id,
                registry: Arc::downgrade(&self.registry),
            },
            events,
        }
    }

    /// Delivers `event` to every matching subscriber. Returns the number of deliveries.
    ///
    /// Subscribers whose receiving half is gone are pruned.
    pub fn publish(&self, event: &ChangeEvent) -> usize {
        let mut registry = lock(&self.registry);
        let mut delivered = 0;
        let mut closed = Vec::new();

        for (id, subscriber) in registry.subscribers.iter() {
            let matches = match event {
                ChangeEvent::Inserted(bookmark) => bookmark.user_id == subscriber.owner,
                ChangeEvent::Deleted { .. } => true,
            };
            if !matches {
                continue;
            }
            if subscriber.sender.send(event.clone()).is_ok() {
                delivered += 1;
            } else {
                closed.push(*id);
            }
        }

        for id in closed {
            registry.subscribers.remove(&id);
        }

        trace!(id = event.bookmark_id(), delivered, "change published");
        delivered
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        lock(&self.registry).subscribers.len()
    }
}

/// Unregisters its subscription on drop.
pub struct SubscriptionGuard {
    id: u64,
    registry: Weak<Mutex<Registry>>,
}

impl SubscriptionGuard {
    pub fn id(&self) -> u64 {
        self.id
    }
}

impl Drop for SubscriptionGuard {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            if lock(&registry).subscribers.remove(&self.id).is_some() {
                debug!(subscription = self.id, "change feed subscription released");
            }
        }
    }
}

/// A live subscription to a change feed.
pub struct Subscription {
    guard: SubscriptionGuard,
    events: mpsc::UnboundedReceiver<ChangeEvent>,
}

impl Subscription {
    /// Returns an already-delivered event without waiting.
    pub fn try_recv(&mut self) -> Option<ChangeEvent> {
        self.events.try_recv().ok()
    }

    /// Splits the subscription so the receiver can move into a task while the
    /// guard stays with its owner.
    pub fn into_parts(self) -> (SubscriptionGuard, mpsc::UnboundedReceiver<ChangeEvent>) {
        (self.guard, self.events)
    }
}
