//! Refresh bus: synchronous in-process publish/subscribe
//!
//! One bus is created per application session and handed to every component
//! that reads chain state. After a transaction succeeds, the transaction
//! helper publishes the topics it invalidated; each subscribed watcher decides
//! whether to re-fetch.
//!
//! ## Delivery
//!
//! - Synchronous: every handler registered when `publish` is called runs
//!   before `publish` returns, in registration order
//! - At-most-once and lossy: nothing is buffered for late subscribers
//! - Re-entrant: the handler list is snapshotted before dispatch, so a handler
//!   may publish or drop its own subscription

use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use tracing::{debug, trace};

use crate::topics::{RefreshTopic, TopicSet};

/// Identifier assigned to each subscription
pub type SubscriberId = u64;

type Handler = dyn Fn(&TopicSet) + Send + Sync;

struct BusInner {
    next_id: AtomicU64,
    handlers: Mutex<Vec<(SubscriberId, Arc<Handler>)>>,
}

/// Cloneable handle to a shared refresh bus
#[derive(Clone)]
pub struct RefreshBus {
    inner: Arc<BusInner>,
}

/// Registration handle; dropping it deregisters the handler
#[must_use = "dropping a Subscription immediately unsubscribes its handler"]
pub struct Subscription {
    id: SubscriberId,
    bus: Weak<BusInner>,
}

impl RefreshBus {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(BusInner {
                next_id: AtomicU64::new(1),
                handlers: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Notify every current subscriber. An empty slice publishes `{All}`.
    ///
    /// Returns the number of handlers invoked.
    pub fn publish(&self, topics: &[RefreshTopic]) -> usize {
        let set = TopicSet::from_topics(topics);
        let snapshot: Vec<Arc<Handler>> = self
            .inner
            .handlers
            .lock()
            .iter()
            .map(|(_, handler)| Arc::clone(handler))
            .collect();

        if snapshot.is_empty() {
            debug!("Refresh {} published with no subscribers", set);
            return 0;
        }

        debug!("Refresh {} -> {} subscribers", set, snapshot.len());
        for handler in &snapshot {
            handler(&set);
        }
        snapshot.len()
    }

    /// Register a handler that receives every publish
    pub fn subscribe<F>(&self, handler: F) -> Subscription
    where
        F: Fn(&TopicSet) + Send + Sync + 'static,
    {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        self.inner.handlers.lock().push((id, Arc::new(handler)));
        trace!("Subscriber {} registered", id);

        Subscription {
            id,
            bus: Arc::downgrade(&self.inner),
        }
    }

    /// Register a handler that only fires when a publish matches `interests`
    /// (or is the `All` wildcard)
    pub fn subscribe_to<F>(&self, interests: &[RefreshTopic], handler: F) -> Subscription
    where
        F: Fn(&TopicSet) + Send + Sync + 'static,
    {
        let interests = interests.to_vec();
        self.subscribe(move |topics| {
            if topics.matches(&interests) {
                handler(topics);
            }
        })
    }

    /// Number of live subscriptions
    pub fn subscriber_count(&self) -> usize {
        self.inner.handlers.lock().len()
    }
}

impl Default for RefreshBus {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RefreshBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshBus")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

impl Subscription {
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    /// Deregister now (equivalent to dropping)
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(bus) = self.bus.upgrade() {
            // Handler closures may own subscriptions of this bus; release
            // them only after the lock is gone.
            let removed: Vec<_> = {
                let mut handlers = bus.handlers.lock();
                let (removed, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut *handlers)
                    .into_iter()
                    .partition(|(id, _)| *id == self.id);
                *handlers = kept;
                removed
            };
            drop(removed);
            trace!("Subscriber {} removed", self.id);
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}
