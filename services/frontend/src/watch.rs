//! Polling watchers
//!
//! A [`Watcher`] keeps one chain readout fresh: it fetches immediately, again
//! on every interval tick, and whenever the refresh bus publishes a topic it
//! is interested in. Dropping the watcher aborts the task and removes the bus
//! subscription.

use futures::future::BoxFuture;
use miniamm_refresh::{RefreshBus, RefreshTopic, Subscription};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Notify};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use crate::error::Result;

/// Latest readout plus fetch status
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReadState<T> {
    pub value: T,
    pub is_loading: bool,
    pub error: Option<String>,
}

/// Produces one fresh readout
pub type Fetch<T> = Arc<dyn Fn() -> BoxFuture<'static, Result<T>> + Send + Sync>;

struct Shared<T> {
    name: &'static str,
    state: RwLock<ReadState<T>>,
    fetch: Fetch<T>,
    stopped: AtomicBool,
    updates: watch::Sender<u64>,
}

impl<T> Shared<T>
where
    T: Clone + Default + Send + Sync + 'static,
{
    async fn refresh(&self) {
        if self.stopped.load(Ordering::Acquire) {
            return;
        }

        {
            let mut state = self.state.write();
            state.is_loading = true;
            state.error = None;
        }

        let outcome = (self.fetch)().await;

        // a result landing after stop() is discarded
        if self.stopped.load(Ordering::Acquire) {
            return;
        }

        {
            let mut state = self.state.write();
            state.is_loading = false;
            match outcome {
                Ok(value) => state.value = value,
                Err(e) => {
                    warn!("Failed to fetch {}: {}", self.name, e);
                    state.value = T::default();
                    state.error = Some(e.to_string());
                }
            }
        }
        self.updates.send_modify(|version| *version += 1);
    }
}

pub struct Watcher<T> {
    shared: Arc<Shared<T>>,
    task: Option<JoinHandle<()>>,
    subscription: Option<Subscription>,
}

impl<T> Watcher<T>
where
    T: Clone + Default + Send + Sync + 'static,
{
    /// Start polling on the current tokio runtime
    pub fn spawn(
        name: &'static str,
        bus: &RefreshBus,
        interests: &[RefreshTopic],
        period: Duration,
        fetch: Fetch<T>,
    ) -> Self {
        let (updates, _) = watch::channel(0);
        let shared = Arc::new(Shared {
            name,
            state: RwLock::new(ReadState::default()),
            fetch,
            stopped: AtomicBool::new(false),
            updates,
        });

        let wake = Arc::new(Notify::new());
        let on_publish = Arc::clone(&wake);
        let subscription = bus.subscribe_to(interests, move |topics| {
            debug!("{} invalidated by {}", name, topics);
            on_publish.notify_one();
        });

        let worker = Arc::clone(&shared);
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {}
                    _ = wake.notified() => {}
                }
                worker.refresh().await;
            }
        });

        Self {
            shared,
            task: Some(task),
            subscription: Some(subscription),
        }
    }

    pub fn snapshot(&self) -> ReadState<T> {
        self.shared.state.read().clone()
    }

    pub fn value(&self) -> T {
        self.shared.state.read().value.clone()
    }

    pub fn name(&self) -> &'static str {
        self.shared.name
    }

    /// Fetch once now, outside the polling schedule
    pub async fn refetch(&self) {
        self.shared.refresh().await;
    }

    /// Version counter bumped after every completed fetch
    pub fn updates(&self) -> watch::Receiver<u64> {
        self.shared.updates.subscribe()
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Abort polling and leave the bus; the last value stays readable
    pub fn stop(&mut self) {
        self.shared.stopped.store(true, Ordering::Release);
        if let Some(task) = self.task.take() {
            task.abort();
        }
        self.subscription.take();
    }
}

impl<T> Drop for Watcher<T> {
    fn drop(&mut self) {
        self.shared.stopped.store(true, Ordering::Release);
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
