//! Transaction lifecycle helper
//!
//! Wraps a submit-and-confirm future with loading/success/error state, user
//! notifications and a refresh publish on success. There is no in-flight
//! guard here; widgets check [`TxState::is_loading`] before submitting.

use miniamm_refresh::{RefreshBus, RefreshTopic};
use parking_lot::RwLock;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::error::{FrontendError, Result};
use crate::notify::Notifier;

pub const MSG_INITIATED: &str = "Transaction initiated...";
pub const MSG_CONFIRMED: &str = "Transaction confirmed!";
pub const MSG_UNKNOWN_ERROR: &str = "An unknown error occurred.";

/// Observable transaction state; `is_success` and `error` are never both set
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TxState {
    pub is_loading: bool,
    pub is_success: bool,
    pub error: Option<String>,
}

/// What to do after a successful transaction
#[derive(Default)]
pub struct ExecuteOptions {
    /// Topics published on the refresh bus; empty publishes nothing
    pub refresh: Vec<RefreshTopic>,
    pub on_success: Option<Box<dyn FnOnce() + Send>>,
}

impl ExecuteOptions {
    pub fn refresh(topics: &[RefreshTopic]) -> Self {
        Self {
            refresh: topics.to_vec(),
            on_success: None,
        }
    }

    pub fn on_success<F>(mut self, callback: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        self.on_success = Some(Box::new(callback));
        self
    }
}

/// Per-widget transaction helper
#[derive(Clone)]
pub struct Transaction {
    state: Arc<RwLock<TxState>>,
    bus: RefreshBus,
    notifier: Arc<dyn Notifier>,
}

impl Transaction {
    pub fn new(bus: RefreshBus, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            state: Arc::new(RwLock::new(TxState::default())),
            bus,
            notifier,
        }
    }

    pub fn state(&self) -> TxState {
        self.state.read().clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state.read().is_loading
    }

    /// Run `action`, tracking its outcome.
    ///
    /// The error is returned unchanged after state and notifications are
    /// updated, so callers can still branch on it.
    pub async fn execute<T, F>(&self, action: F, options: ExecuteOptions) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        *self.state.write() = TxState {
            is_loading: true,
            ..TxState::default()
        };
        let toast = self.notifier.loading(MSG_INITIATED);

        match action.await {
            Ok(value) => {
                self.notifier.success(toast, MSG_CONFIRMED);
                *self.state.write() = TxState {
                    is_success: true,
                    ..TxState::default()
                };

                if !options.refresh.is_empty() {
                    self.bus.publish(&options.refresh);
                }
                if let Some(callback) = options.on_success {
                    callback();
                }
                Ok(value)
            }
            Err(e) => {
                warn!("Transaction failed: {:?}", e);
                let message = resolve_error_message(&e);
                self.notifier.error(toast, &message);
                *self.state.write() = TxState {
                    error: Some(message),
                    ..TxState::default()
                };
                Err(e)
            }
        }
    }

    pub fn reset(&self) {
        *self.state.write() = TxState::default();
    }

    /// Reset after `delay` on the current runtime
    pub fn reset_after(&self, delay: Duration) -> JoinHandle<()> {
        let state = Arc::clone(&self.state);
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            debug!("Clearing transaction state after {:?}", delay);
            *state.write() = TxState::default();
        })
    }
}

/// Best-effort user message: revert reason, then display text, then a
/// generic fallback
pub fn resolve_error_message(err: &FrontendError) -> String {
    if let Some(short) = err.short_message().filter(|short| !short.is_empty()) {
        return short.to_string();
    }

    let message = err.to_string();
    if message.is_empty() {
        MSG_UNKNOWN_ERROR.to_string()
    } else {
        message
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::ToastId;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    #[derive(Default)]
    struct Recorder {
        events: Mutex<Vec<String>>,
    }

    impl Notifier for Recorder {
        fn loading(&self, message: &str) -> ToastId {
            self.events.lock().push(format!("loading:{}", message));
            1
        }
        fn success(&self, _id: ToastId, message: &str) {
            self.events.lock().push(format!("success:{}", message));
        }
        fn error(&self, _id: ToastId, message: &str) {
            self.events.lock().push(format!("error:{}", message));
        }
    }

    fn helper() -> (Transaction, RefreshBus, Arc<Recorder>) {
        let bus = RefreshBus::new();
        let recorder = Arc::new(Recorder::default());
        let tx = Transaction::new(bus.clone(), recorder.clone());
        (tx, bus, recorder)
    }

    #[tokio::test]
    async fn test_success_publishes_and_runs_callback() {
        let (tx, bus, recorder) = helper();
        let published = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&published);
        let _sub = bus.subscribe_to(&[RefreshTopic::Pool], move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let called = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&called);
        let options = ExecuteOptions::refresh(&[RefreshTopic::Balances, RefreshTopic::Pool])
            .on_success(move || flag.store(true, Ordering::SeqCst));

        let value = tx.execute(async { Ok(7u32) }, options).await.unwrap();

        assert_eq!(value, 7);
        assert_eq!(
            tx.state(),
            TxState {
                is_loading: false,
                is_success: true,
                error: None
            }
        );
        assert_eq!(published.load(Ordering::SeqCst), 1);
        assert!(called.load(Ordering::SeqCst));
        assert_eq!(
            *recorder.events.lock(),
            vec![
                format!("loading:{}", MSG_INITIATED),
                format!("success:{}", MSG_CONFIRMED)
            ]
        );
    }

    #[tokio::test]
    async fn test_rejected_action_sets_error_and_rethrows() {
        let (tx, bus, recorder) = helper();
        let published = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&published);
        let _sub = bus.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let result: Result<()> = tx
            .execute(
                async { Err(FrontendError::revert("execution reverted", "Insufficient allowance")) },
                ExecuteOptions::refresh(&[RefreshTopic::All]),
            )
            .await;

        assert!(matches!(result, Err(FrontendError::Chain { .. })));
        let state = tx.state();
        assert!(!state.is_loading);
        assert!(!state.is_success);
        assert_eq!(state.error.as_deref(), Some("Insufficient allowance"));
        assert_eq!(published.load(Ordering::SeqCst), 0);
        assert_eq!(
            recorder.events.lock().last().map(String::as_str),
            Some("error:Insufficient allowance")
        );
    }

    #[tokio::test]
    async fn test_empty_refresh_publishes_nothing() {
        let (tx, bus, _) = helper();
        let published = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&published);
        let _sub = bus.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        tx.execute(async { Ok(()) }, ExecuteOptions::default())
            .await
            .unwrap();
        assert_eq!(published.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_resolve_error_message_precedence() {
        assert_eq!(
            resolve_error_message(&FrontendError::revert("long rpc text", "short reason")),
            "short reason"
        );
        assert_eq!(
            resolve_error_message(&FrontendError::revert("long rpc text", "")),
            "long rpc text"
        );
        assert_eq!(
            resolve_error_message(&FrontendError::chain("")),
            MSG_UNKNOWN_ERROR
        );
        assert_eq!(
            resolve_error_message(&FrontendError::Dropped),
            "Transaction dropped before it was mined"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_after_delay() {
        let (tx, _, _) = helper();
        tx.execute(async { Ok(()) }, ExecuteOptions::default())
            .await
            .unwrap();
        assert!(tx.state().is_success);

        let timer = tx.reset_after(Duration::from_secs(5));
        tokio::time::advance(Duration::from_secs(4)).await;
        assert!(tx.state().is_success);

        timer.await.unwrap();
        assert_eq!(tx.state(), TxState::default());
    }
}
