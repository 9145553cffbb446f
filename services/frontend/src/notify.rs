//! User-facing notifications
//!
//! A [`Notifier`] plays the role of toast popups: a loading notice is opened
//! when a transaction starts and later replaced by a success or error notice
//! with the same id.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::{log_error, log_pending, log_success};

/// Handle linking a loading notice to its outcome
pub type ToastId = u64;

pub trait Notifier: Send + Sync {
    fn loading(&self, message: &str) -> ToastId;
    fn success(&self, id: ToastId, message: &str);
    fn error(&self, id: ToastId, message: &str);
}

/// Renders notifications as log lines
#[derive(Debug, Default)]
pub struct LogNotifier {
    next_id: AtomicU64,
}

impl LogNotifier {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Notifier for LogNotifier {
    fn loading(&self, message: &str) -> ToastId {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        log_pending!("[{}] {}", id, message);
        id
    }

    fn success(&self, id: ToastId, message: &str) {
        log_success!("[{}] {}", id, message);
    }

    fn error(&self, id: ToastId, message: &str) {
        log_error!("[{}] {}", id, message);
    }
}
