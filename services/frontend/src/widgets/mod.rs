//! View models for the client's panels
//!
//! Each widget owns its form text, the watchers it displays and a
//! [`Transaction`] helper. Rendering is left to the caller; widgets only
//! expose labels and submit operations.

pub mod add_liquidity;
pub mod approval;
pub mod balance;
pub mod minter;
pub mod remove_liquidity;
pub mod swap;

pub use add_liquidity::AddLiquidityForm;
pub use approval::TokenApproval;
pub use balance::TokenBalanceView;
pub use minter::TokenMinter;
pub use remove_liquidity::RemoveLiquidityForm;
pub use swap::SwapForm;

use std::time::Duration;
use tokio::task::JoinHandle;

use crate::error::{FrontendError, Result};
use crate::transaction::Transaction;

pub const LABEL_LOADING: &str = "Loading...";
pub const LABEL_ERROR: &str = "Error";

/// Refuse a submit while another transaction from the same widget is pending
fn ensure_idle(tx: &Transaction) -> Result<()> {
    if tx.is_loading() {
        Err(FrontendError::Unavailable("Pending transaction"))
    } else {
        Ok(())
    }
}

fn require<T: Clone>(handle: &Option<T>, what: &'static str) -> Result<T> {
    handle.clone().ok_or(FrontendError::Unavailable(what))
}

/// Pending success-banner reset; cancelled when the next transaction starts
#[derive(Default)]
struct ResetTimer(Option<JoinHandle<()>>);

impl ResetTimer {
    fn schedule(&mut self, tx: &Transaction, delay: Duration) {
        self.cancel();
        self.0 = Some(tx.reset_after(delay));
    }

    fn cancel(&mut self) {
        if let Some(timer) = self.0.take() {
            timer.abort();
        }
    }
}

impl Drop for ResetTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}
