//! # MiniAMM Frontend
//!
//! ## Purpose
//!
//! Client for a deployed MiniAMM pool and its two mintable test tokens:
//! balance and reserve readouts, swap and liquidity previews, and the
//! transactions behind them (mint, approve, swap, add and remove liquidity).
//!
//! ## Architecture
//!
//! ```text
//! AppContext ── ContractSet (TokenApi / AmmApi handles)
//!     │      └─ RefreshBus ◄──────────────┐
//!     ▼                                   │ publish on success
//! widgets ── Watcher<T> (poll + bus) ──── Transaction ── Notifier
//!     │
//!     └─ miniamm_amm previews
//! ```
//!
//! Widgets are view models; the `miniamm` binary drives them from the
//! command line.

pub mod context;
pub mod contracts;
pub mod error;
pub mod logging;
pub mod notify;
pub mod readers;
pub mod transaction;
pub mod watch;
pub mod widgets;

pub use context::AppContext;
pub use contracts::{AmmApi, ContractSet, TokenApi, TokenSide, TxHandle};
pub use error::{FrontendError, Result};
pub use notify::{LogNotifier, Notifier, ToastId};
pub use transaction::{resolve_error_message, ExecuteOptions, Transaction, TxState};
pub use watch::{ReadState, Watcher};
