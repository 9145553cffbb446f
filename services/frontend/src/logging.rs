//! Log setup and standardized emoji markers
//!
//! Status lines across the client use the same small emoji set so that
//! transaction progress is easy to pick out of `RUST_LOG=debug` output.

use anyhow::{Context, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Emoji markers for client log lines
pub struct LogEmoji;

impl LogEmoji {
    // Status indicators
    pub const SUCCESS: &'static str = "✅";
    pub const ERROR: &'static str = "❌";
    pub const WARNING: &'static str = "⚠️";
    pub const PENDING: &'static str = "⏳";

    // Client-specific
    pub const NETWORK: &'static str = "🌐"; // RPC and wallet
    pub const POOL: &'static str = "🏊"; // Reserves and LP
    pub const REFRESH: &'static str = "🔄";
    pub const SWAP: &'static str = "🔁";
    pub const MINT: &'static str = "➕";
    pub const BURN: &'static str = "➖";
    pub const APPROVE: &'static str = "🔓";
}

#[macro_export]
macro_rules! log_success {
    ($($arg:tt)*) => {
        tracing::info!("{} {}", $crate::logging::LogEmoji::SUCCESS, format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {
        tracing::error!("{} {}", $crate::logging::LogEmoji::ERROR, format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_pending {
    ($($arg:tt)*) => {
        tracing::info!("{} {}", $crate::logging::LogEmoji::PENDING, format!($($arg)*))
    };
}

/// Install the global subscriber.
///
/// `RUST_LOG` selects the filter (default `info`); `verbose` forces `debug`.
pub fn init(verbose: bool) -> Result<()> {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .try_init()
        .context("Failed to initialize logging")?;

    Ok(())
}
