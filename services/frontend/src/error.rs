//! Frontend error types

use thiserror::Error;

/// Errors surfaced by contract access, transactions and widgets
#[derive(Debug, Error)]
pub enum FrontendError {
    /// RPC or contract failure. `short` carries the decoded revert reason.
    #[error("{message}")]
    Chain {
        message: String,
        short: Option<String>,
    },

    #[error("Wallet is read-only; provide a private key on the configured chain to send transactions")]
    ReadOnly,

    #[error("{0} is not available")]
    Unavailable(&'static str),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("{0}")]
    InsufficientAllowance(String),

    #[error("Amount exceeds your balance")]
    InsufficientBalance,

    #[error("Transaction dropped before it was mined")]
    Dropped,
}

impl FrontendError {
    pub fn chain(message: impl Into<String>) -> Self {
        FrontendError::Chain {
            message: message.into(),
            short: None,
        }
    }

    /// Chain failure with a human-readable revert reason
    pub fn revert(message: impl Into<String>, reason: impl Into<String>) -> Self {
        FrontendError::Chain {
            message: message.into(),
            short: Some(reason.into()),
        }
    }

    /// Short, user-facing message when one is known
    pub fn short_message(&self) -> Option<&str> {
        match self {
            FrontendError::Chain { short, .. } => short.as_deref(),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, FrontendError>;
