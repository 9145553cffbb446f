//! # MiniAMM Types
//!
//! Shared value types for the MiniAMM client: static token metadata and the
//! conversion between raw on-chain integers and the decimal strings users
//! type and read.
//!
//! Everything here is pure and allocation-light; chain access lives in the
//! frontend service.

pub mod tokens;
pub mod units;

pub use tokens::{TokenInfo, LP_TOKEN, TOKEN_X, TOKEN_Y};
pub use units::{
    format_percent, format_token_amount, format_token_amount_exact, parse_token_amount,
    shorten_address, DEFAULT_DECIMALS, DEFAULT_DISPLAY_DECIMALS,
};

/// Raw on-chain integer type used for every amount and reserve
pub use ethers_core::types::U256;
