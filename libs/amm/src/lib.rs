//! # MiniAMM Math - Constant Product Pricing
//!
//! ## Purpose
//!
//! Integer-exact previews for a zero-fee constant product AMM. The client uses
//! these to show swap output, auto-fill paired liquidity deposits and preview
//! liquidity removal before a transaction is submitted. The contract remains
//! the authority: a preview never replaces the on-chain result.
//!
//! ## Integration Points
//!
//! - **Input Sources**: reserve snapshots read by the frontend's pool watcher,
//!   amounts parsed from user input
//! - **Output Destinations**: swap and liquidity widgets
//! - **Precision**: raw `U256` smallest-unit integers, `U512` intermediates,
//!   floor division matching the contract
//!
//! ## Conventions
//!
//! - Functions are total: a zero amount or empty reserve yields zero
//! - No fee term is modeled
//! - `Decimal` is used only for derived ratios (price impact), never amounts

pub mod pool;
pub mod pricing;

pub use pool::{PoolReserves, SwapDirection, SwapQuote};
pub use pricing::{
    compute_proportional_amount, compute_removal_amounts, compute_swap_output, minimum_received,
    price_impact, BPS_DENOMINATOR,
};

pub use ethers_core::types::U256;
pub use rust_decimal::Decimal;
