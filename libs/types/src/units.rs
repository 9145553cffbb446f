//! Token unit conversion and display formatting
//!
//! Amounts travel through the client as raw `U256` values in the token's
//! smallest unit. Conversion to and from human-readable decimal strings happens
//! only at the edges (form input, terminal output).
//!
//! ## Rules
//!
//! 1. **No floating point**: rounding is done on the integer value before it
//!    is rendered, so `0.0000005` never turns into `5e-7`.
//! 2. **Lossy input is zero**: blank, negative or malformed text parses to
//!    zero instead of failing, so previews stay branch-free.
//! 3. **Display vs exact**: `format_token_amount` is for labels,
//!    `format_token_amount_exact` for values fed back into inputs.

use ethers_core::types::U256;
use ethers_core::utils::{format_units, parse_units};
use rust_decimal::{Decimal, RoundingStrategy};

/// Default decimals for every token the client talks to
pub const DEFAULT_DECIMALS: u32 = 18;

/// Default number of fractional digits shown in labels
pub const DEFAULT_DISPLAY_DECIMALS: u32 = 6;

/// Label used for non-zero amounts below the display threshold
pub const DUST_LABEL: &str = "< 0.000001";

/// Format a raw amount for display.
///
/// Rounds half-up to `display_decimals` and strips trailing zeros. Non-zero
/// amounts smaller than `0.000001` render as [`DUST_LABEL`].
pub fn format_token_amount(amount: U256, decimals: u32, display_decimals: u32) -> String {
    if amount.is_zero() {
        return "0".to_string();
    }

    // amount < 10^decimals / 10^6  <=>  amount * 10^6 < 10^decimals
    let (scaled, overflow) = amount.overflowing_mul(U256::exp10(6));
    if !overflow && scaled < U256::exp10(decimals as usize) {
        return DUST_LABEL.to_string();
    }

    if decimals <= display_decimals {
        return format_token_amount_exact(amount, decimals);
    }

    let step = U256::exp10((decimals - display_decimals) as usize);
    let rounded = amount.saturating_add(step / 2) / step;
    match format_units(rounded, display_decimals) {
        Ok(text) => trim_fraction(&text),
        Err(_) => "0".to_string(),
    }
}

/// Format a raw amount with full precision, trailing zeros removed.
pub fn format_token_amount_exact(amount: U256, decimals: u32) -> String {
    match format_units(amount, decimals) {
        Ok(text) => trim_fraction(&text),
        Err(_) => "0".to_string(),
    }
}

/// Parse user text into a raw amount.
///
/// Blank, negative or malformed input yields zero.
pub fn parse_token_amount(text: &str, decimals: u32) -> U256 {
    let trimmed = text.trim();
    if trimmed.is_empty() || trimmed.starts_with('-') {
        return U256::zero();
    }

    match parse_units(trimmed, decimals) {
        Ok(parsed) => parsed.into(),
        Err(_) => U256::zero(),
    }
}

/// Shorten a hex address to `0x1234...abcd` form.
pub fn shorten_address(address: &str, chars: usize) -> String {
    if address.is_empty() {
        return String::new();
    }
    if address.len() <= chars * 2 + 2 {
        return address.to_string();
    }
    format!(
        "{}...{}",
        &address[..chars + 2],
        &address[address.len() - chars..]
    )
}

/// Render a ratio (0.0123) as a percentage string ("1.23%").
pub fn format_percent(ratio: Decimal, decimals: u32) -> String {
    let percent = (ratio * Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(decimals, RoundingStrategy::MidpointAwayFromZero);
    format!("{:.*}%", decimals as usize, percent)
}

fn trim_fraction(text: &str) -> String {
    if !text.contains('.') {
        return text.to_string();
    }
    let trimmed = text.trim_end_matches('0').trim_end_matches('.');
    if trimmed.is_empty() {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}
