//! Constant product (x*y=k) pricing with exact integer arithmetic
//!
//! Mirrors the simplified on-chain formula: no fee term, integer floor
//! division, 256-bit operands. Products are widened to `U512` so
//! `reserve_in * reserve_out` cannot overflow for 18-decimal tokens.
//!
//! Every function here is total. Degenerate inputs (a zero amount or an empty
//! reserve) return zero instead of an error so previews never need a branch.

use ethers_core::types::{U256, U512};
use rust_decimal::Decimal;

/// Basis point denominator (10000 = 100%)
pub const BPS_DENOMINATOR: u32 = 10_000;

/// Largest magnitude converted into `Decimal` without rescaling (10^27)
const DECIMAL_SAFE_DIGITS: usize = 27;

/// Maximum output obtainable for `amount_in` while holding
/// `reserve_in * reserve_out` constant.
///
/// `k = reserve_in * reserve_out`, `new_reserve_out = floor(k / (reserve_in +
/// amount_in))`, `amount_out = reserve_out - new_reserve_out`.
pub fn compute_swap_output(amount_in: U256, reserve_in: U256, reserve_out: U256) -> U256 {
    if amount_in.is_zero() || reserve_in.is_zero() || reserve_out.is_zero() {
        return U256::zero();
    }

    let k = reserve_in.full_mul(reserve_out);
    let new_reserve_in = U512::from(reserve_in) + U512::from(amount_in);
    let new_reserve_out = k / new_reserve_in;

    let reserve_out = U512::from(reserve_out);
    if new_reserve_out >= reserve_out {
        return U256::zero();
    }

    narrow(reserve_out - new_reserve_out)
}

/// Amount of the other asset needed to deposit `amount_a` at the current
/// reserve ratio: `floor(amount_a * reserve_b / reserve_a)`.
///
/// The caller passes `(deposit, same_side_reserve, other_side_reserve)`; the
/// B->A direction swaps the reserve arguments.
pub fn compute_proportional_amount(amount_a: U256, reserve_a: U256, reserve_b: U256) -> U256 {
    if amount_a.is_zero() || reserve_a.is_zero() || reserve_b.is_zero() {
        return U256::zero();
    }

    narrow(amount_a.full_mul(reserve_b) / U512::from(reserve_a))
}

/// Pool assets returned for burning `lp_amount` shares out of `total_supply`.
pub fn compute_removal_amounts(
    lp_amount: U256,
    reserve_x: U256,
    reserve_y: U256,
    total_supply: U256,
) -> (U256, U256) {
    if lp_amount.is_zero() || total_supply.is_zero() {
        return (U256::zero(), U256::zero());
    }

    let supply = U512::from(total_supply);
    (
        narrow(lp_amount.full_mul(reserve_x) / supply),
        narrow(lp_amount.full_mul(reserve_y) / supply),
    )
}

/// Fraction of the spot-price output lost to curve slippage.
///
/// `ideal = amount_in * reserve_out / reserve_in`, impact = `(ideal -
/// amount_out) / ideal`. Returns zero when either reserve or the ideal output
/// is zero.
pub fn price_impact(
    amount_in: U256,
    amount_out: U256,
    reserve_in: U256,
    reserve_out: U256,
) -> Decimal {
    if reserve_in.is_zero() || reserve_out.is_zero() {
        return Decimal::ZERO;
    }

    let ideal = narrow(amount_in.full_mul(reserve_out) / U512::from(reserve_in));
    if ideal.is_zero() {
        return Decimal::ZERO;
    }

    let (ideal, actual) = rescale_pair(ideal, amount_out);
    if ideal.is_zero() {
        return Decimal::ZERO;
    }

    let ideal = to_decimal(ideal);
    let actual = to_decimal(actual);
    (ideal - actual) / ideal
}

/// Lower bound on output after applying a slippage tolerance in basis points.
pub fn minimum_received(amount_out: U256, slippage_bps: u32) -> U256 {
    let bps = slippage_bps.min(BPS_DENOMINATOR);
    let kept = U256::from(BPS_DENOMINATOR - bps);
    narrow(amount_out.full_mul(kept) / U512::from(BPS_DENOMINATOR))
}

/// Saturating U512 -> U256
fn narrow(value: U512) -> U256 {
    U256::try_from(value).unwrap_or(U256::MAX)
}

/// Divide both values by the same power of ten until the larger fits Decimal
fn rescale_pair(mut a: U256, mut b: U256) -> (U256, U256) {
    let limit = U256::exp10(DECIMAL_SAFE_DIGITS);
    let ten = U256::from(10u8);
    while a > limit || b > limit {
        a /= ten;
        b /= ten;
    }
    (a, b)
}

fn to_decimal(value: U256) -> Decimal {
    Decimal::from_i128_with_scale(value.low_u128() as i128, 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn u(value: u64) -> U256 {
        U256::from(value)
    }

    #[test]
    fn test_swap_output_reference_case() {
        // k = 1_000_000, new_reserve_in = 1100, new_reserve_out = 909
        assert_eq!(compute_swap_output(u(100), u(1000), u(1000)), u(91));
    }

    #[test]
    fn test_swap_output_degenerate_inputs() {
        assert_eq!(compute_swap_output(u(0), u(1000), u(1000)), U256::zero());
        assert_eq!(compute_swap_output(u(10), u(0), u(1000)), U256::zero());
        assert_eq!(compute_swap_output(u(10), u(1000), u(0)), U256::zero());
    }

    #[test]
    fn test_swap_output_never_drains_pool() {
        let out = compute_swap_output(U256::MAX, u(1000), u(1000));
        assert!(out < u(1000));
    }

    #[test]
    fn test_swap_output_18_decimal_reserves() {
        // k = 10^80 does not fit in 256 bits
        let reserve = U256::exp10(40);
        let amount_in = U256::exp10(38);
        let out = compute_swap_output(amount_in, reserve, reserve);
        assert!(out > U256::zero());
        assert!(out < amount_in);
    }

    #[test]
    fn test_proportional_amount_reference_case() {
        assert_eq!(compute_proportional_amount(u(50), u(1000), u(2000)), u(100));
        // floor, never rounds up
        assert_eq!(compute_proportional_amount(u(1), u(3), u(2)), u(0));
        assert_eq!(compute_proportional_amount(u(0), u(3), u(2)), u(0));
        assert_eq!(compute_proportional_amount(u(5), u(0), u(2)), u(0));
        assert_eq!(compute_proportional_amount(u(5), u(3), u(0)), u(0));
    }

    #[test]
    fn test_removal_amounts() {
        let (x, y) = compute_removal_amounts(u(10), u(1000), u(2000), u(100));
        assert_eq!((x, y), (u(100), u(200)));
        assert_eq!(
            compute_removal_amounts(u(10), u(1000), u(2000), U256::zero()),
            (U256::zero(), U256::zero())
        );
    }

    #[test]
    fn test_price_impact() {
        // ideal 100, actual 91 -> 9%
        let impact = price_impact(u(100), u(91), u(1000), u(1000));
        assert_eq!(impact, dec!(0.09));
        assert_eq!(price_impact(u(100), u(91), u(0), u(1000)), Decimal::ZERO);
    }

    #[test]
    fn test_price_impact_large_values_rescaled() {
        let reserve = U256::exp10(40);
        let amount_in = U256::exp10(39);
        let amount_out = compute_swap_output(amount_in, reserve, reserve);
        let impact = price_impact(amount_in, amount_out, reserve, reserve);
        assert!(impact > dec!(0.09) && impact < dec!(0.091));
    }

    #[test]
    fn test_minimum_received() {
        assert_eq!(minimum_received(u(10_000), 50), u(9_950));
        assert_eq!(minimum_received(u(10_000), 20_000), U256::zero());
        assert_eq!(minimum_received(u(10_000), 0), u(10_000));
    }
}
