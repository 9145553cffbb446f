//! Pool snapshot and swap direction helpers
//!
//! A [`PoolReserves`] value is a point-in-time read of the AMM's `xReserve`,
//! `yReserve` and `k`. It is never mutated locally; every refresh replaces it.

use ethers_core::types::U256;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::pricing::{
    compute_proportional_amount, compute_removal_amounts, compute_swap_output, minimum_received,
    price_impact,
};

/// Reserves read from the AMM contract
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PoolReserves {
    pub reserve_x: U256,
    pub reserve_y: U256,
    pub k: U256,
}

/// Which pool asset is being sold
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub enum SwapDirection {
    #[default]
    XToY,
    YToX,
}

/// Preview of a swap against a reserve snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SwapQuote {
    pub direction: SwapDirection,
    pub amount_in: U256,
    pub amount_out: U256,
    /// Fraction of the spot-price output lost to the curve (0.09 = 9%)
    pub price_impact: Decimal,
    /// `amount_out` reduced by the slippage tolerance
    pub minimum_received: U256,
}

impl SwapDirection {
    /// The opposite direction
    pub fn toggled(self) -> Self {
        match self {
            SwapDirection::XToY => SwapDirection::YToX,
            SwapDirection::YToX => SwapDirection::XToY,
        }
    }

    /// `(x_amount_in, y_amount_in)` arguments for the AMM's `swap`
    pub fn swap_args(self, amount_in: U256) -> (U256, U256) {
        match self {
            SwapDirection::XToY => (amount_in, U256::zero()),
            SwapDirection::YToX => (U256::zero(), amount_in),
        }
    }
}

impl PoolReserves {
    pub fn new(reserve_x: U256, reserve_y: U256, k: U256) -> Self {
        Self {
            reserve_x,
            reserve_y,
            k,
        }
    }

    /// True until both sides have been seeded with liquidity
    pub fn is_empty(&self) -> bool {
        self.reserve_x.is_zero() || self.reserve_y.is_zero()
    }

    /// `(reserve_in, reserve_out)` for a swap in `direction`
    pub fn reserves_for(&self, direction: SwapDirection) -> (U256, U256) {
        match direction {
            SwapDirection::XToY => (self.reserve_x, self.reserve_y),
            SwapDirection::YToX => (self.reserve_y, self.reserve_x),
        }
    }

    /// Output preview for selling `amount_in`
    pub fn quote(&self, direction: SwapDirection, amount_in: U256, slippage_bps: u32) -> SwapQuote {
        let (reserve_in, reserve_out) = self.reserves_for(direction);
        let amount_out = compute_swap_output(amount_in, reserve_in, reserve_out);

        SwapQuote {
            direction,
            amount_in,
            amount_out,
            price_impact: price_impact(amount_in, amount_out, reserve_in, reserve_out),
            minimum_received: minimum_received(amount_out, slippage_bps),
        }
    }

    /// Amount of the opposite asset to pair with a deposit of `amount`
    /// on the `deposit_side` (`XToY` = depositing x, filling y).
    pub fn paired_deposit(&self, deposit_side: SwapDirection, amount: U256) -> U256 {
        let (same_side, other_side) = self.reserves_for(deposit_side);
        compute_proportional_amount(amount, same_side, other_side)
    }

    /// `(x, y)` returned for burning `lp_amount` of `total_supply`
    pub fn removal(&self, lp_amount: U256, total_supply: U256) -> (U256, U256) {
        compute_removal_amounts(lp_amount, self.reserve_x, self.reserve_y, total_supply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool(x: u64, y: u64) -> PoolReserves {
        PoolReserves::new(U256::from(x), U256::from(y), U256::from(x) * U256::from(y))
    }

    #[test]
    fn test_direction_swap_args() {
        let amount = U256::from(7u64);
        assert_eq!(SwapDirection::XToY.swap_args(amount), (amount, U256::zero()));
        assert_eq!(SwapDirection::YToX.swap_args(amount), (U256::zero(), amount));
        assert_eq!(SwapDirection::XToY.toggled(), SwapDirection::YToX);
    }

    #[test]
    fn test_quote_uses_direction_reserves() {
        let reserves = pool(1000, 2000);
        let x_to_y = reserves.quote(SwapDirection::XToY, U256::from(100u64), 50);
        let y_to_x = reserves.quote(SwapDirection::YToX, U256::from(100u64), 50);

        // 2000 - floor(2_000_000 / 1100) = 2000 - 1818
        assert_eq!(x_to_y.amount_out, U256::from(182u64));
        // 1000 - floor(2_000_000 / 2100) = 1000 - 952
        assert_eq!(y_to_x.amount_out, U256::from(48u64));
        assert_eq!(x_to_y.minimum_received, U256::from(181u64));
    }

    #[test]
    fn test_paired_deposit_both_directions() {
        let reserves = pool(1000, 2000);
        assert_eq!(
            reserves.paired_deposit(SwapDirection::XToY, U256::from(50u64)),
            U256::from(100u64)
        );
        assert_eq!(
            reserves.paired_deposit(SwapDirection::YToX, U256::from(100u64)),
            U256::from(50u64)
        );
    }

    #[test]
    fn test_empty_pool() {
        assert!(PoolReserves::default().is_empty());
        assert!(pool(0, 10).is_empty());
        assert!(!pool(1, 1).is_empty());
    }
}
