//! Swap form

use std::sync::Arc;
use std::time::Duration;

use ethers::types::{Address, U256};
use miniamm_amm::{PoolReserves, SwapDirection, SwapQuote};
use miniamm_refresh::RefreshTopic;
use miniamm_types::{format_token_amount, parse_token_amount};
use tracing::info;

use super::{ensure_idle, require, ResetTimer};
use crate::context::AppContext;
use crate::contracts::{AmmApi, TokenSide, TxHandle};
use crate::error::{FrontendError, Result};
use crate::logging::LogEmoji;
use crate::readers;
use crate::transaction::{ExecuteOptions, Transaction, TxState};
use crate::watch::Watcher;

pub const MSG_SWAP_ALLOWANCE: &str = "Allowance is not enough. Please approve the token first.";

/// Topics invalidated by a swap
pub const SWAP_REFRESH: &[RefreshTopic] = &[
    RefreshTopic::Balances,
    RefreshTopic::Allowances,
    RefreshTopic::Pool,
    RefreshTopic::Lp,
];

pub struct SwapForm {
    direction: SwapDirection,
    input: String,
    pool: Watcher<PoolReserves>,
    allowance_x: Watcher<U256>,
    allowance_y: Watcher<U256>,
    amm: Option<Arc<dyn AmmApi>>,
    account: Option<Address>,
    tx: Transaction,
    slippage_bps: u32,
    display_decimals: u32,
    reset_delay: Duration,
    reset_timer: ResetTimer,
}

impl SwapForm {
    pub fn new(ctx: &AppContext) -> Self {
        Self {
            direction: SwapDirection::XToY,
            input: String::new(),
            pool: readers::pool_reserves(ctx),
            allowance_x: readers::allowance(ctx, TokenSide::X, ctx.allowance_period()),
            allowance_y: readers::allowance(ctx, TokenSide::Y, ctx.allowance_period()),
            amm: ctx.contracts.amm.clone(),
            account: ctx.contracts.account,
            tx: ctx.transaction(),
            slippage_bps: ctx.config.tx.default_slippage_bps,
            display_decimals: ctx.config.ui.display_decimals,
            reset_delay: ctx.success_reset(),
            reset_timer: ResetTimer::default(),
        }
    }

    pub fn direction(&self) -> SwapDirection {
        self.direction
    }

    pub fn from_token(&self) -> TokenSide {
        match self.direction {
            SwapDirection::XToY => TokenSide::X,
            SwapDirection::YToX => TokenSide::Y,
        }
    }

    pub fn to_token(&self) -> TokenSide {
        match self.direction {
            SwapDirection::XToY => TokenSide::Y,
            SwapDirection::YToX => TokenSide::X,
        }
    }

    /// Flip direction; clears the input and the transaction banner
    pub fn toggle_direction(&mut self) {
        self.direction = self.direction.toggled();
        self.input.clear();
        self.tx.reset();
    }

    pub fn set_direction(&mut self, direction: SwapDirection) {
        if direction != self.direction {
            self.toggle_direction();
        }
    }

    pub fn set_input(&mut self, text: &str) {
        self.input = text.to_string();
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn reserves(&self) -> PoolReserves {
        self.pool.value()
    }

    pub fn amount_in(&self) -> U256 {
        parse_token_amount(&self.input, self.from_token().info().decimals)
    }

    /// Preview against the latest reserve snapshot; `None` while the input
    /// is blank
    pub fn quote(&self) -> Option<SwapQuote> {
        if self.input.trim().is_empty() {
            return None;
        }
        Some(
            self.pool
                .value()
                .quote(self.direction, self.amount_in(), self.slippage_bps),
        )
    }

    pub fn output_text(&self) -> String {
        self.quote()
            .map(|quote| {
                format_token_amount(
                    quote.amount_out,
                    self.to_token().info().decimals,
                    self.display_decimals,
                )
            })
            .unwrap_or_default()
    }

    /// Allowance of the token being sold
    pub fn allowance(&self) -> U256 {
        match self.from_token() {
            TokenSide::X => self.allowance_x.value(),
            TokenSide::Y => self.allowance_y.value(),
        }
    }

    pub fn is_approved(&self) -> bool {
        self.allowance() >= self.amount_in()
    }

    pub fn button_label(&self) -> &'static str {
        if self.tx.is_loading() {
            "Swapping..."
        } else if self.is_approved() {
            "Swap"
        } else {
            "Approve First"
        }
    }

    pub fn tx_state(&self) -> TxState {
        self.tx.state()
    }

    pub async fn refresh(&self) {
        futures::join!(
            self.pool.refetch(),
            self.allowance_x.refetch(),
            self.allowance_y.refetch()
        );
    }

    /// Sell the entered amount
    pub async fn swap(&mut self) -> Result<TxHandle> {
        ensure_idle(&self.tx)?;
        let amm = require(&self.amm, "AMM contract")?;
        require(&self.account, "Wallet")?;

        let amount_in = self.amount_in();
        if amount_in.is_zero() {
            return Err(FrontendError::InvalidInput(
                "Enter an amount to swap".to_string(),
            ));
        }
        if self.allowance() < amount_in {
            return Err(FrontendError::InsufficientAllowance(
                MSG_SWAP_ALLOWANCE.to_string(),
            ));
        }

        let (x_amount_in, y_amount_in) = self.direction.swap_args(amount_in);
        self.reset_timer.cancel();
        let handle = self
            .tx
            .execute(
                amm.swap(x_amount_in, y_amount_in),
                ExecuteOptions::refresh(SWAP_REFRESH),
            )
            .await?;

        info!(
            "{} Swapped {} {} for {}",
            LogEmoji::SWAP,
            self.input,
            self.from_token(),
            self.to_token()
        );
        self.input.clear();
        self.refresh().await;
        self.reset_timer.schedule(&self.tx, self.reset_delay);
        Ok(handle)
    }
}
