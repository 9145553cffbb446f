//! Add liquidity form with proportional auto-fill

use std::sync::Arc;
use std::time::Duration;

use ethers::types::{Address, U256};
use miniamm_amm::{PoolReserves, SwapDirection};
use miniamm_types::{format_token_amount_exact, parse_token_amount};
use tracing::info;

use super::swap::SWAP_REFRESH;
use super::{ensure_idle, require, ResetTimer};
use crate::context::AppContext;
use crate::contracts::{AmmApi, TokenSide, TxHandle};
use crate::error::{FrontendError, Result};
use crate::logging::LogEmoji;
use crate::readers;
use crate::transaction::{ExecuteOptions, Transaction, TxState};
use crate::watch::Watcher;

pub const MSG_LIQUIDITY_ALLOWANCE: &str = "Allowance is not enough for one or both tokens.";

pub struct AddLiquidityForm {
    amount_x: String,
    amount_y: String,
    last_edited: TokenSide,
    auto_fill: bool,
    pool: Watcher<PoolReserves>,
    allowance_x: Watcher<U256>,
    allowance_y: Watcher<U256>,
    amm: Option<Arc<dyn AmmApi>>,
    account: Option<Address>,
    tx: Transaction,
    reset_delay: Duration,
    reset_timer: ResetTimer,
}

impl AddLiquidityForm {
    pub fn new(ctx: &AppContext) -> Self {
        Self {
            amount_x: String::new(),
            amount_y: String::new(),
            last_edited: TokenSide::X,
            auto_fill: true,
            pool: readers::pool_reserves(ctx),
            allowance_x: readers::allowance(ctx, TokenSide::X, ctx.allowance_period()),
            allowance_y: readers::allowance(ctx, TokenSide::Y, ctx.allowance_period()),
            amm: ctx.contracts.amm.clone(),
            account: ctx.contracts.account,
            tx: ctx.transaction(),
            reset_delay: ctx.success_reset(),
            reset_timer: ResetTimer::default(),
        }
    }

    /// X field as it would be submitted against the latest reserves
    pub fn amount_x(&self) -> String {
        self.paired().0
    }

    /// Y field as it would be submitted against the latest reserves
    pub fn amount_y(&self) -> String {
        self.paired().1
    }

    pub fn last_edited(&self) -> TokenSide {
        self.last_edited
    }

    /// Edit the X field; Y follows when the pool is seeded
    pub fn set_amount_x(&mut self, text: &str) {
        self.amount_x = text.to_string();
        self.last_edited = TokenSide::X;
        self.auto_fill = true;
        self.sync_paired();
    }

    /// Edit the Y field; X follows when the pool is seeded
    pub fn set_amount_y(&mut self, text: &str) {
        self.amount_y = text.to_string();
        self.last_edited = TokenSide::Y;
        self.auto_fill = true;
        self.sync_paired();
    }

    /// Enter both sides verbatim, without auto-fill
    pub fn set_amounts(&mut self, x: &str, y: &str) {
        self.amount_x = x.to_string();
        self.amount_y = y.to_string();
        self.auto_fill = false;
    }

    /// Store the side opposite the last edit as derived from current reserves
    pub fn sync_paired(&mut self) {
        let (x, y) = self.paired();
        self.amount_x = x;
        self.amount_y = y;
    }

    /// Field pair with the follower side re-derived from the pool snapshot.
    /// An empty pool or verbatim entry leaves both fields as typed.
    fn paired(&self) -> (String, String) {
        let reserves = self.pool.value();
        if !self.auto_fill || reserves.is_empty() {
            return (self.amount_x.clone(), self.amount_y.clone());
        }

        match self.last_edited {
            TokenSide::X => {
                let y = if self.amount_x.is_empty() {
                    String::new()
                } else {
                    let x = parse_token_amount(&self.amount_x, TokenSide::X.info().decimals);
                    format_token_amount_exact(
                        reserves.paired_deposit(SwapDirection::XToY, x),
                        TokenSide::Y.info().decimals,
                    )
                };
                (self.amount_x.clone(), y)
            }
            TokenSide::Y => {
                let x = if self.amount_y.is_empty() {
                    String::new()
                } else {
                    let y = parse_token_amount(&self.amount_y, TokenSide::Y.info().decimals);
                    format_token_amount_exact(
                        reserves.paired_deposit(SwapDirection::YToX, y),
                        TokenSide::X.info().decimals,
                    )
                };
                (x, self.amount_y.clone())
            }
        }
    }

    fn amounts(&self) -> (U256, U256) {
        let (x, y) = self.paired();
        (
            parse_token_amount(&x, TokenSide::X.info().decimals),
            parse_token_amount(&y, TokenSide::Y.info().decimals),
        )
    }

    pub fn is_approved(&self, side: TokenSide) -> bool {
        let (x, y) = self.amounts();
        match side {
            TokenSide::X => self.allowance_x.value() >= x,
            TokenSide::Y => self.allowance_y.value() >= y,
        }
    }

    pub fn button_label(&self) -> String {
        if self.tx.is_loading() {
            "Adding...".to_string()
        } else if !self.is_approved(TokenSide::X) {
            format!("Approve {} First", TokenSide::X)
        } else if !self.is_approved(TokenSide::Y) {
            format!("Approve {} First", TokenSide::Y)
        } else {
            "Add Liquidity".to_string()
        }
    }

    pub fn reserves(&self) -> PoolReserves {
        self.pool.value()
    }

    pub fn tx_state(&self) -> TxState {
        self.tx.state()
    }

    /// Reload reserves and allowances, then re-derive the paired field
    pub async fn refresh(&mut self) {
        futures::join!(
            self.pool.refetch(),
            self.allowance_x.refetch(),
            self.allowance_y.refetch()
        );
        self.sync_paired();
    }

    pub async fn submit(&mut self) -> Result<TxHandle> {
        ensure_idle(&self.tx)?;
        self.sync_paired();
        let amm = require(&self.amm, "AMM contract")?;
        require(&self.account, "Wallet")?;

        if self.amount_x.trim().is_empty() || self.amount_y.trim().is_empty() {
            return Err(FrontendError::InvalidInput(
                "Enter amounts for both tokens".to_string(),
            ));
        }

        let (x, y) = self.amounts();
        if x.is_zero() && y.is_zero() {
            return Err(FrontendError::InvalidInput(
                "Deposit amounts must be positive".to_string(),
            ));
        }
        if self.allowance_x.value() < x || self.allowance_y.value() < y {
            return Err(FrontendError::InsufficientAllowance(
                MSG_LIQUIDITY_ALLOWANCE.to_string(),
            ));
        }

        self.reset_timer.cancel();
        let handle = self
            .tx
            .execute(amm.add_liquidity(x, y), ExecuteOptions::refresh(SWAP_REFRESH))
            .await?;

        info!(
            "{} Added {} {} and {} {}",
            LogEmoji::MINT,
            self.amount_x,
            TokenSide::X,
            self.amount_y,
            TokenSide::Y
        );
        self.amount_x.clear();
        self.amount_y.clear();
        self.pool.refetch().await;
        self.reset_timer.schedule(&self.tx, self.reset_delay);
        Ok(handle)
    }
}
