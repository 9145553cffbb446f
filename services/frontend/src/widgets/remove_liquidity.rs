//! Remove liquidity form

use std::sync::Arc;
use std::time::Duration;

use ethers::types::{Address, U256};
use miniamm_amm::PoolReserves;
use miniamm_refresh::RefreshTopic;
use miniamm_types::{format_token_amount, parse_token_amount, LP_TOKEN};
use tracing::info;

use super::{ensure_idle, require, ResetTimer, LABEL_LOADING};
use crate::context::AppContext;
use crate::contracts::{AmmApi, TokenSide, TxHandle};
use crate::error::{FrontendError, Result};
use crate::logging::LogEmoji;
use crate::readers::{self, LpPosition};
use crate::transaction::{ExecuteOptions, Transaction, TxState};
use crate::watch::Watcher;

pub const REMOVE_REFRESH: &[RefreshTopic] =
    &[RefreshTopic::Balances, RefreshTopic::Pool, RefreshTopic::Lp];

pub struct RemoveLiquidityForm {
    amount: String,
    lp: Watcher<LpPosition>,
    pool: Watcher<PoolReserves>,
    amm: Option<Arc<dyn AmmApi>>,
    account: Option<Address>,
    tx: Transaction,
    display_decimals: u32,
    reset_delay: Duration,
    reset_timer: ResetTimer,
}

impl RemoveLiquidityForm {
    pub fn new(ctx: &AppContext) -> Self {
        Self {
            amount: String::new(),
            lp: readers::lp_position(ctx),
            pool: readers::pool_reserves(ctx),
            amm: ctx.contracts.amm.clone(),
            account: ctx.contracts.account,
            tx: ctx.transaction(),
            display_decimals: ctx.config.ui.display_decimals,
            reset_delay: ctx.success_reset(),
            reset_timer: ResetTimer::default(),
        }
    }

    pub fn set_amount(&mut self, text: &str) {
        self.amount = text.to_string();
    }

    pub fn amount(&self) -> &str {
        &self.amount
    }

    pub fn lp_amount(&self) -> U256 {
        parse_token_amount(&self.amount, LP_TOKEN.decimals)
    }

    pub fn position(&self) -> LpPosition {
        self.lp.value()
    }

    pub fn lp_balance_label(&self) -> String {
        let state = self.lp.snapshot();
        if state.is_loading {
            LABEL_LOADING.to_string()
        } else {
            format!(
                "{} LP",
                format_token_amount(state.value.balance, LP_TOKEN.decimals, self.display_decimals)
            )
        }
    }

    /// `(x, y)` returned for the entered LP amount; zero when the input is
    /// blank or the pool has no supply
    pub fn preview(&self) -> (U256, U256) {
        let position = self.lp.value();
        if self.amount.trim().is_empty() || position.total_supply.is_zero() {
            return (U256::zero(), U256::zero());
        }
        self.pool
            .value()
            .removal(self.lp_amount(), position.total_supply)
    }

    pub fn preview_labels(&self) -> (String, String) {
        let (x, y) = self.preview();
        (
            format_token_amount(x, TokenSide::X.info().decimals, self.display_decimals),
            format_token_amount(y, TokenSide::Y.info().decimals, self.display_decimals),
        )
    }

    pub fn can_submit(&self) -> bool {
        let lp_amount = self.lp_amount();
        self.amm.is_some()
            && !self.tx.is_loading()
            && !lp_amount.is_zero()
            && lp_amount <= self.lp.value().balance
    }

    pub fn tx_state(&self) -> TxState {
        self.tx.state()
    }

    pub async fn refresh(&self) {
        futures::join!(self.lp.refetch(), self.pool.refetch());
    }

    /// Burn the entered LP amount
    pub async fn submit(&mut self) -> Result<TxHandle> {
        ensure_idle(&self.tx)?;
        let amm = require(&self.amm, "AMM contract")?;
        require(&self.account, "Wallet")?;

        let lp_amount = self.lp_amount();
        if lp_amount.is_zero() {
            return Err(FrontendError::InvalidInput(
                "Enter an LP amount to remove".to_string(),
            ));
        }
        if lp_amount > self.lp.value().balance {
            return Err(FrontendError::InsufficientBalance);
        }

        self.reset_timer.cancel();
        let handle = self
            .tx
            .execute(
                amm.remove_liquidity(lp_amount),
                ExecuteOptions::refresh(REMOVE_REFRESH),
            )
            .await?;

        info!("{} Removed {} LP", LogEmoji::BURN, self.amount);
        self.amount.clear();
        self.refresh().await;
        self.reset_timer.schedule(&self.tx, self.reset_delay);
        Ok(handle)
    }
}
