//! Allowance readout and approval for one token

use std::sync::Arc;

use ethers::types::{Address, U256};
use miniamm_refresh::RefreshTopic;
use miniamm_types::{format_token_amount, parse_token_amount};
use tracing::info;

use super::{ensure_idle, require, ResetTimer, LABEL_LOADING};
use crate::context::AppContext;
use crate::contracts::{TokenApi, TokenSide, TxHandle};
use crate::error::{FrontendError, Result};
use crate::logging::LogEmoji;
use crate::readers;
use crate::transaction::{ExecuteOptions, Transaction, TxState};
use crate::watch::Watcher;

/// Fractional digits shown for allowances
const ALLOWANCE_DISPLAY_DECIMALS: u32 = 4;

pub struct TokenApproval {
    side: TokenSide,
    token: Option<Arc<dyn TokenApi>>,
    spender: Option<Address>,
    account: Option<Address>,
    allowance: Watcher<U256>,
    tx: Transaction,
    amount: String,
    reset_delay: std::time::Duration,
    reset_timer: ResetTimer,
}

impl TokenApproval {
    pub fn new(ctx: &AppContext, side: TokenSide) -> Self {
        Self {
            side,
            token: ctx.contracts.token(side),
            spender: ctx.contracts.amm_address(),
            account: ctx.contracts.account,
            allowance: readers::allowance(ctx, side, ctx.balance_period()),
            tx: ctx.transaction(),
            amount: String::new(),
            reset_delay: ctx.approval_reset(),
            reset_timer: ResetTimer::default(),
        }
    }

    pub fn set_amount(&mut self, text: &str) {
        self.amount = text.to_string();
    }

    pub fn amount(&self) -> &str {
        &self.amount
    }

    pub fn allowance(&self) -> U256 {
        self.allowance.value()
    }

    pub fn allowance_label(&self) -> String {
        let state = self.allowance.snapshot();
        if state.is_loading {
            return LABEL_LOADING.to_string();
        }
        let info = self.side.info();
        format!(
            "{} {}",
            format_token_amount(state.value, info.decimals, ALLOWANCE_DISPLAY_DECIMALS),
            info.symbol
        )
    }

    pub fn tx_state(&self) -> TxState {
        self.tx.state()
    }

    pub async fn refresh(&self) {
        self.allowance.refetch().await;
    }

    /// Approve the entered amount for the AMM
    pub async fn approve(&mut self) -> Result<TxHandle> {
        let amount = parse_token_amount(&self.amount, self.side.info().decimals);
        if amount.is_zero() {
            return Err(FrontendError::InvalidInput(
                "Enter an amount to approve".to_string(),
            ));
        }
        self.submit(amount).await
    }

    /// Approve `U256::MAX` for the AMM
    pub async fn max_approve(&mut self) -> Result<TxHandle> {
        self.submit(U256::MAX).await
    }

    async fn submit(&mut self, amount: U256) -> Result<TxHandle> {
        ensure_idle(&self.tx)?;
        let token = require(&self.token, "Token contract")?;
        let spender = require(&self.spender, "AMM contract")?;
        require(&self.account, "Wallet")?;

        self.reset_timer.cancel();
        let handle = self
            .tx
            .execute(
                token.approve(spender, amount),
                ExecuteOptions::refresh(&[RefreshTopic::Allowances]),
            )
            .await?;

        info!("{} Approved {} for {:?}", LogEmoji::APPROVE, self.side, spender);
        self.amount.clear();
        self.allowance.refetch().await;
        self.reset_timer.schedule(&self.tx, self.reset_delay);
        Ok(handle)
    }
}
