//! Free test-token minting

use std::sync::Arc;

use miniamm_refresh::RefreshTopic;
use miniamm_types::parse_token_amount;
use tracing::info;

use super::{ensure_idle, require};
use crate::context::AppContext;
use crate::contracts::{TokenApi, TokenSide, TxHandle};
use crate::error::{FrontendError, Result};
use crate::logging::LogEmoji;
use crate::transaction::{ExecuteOptions, Transaction, TxState};

pub struct TokenMinter {
    side: TokenSide,
    token: Option<Arc<dyn TokenApi>>,
    tx: Transaction,
    amount: String,
}

impl TokenMinter {
    pub fn new(ctx: &AppContext, side: TokenSide) -> Self {
        Self {
            side,
            token: ctx.contracts.token(side),
            tx: ctx.transaction(),
            amount: String::new(),
        }
    }

    pub fn set_amount(&mut self, text: &str) {
        self.amount = text.to_string();
    }

    pub fn amount(&self) -> &str {
        &self.amount
    }

    pub fn tx_state(&self) -> TxState {
        self.tx.state()
    }

    pub fn button_label(&self) -> String {
        if self.tx.is_loading() {
            return "Minting...".to_string();
        }
        let amount = if self.amount.is_empty() { "0" } else { &self.amount };
        format!("Mint {} {}", amount, self.side)
    }

    /// Mint the entered amount to the connected account
    pub async fn mint(&mut self) -> Result<TxHandle> {
        ensure_idle(&self.tx)?;
        let token = require(&self.token, "Token contract")?;

        let amount = parse_token_amount(&self.amount, self.side.info().decimals);
        if amount.is_zero() {
            return Err(FrontendError::InvalidInput(
                "Enter an amount to mint".to_string(),
            ));
        }

        let handle = self
            .tx
            .execute(
                token.free_mint_to_sender(amount),
                ExecuteOptions::refresh(&[RefreshTopic::Balances]),
            )
            .await?;

        info!("{} Minted {} {}", LogEmoji::MINT, self.amount, self.side);
        self.amount.clear();
        Ok(handle)
    }
}
