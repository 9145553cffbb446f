//! Token balance readout

use ethers::types::U256;
use miniamm_types::{format_token_amount, TokenInfo};

use super::{LABEL_ERROR, LABEL_LOADING};
use crate::context::AppContext;
use crate::contracts::TokenSide;
use crate::readers;
use crate::watch::{ReadState, Watcher};

const BALANCE_DISPLAY_DECIMALS: u32 = 4;

pub struct TokenBalanceView {
    info: TokenInfo,
    watcher: Watcher<U256>,
}

impl TokenBalanceView {
    pub fn new(ctx: &AppContext, side: TokenSide) -> Self {
        Self {
            info: side.info(),
            watcher: readers::token_balance(ctx, side),
        }
    }

    pub fn state(&self) -> ReadState<U256> {
        self.watcher.snapshot()
    }

    pub fn balance(&self) -> U256 {
        self.watcher.value()
    }

    /// `"Loading..."`, `"Error"`, or the amount and symbol
    pub fn label(&self) -> String {
        let state = self.watcher.snapshot();
        if state.is_loading {
            LABEL_LOADING.to_string()
        } else if state.error.is_some() {
            LABEL_ERROR.to_string()
        } else {
            format!(
                "{} {}",
                format_token_amount(state.value, self.info.decimals, BALANCE_DISPLAY_DECIMALS),
                self.info.symbol
            )
        }
    }

    pub async fn refresh(&self) {
        self.watcher.refetch().await;
    }
}
