//! Watchers for the readouts the widgets display
//!
//! | Reader | Topics | Period |
//! |---|---|---|
//! | token balance | `balances` | `ui.balance_refresh_ms` |
//! | pool reserves | `pool` | `ui.pool_refresh_ms` |
//! | LP position | `lp`, `balances` | `ui.balance_refresh_ms` |
//! | allowance to the AMM | `allowances` | caller supplied |
//!
//! A missing contract or account is not an error: the readout stays at its
//! default.

use ethers::types::U256;
use futures::FutureExt;
use miniamm_amm::PoolReserves;
use miniamm_refresh::RefreshTopic;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

use crate::context::AppContext;
use crate::contracts::TokenSide;
use crate::watch::{Fetch, Watcher};

pub const BALANCE_TOPICS: &[RefreshTopic] = &[RefreshTopic::Balances];
pub const POOL_TOPICS: &[RefreshTopic] = &[RefreshTopic::Pool];
pub const LP_TOPICS: &[RefreshTopic] = &[RefreshTopic::Lp, RefreshTopic::Balances];
pub const ALLOWANCE_TOPICS: &[RefreshTopic] = &[RefreshTopic::Allowances];

/// Connected account's share of the pool
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LpPosition {
    pub balance: U256,
    pub total_supply: U256,
}

pub fn token_balance(ctx: &AppContext, side: TokenSide) -> Watcher<U256> {
    let token = ctx.contracts.token(side);
    let owner = ctx.contracts.account;

    let fetch: Fetch<U256> = Arc::new(move || {
        let token = token.clone();
        async move {
            match (token, owner) {
                (Some(token), Some(owner)) => token.balance_of(owner).await,
                _ => Ok(U256::zero()),
            }
        }
        .boxed()
    });

    Watcher::spawn(
        "token balance",
        &ctx.bus,
        BALANCE_TOPICS,
        ctx.balance_period(),
        fetch,
    )
}

pub fn pool_reserves(ctx: &AppContext) -> Watcher<PoolReserves> {
    let amm = ctx.contracts.amm.clone();

    let fetch: Fetch<PoolReserves> = Arc::new(move || {
        let amm = amm.clone();
        async move {
            match amm {
                Some(amm) => amm.reserves().await,
                None => Ok(PoolReserves::default()),
            }
        }
        .boxed()
    });

    Watcher::spawn(
        "pool reserves",
        &ctx.bus,
        POOL_TOPICS,
        ctx.pool_period(),
        fetch,
    )
}

pub fn lp_position(ctx: &AppContext) -> Watcher<LpPosition> {
    let amm = ctx.contracts.amm.clone();
    let owner = ctx.contracts.account;

    let fetch: Fetch<LpPosition> = Arc::new(move || {
        let amm = amm.clone();
        async move {
            let (Some(amm), Some(owner)) = (amm, owner) else {
                return Ok(LpPosition::default());
            };
            let (balance, total_supply) =
                futures::try_join!(amm.lp_balance_of(owner), amm.total_supply())?;
            Ok(LpPosition {
                balance,
                total_supply,
            })
        }
        .boxed()
    });

    Watcher::spawn(
        "LP position",
        &ctx.bus,
        LP_TOPICS,
        ctx.balance_period(),
        fetch,
    )
}

/// Allowance granted by the connected account to the AMM
pub fn allowance(ctx: &AppContext, side: TokenSide, period: Duration) -> Watcher<U256> {
    let token = ctx.contracts.token(side);
    let owner = ctx.contracts.account;
    let spender = ctx.contracts.amm_address();

    let fetch: Fetch<U256> = Arc::new(move || {
        let token = token.clone();
        async move {
            match (token, owner, spender) {
                (Some(token), Some(owner), Some(spender)) => {
                    token.allowance(owner, spender).await
                }
                _ => Ok(U256::zero()),
            }
        }
        .boxed()
    });

    Watcher::spawn("allowance", &ctx.bus, ALLOWANCE_TOPICS, period, fetch)
}
