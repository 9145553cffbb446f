//! Static metadata for the pool's assets

use serde::Serialize;

use crate::units::DEFAULT_DECIMALS;

/// Display metadata for a token the client interacts with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TokenInfo {
    pub symbol: &'static str,
    pub name: &'static str,
    pub decimals: u32,
}

/// First pool asset (the AMM's `x` side)
pub const TOKEN_X: TokenInfo = TokenInfo {
    symbol: "TOKX",
    name: "Token X",
    decimals: DEFAULT_DECIMALS,
};

/// Second pool asset (the AMM's `y` side)
pub const TOKEN_Y: TokenInfo = TokenInfo {
    symbol: "TOKY",
    name: "Token Y",
    decimals: DEFAULT_DECIMALS,
};

/// Liquidity share token minted by the AMM itself
pub const LP_TOKEN: TokenInfo = TokenInfo {
    symbol: "MINI-LP",
    name: "MiniAMM LP Token",
    decimals: DEFAULT_DECIMALS,
};
