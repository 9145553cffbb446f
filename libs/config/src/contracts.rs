//! Contract address configuration
//!
//! Addresses arrive as strings from files or the environment. A blank or
//! all-zero address is a valid "not deployed here" state and resolves to
//! `None`; anything else must parse as a 20-byte hex address.

use anyhow::{Context, Result};
use ethers_core::types::Address;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Raw contract addresses as configured
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ContractAddresses {
    pub token_x: Option<String>,
    pub token_y: Option<String>,
    pub mini_amm: Option<String>,
    pub mini_amm_factory: Option<String>,
}

/// Parsed addresses; `None` means not configured
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolvedAddresses {
    pub token_x: Option<Address>,
    pub token_y: Option<Address>,
    pub mini_amm: Option<Address>,
    pub mini_amm_factory: Option<Address>,
}

impl ContractAddresses {
    /// Parse every configured address
    pub fn resolve(&self) -> Result<ResolvedAddresses> {
        Ok(ResolvedAddresses {
            token_x: parse_optional_address(self.token_x.as_deref()).context("token_x")?,
            token_y: parse_optional_address(self.token_y.as_deref()).context("token_y")?,
            mini_amm: parse_optional_address(self.mini_amm.as_deref()).context("mini_amm")?,
            mini_amm_factory: parse_optional_address(self.mini_amm_factory.as_deref())
                .context("mini_amm_factory")?,
        })
    }
}

/// Blank or zero → `Ok(None)`, malformed → `Err`
pub fn parse_optional_address(raw: Option<&str>) -> Result<Option<Address>> {
    let Some(raw) = raw.map(str::trim).filter(|value| !value.is_empty()) else {
        return Ok(None);
    };

    let address =
        Address::from_str(raw).with_context(|| format!("Invalid address format: {}", raw))?;

    if address.is_zero() {
        Ok(None)
    } else {
        Ok(Some(address))
    }
}
