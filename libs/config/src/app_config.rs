//! Application Configuration Module
//!
//! Loads the client configuration from layered sources, lowest priority
//! first:
//!
//! 1. Built-in defaults ([`AppConfig::default`])
//! 2. Optional TOML file
//! 3. `MINIAMM_` prefixed environment, `__` for nesting
//!    (`MINIAMM_UI__POOL_REFRESH_MS=2000`)
//! 4. The flat deployment variables in [`ENV_OVERRIDES`]
//!
//! Contract addresses are kept as strings here and resolved with
//! [`ContractAddresses::resolve`], where blank or zero addresses mean
//! "not configured".

use anyhow::{bail, Context, Result};
use config_crate::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

use crate::contracts::ContractAddresses;

/// Prefix for nested environment overrides
pub const ENV_PREFIX: &str = "MINIAMM";

/// Flat deployment variables and the config key each one sets
pub const ENV_OVERRIDES: [(&str, &str); 6] = [
    ("MINIAMM_TOKEN_X_ADDRESS", "contracts.token_x"),
    ("MINIAMM_TOKEN_Y_ADDRESS", "contracts.token_y"),
    ("MINIAMM_AMM_ADDRESS", "contracts.mini_amm"),
    ("MINIAMM_AMM_FACTORY_ADDRESS", "contracts.mini_amm_factory"),
    ("MINIAMM_RPC_URL", "network.rpc_url"),
    ("MINIAMM_WALLETCONNECT_PROJECT_ID", "network.wallet_connect_project_id"),
];

/// Complete client configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Deployed contract addresses
    pub contracts: ContractAddresses,
    /// RPC and wallet connectivity
    pub network: NetworkConfig,
    /// Target chain
    pub chain: ChainConfig,
    /// Transaction parameters
    pub tx: TxConfig,
    /// Refresh cadence and display settings
    pub ui: UiConfig,
}

/// RPC endpoint and wallet connection settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// JSON-RPC endpoint; `None` leaves every contract unavailable
    pub rpc_url: Option<String>,
    /// Wallet-connect project id, passed through for wallet integrations
    pub wallet_connect_project_id: Option<String>,
}

/// Chain the contracts are deployed on
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainConfig {
    /// Expected chain id; a signer on another chain is demoted to read-only
    pub chain_id: u64,
    /// Block explorer base URL for transaction links
    pub explorer_url: String,
}

/// Transaction defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TxConfig {
    /// Gas limit attached to state-changing calls
    pub gas_limit: u64,
    /// Slippage used for "minimum received" previews (basis points)
    pub default_slippage_bps: u32,
    /// Upper bound accepted for slippage (basis points)
    pub max_slippage_bps: u32,
}

/// Refresh intervals and display settings (milliseconds unless noted)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Input debounce before a preview is recomputed
    pub debounce_ms: u64,
    /// Token and LP balance polling interval
    pub balance_refresh_ms: u64,
    /// Pool reserve polling interval
    pub pool_refresh_ms: u64,
    /// Allowance polling interval used by swap and liquidity forms
    pub allowance_refresh_ms: u64,
    /// Fractional digits shown in labels
    pub display_decimals: u32,
    /// Delay before a success banner is cleared
    pub success_reset_ms: u64,
    /// Delay before an approval success banner is cleared
    pub approval_reset_ms: u64,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            chain_id: 11_155_111, // Sepolia
            explorer_url: "https://sepolia.etherscan.io".to_string(),
        }
    }
}

impl Default for TxConfig {
    fn default() -> Self {
        Self {
            gas_limit: 500_000,
            default_slippage_bps: 50, // 0.5%
            max_slippage_bps: 500,    // 5%
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 500,
            balance_refresh_ms: 10_000,
            pool_refresh_ms: 5_000,
            allowance_refresh_ms: 5_000,
            display_decimals: 6,
            success_reset_ms: 5_000,
            approval_reset_ms: 3_000,
        }
    }
}

impl AppConfig {
    /// Load from defaults, an optional file and the process environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with(path, |key| std::env::var(key).ok())
    }

    /// Load with an injectable lookup for the flat deployment variables
    pub fn load_with<F>(path: Option<&Path>, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults =
            Config::try_from(&AppConfig::default()).context("Failed to encode default configuration")?;

        let mut builder = Config::builder().add_source(defaults);

        if let Some(path) = path {
            info!("Loading configuration file: {:?}", path);
            builder = builder.add_source(File::from(path).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        for (var, key) in ENV_OVERRIDES {
            if let Some(value) = lookup(var) {
                debug!("Override {} from {}", key, var);
                builder = builder
                    .set_override(key, value)
                    .with_context(|| format!("Invalid override for {}", key))?;
            }
        }

        let config: AppConfig = builder
            .build()
            .context("Failed to build configuration")?
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        config.validate()?;
        Ok(config)
    }

    /// Validate parameter ranges and address formats
    pub fn validate(&self) -> Result<()> {
        if self.tx.max_slippage_bps > 10_000 {
            bail!("max_slippage_bps must be <= 10000 (100%)");
        }

        if self.tx.default_slippage_bps > self.tx.max_slippage_bps {
            bail!(
                "default_slippage_bps {} exceeds max_slippage_bps {}",
                self.tx.default_slippage_bps,
                self.tx.max_slippage_bps
            );
        }

        if self.ui.balance_refresh_ms == 0
            || self.ui.pool_refresh_ms == 0
            || self.ui.allowance_refresh_ms == 0
        {
            bail!("refresh intervals must be positive");
        }

        self.contracts
            .resolve()
            .context("Invalid contract address in configuration")?;

        Ok(())
    }

    /// Explorer link for a transaction hash
    pub fn explorer_tx_url(&self, tx_hash: &str) -> String {
        format!("{}/tx/{}", self.chain.explorer_url.trim_end_matches('/'), tx_hash)
    }
}
