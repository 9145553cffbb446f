//! # MiniAMM Configuration
//!
//! Centralized configuration for the MiniAMM client: deployed contract
//! addresses, RPC connectivity, chain identity, transaction defaults and UI
//! refresh cadence.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use miniamm_config::AppConfig;
//!
//! let config = AppConfig::load(None)?;
//! let addresses = config.contracts.resolve()?;
//! if addresses.mini_amm.is_none() {
//!     println!("AMM not configured");
//! }
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod app_config;
pub mod contracts;

pub use app_config::{
    AppConfig, ChainConfig, NetworkConfig, TxConfig, UiConfig, ENV_OVERRIDES, ENV_PREFIX,
};
pub use contracts::{parse_optional_address, ContractAddresses, ResolvedAddresses};
