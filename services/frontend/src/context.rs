//! Session context shared by every widget

use miniamm_config::AppConfig;
use miniamm_refresh::RefreshBus;
use std::sync::Arc;
use std::time::Duration;

use crate::contracts::ContractSet;
use crate::notify::{LogNotifier, Notifier};
use crate::transaction::Transaction;

/// Configuration, contract handles, the refresh bus and the notifier for one
/// session. Cheap to clone.
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<AppConfig>,
    pub contracts: ContractSet,
    pub bus: RefreshBus,
    pub notifier: Arc<dyn Notifier>,
}

impl AppContext {
    pub fn new(config: AppConfig, contracts: ContractSet, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            config: Arc::new(config),
            contracts,
            bus: RefreshBus::new(),
            notifier,
        }
    }

    /// Resolve contracts from `config` and log notifications
    pub async fn connect(config: AppConfig, wallet_key: Option<&str>) -> anyhow::Result<Self> {
        let contracts = ContractSet::resolve(&config, wallet_key).await?;
        Ok(Self::new(config, contracts, Arc::new(LogNotifier::new())))
    }

    /// Fresh transaction helper wired to this session's bus and notifier
    pub fn transaction(&self) -> Transaction {
        Transaction::new(self.bus.clone(), Arc::clone(&self.notifier))
    }

    pub fn balance_period(&self) -> Duration {
        Duration::from_millis(self.config.ui.balance_refresh_ms)
    }

    pub fn pool_period(&self) -> Duration {
        Duration::from_millis(self.config.ui.pool_refresh_ms)
    }

    pub fn allowance_period(&self) -> Duration {
        Duration::from_millis(self.config.ui.allowance_refresh_ms)
    }

    pub fn success_reset(&self) -> Duration {
        Duration::from_millis(self.config.ui.success_reset_ms)
    }

    pub fn approval_reset(&self) -> Duration {
        Duration::from_millis(self.config.ui.approval_reset_ms)
    }
}
