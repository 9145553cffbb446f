//! Contract access layer
//!
//! ABI bindings for the two deployed contracts, object-safe async traits the
//! rest of the client programs against, and [`ContractSet`] which decides
//! per session whether each handle is missing, read-only or signer-backed.
//!
//! ## Degrade rules
//!
//! - No RPC URL: every handle is `None`
//! - Valid key on the configured chain: signer-backed handles
//! - Invalid key, wrong chain or failed chain lookup: read-only handles
//! - Zero or blank contract address: that handle is `None`

use anyhow::Context;
use async_trait::async_trait;
use ethers::abi::{self, Detokenize, ParamType, Token};
use ethers::contract::{abigen, ContractCall, ContractError};
use ethers::middleware::SignerMiddleware;
use ethers::providers::{Http, Middleware, Provider};
use ethers::signers::{LocalWallet, Signer};
use ethers::types::{Address, H256, U256, U64};
use miniamm_amm::PoolReserves;
use miniamm_config::{AppConfig, ResolvedAddresses};
use miniamm_types::{TokenInfo, TOKEN_X, TOKEN_Y};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};
use url::Url;

use crate::error::{FrontendError, Result};
use crate::logging::LogEmoji;

abigen!(
    MockErc20,
    r#"[
        function balanceOf(address account) external view returns (uint256)
        function allowance(address owner, address spender) external view returns (uint256)
        function approve(address spender, uint256 amount) external returns (bool)
        function freeMintToSender(uint256 amount) external
        function totalSupply() external view returns (uint256)
        function decimals() external view returns (uint8)
        function symbol() external view returns (string)
    ]"#
);

abigen!(
    MiniAmm,
    r#"[
        function xReserve() external view returns (uint256)
        function yReserve() external view returns (uint256)
        function k() external view returns (uint256)
        function swap(uint256 xAmountIn, uint256 yAmountIn) external
        function addLiquidity(uint256 xAmountIn, uint256 yAmountIn) external
        function removeLiquidity(uint256 lpAmount) external
        function balanceOf(address account) external view returns (uint256)
        function totalSupply() external view returns (uint256)
    ]"#
);

/// Selector of Solidity's `Error(string)`
const ERROR_STRING_SELECTOR: [u8; 4] = [0x08, 0xc3, 0x79, 0xa0];

/// A mined transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TxHandle {
    pub hash: H256,
    pub block_number: Option<u64>,
}

/// One of the two pool assets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenSide {
    X,
    Y,
}

impl TokenSide {
    pub fn info(self) -> TokenInfo {
        match self {
            TokenSide::X => TOKEN_X,
            TokenSide::Y => TOKEN_Y,
        }
    }
}

impl fmt::Display for TokenSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.info().symbol)
    }
}

/// Mintable ERC-20 used for both pool assets
#[async_trait]
pub trait TokenApi: Send + Sync {
    fn address(&self) -> Address;
    async fn balance_of(&self, owner: Address) -> Result<U256>;
    async fn allowance(&self, owner: Address, spender: Address) -> Result<U256>;
    async fn total_supply(&self) -> Result<U256>;
    async fn decimals(&self) -> Result<u8>;
    async fn symbol(&self) -> Result<String>;
    async fn approve(&self, spender: Address, amount: U256) -> Result<TxHandle>;
    async fn free_mint_to_sender(&self, amount: U256) -> Result<TxHandle>;
}

/// The MiniAMM pool, which is also the LP share token
#[async_trait]
pub trait AmmApi: Send + Sync {
    fn address(&self) -> Address;
    /// `xReserve`, `yReserve` and `k`, read concurrently
    async fn reserves(&self) -> Result<PoolReserves>;
    async fn lp_balance_of(&self, owner: Address) -> Result<U256>;
    async fn total_supply(&self) -> Result<U256>;
    async fn swap(&self, x_amount_in: U256, y_amount_in: U256) -> Result<TxHandle>;
    async fn add_liquidity(&self, x_amount_in: U256, y_amount_in: U256) -> Result<TxHandle>;
    async fn remove_liquidity(&self, lp_amount: U256) -> Result<TxHandle>;
}

pub struct Erc20Handle<M> {
    contract: MockErc20<M>,
    writable: bool,
    gas_limit: U256,
}

pub struct AmmHandle<M> {
    contract: MiniAmm<M>,
    writable: bool,
    gas_limit: U256,
}

impl<M: Middleware + 'static> Erc20Handle<M> {
    pub fn new(address: Address, client: Arc<M>, writable: bool, gas_limit: U256) -> Self {
        Self {
            contract: MockErc20::new(address, client),
            writable,
            gas_limit,
        }
    }
}

impl<M: Middleware + 'static> AmmHandle<M> {
    pub fn new(address: Address, client: Arc<M>, writable: bool, gas_limit: U256) -> Self {
        Self {
            contract: MiniAmm::new(address, client),
            writable,
            gas_limit,
        }
    }
}

fn ensure_writable(writable: bool) -> Result<()> {
    if writable {
        Ok(())
    } else {
        Err(FrontendError::ReadOnly)
    }
}

#[async_trait]
impl<M: Middleware + 'static> TokenApi for Erc20Handle<M> {
    fn address(&self) -> Address {
        self.contract.address()
    }

    async fn balance_of(&self, owner: Address) -> Result<U256> {
        self.contract
            .balance_of(owner)
            .call()
            .await
            .map_err(contract_error)
    }

    async fn allowance(&self, owner: Address, spender: Address) -> Result<U256> {
        self.contract
            .allowance(owner, spender)
            .call()
            .await
            .map_err(contract_error)
    }

    async fn total_supply(&self) -> Result<U256> {
        self.contract
            .total_supply()
            .call()
            .await
            .map_err(contract_error)
    }

    async fn decimals(&self) -> Result<u8> {
        self.contract.decimals().call().await.map_err(contract_error)
    }

    async fn symbol(&self) -> Result<String> {
        self.contract.symbol().call().await.map_err(contract_error)
    }

    async fn approve(&self, spender: Address, amount: U256) -> Result<TxHandle> {
        ensure_writable(self.writable)?;
        send_and_confirm(self.contract.approve(spender, amount), self.gas_limit).await
    }

    async fn free_mint_to_sender(&self, amount: U256) -> Result<TxHandle> {
        ensure_writable(self.writable)?;
        send_and_confirm(self.contract.free_mint_to_sender(amount), self.gas_limit).await
    }
}

#[async_trait]
impl<M: Middleware + 'static> AmmApi for AmmHandle<M> {
    fn address(&self) -> Address {
        self.contract.address()
    }

    async fn reserves(&self) -> Result<PoolReserves> {
        let x_call = self.contract.x_reserve();
        let y_call = self.contract.y_reserve();
        let k_call = self.contract.k();

        let (reserve_x, reserve_y, k) =
            futures::try_join!(x_call.call(), y_call.call(), k_call.call())
                .map_err(contract_error)?;

        Ok(PoolReserves::new(reserve_x, reserve_y, k))
    }

    async fn lp_balance_of(&self, owner: Address) -> Result<U256> {
        self.contract
            .balance_of(owner)
            .call()
            .await
            .map_err(contract_error)
    }

    async fn total_supply(&self) -> Result<U256> {
        self.contract
            .total_supply()
            .call()
            .await
            .map_err(contract_error)
    }

    async fn swap(&self, x_amount_in: U256, y_amount_in: U256) -> Result<TxHandle> {
        ensure_writable(self.writable)?;
        send_and_confirm(self.contract.swap(x_amount_in, y_amount_in), self.gas_limit).await
    }

    async fn add_liquidity(&self, x_amount_in: U256, y_amount_in: U256) -> Result<TxHandle> {
        ensure_writable(self.writable)?;
        send_and_confirm(
            self.contract.add_liquidity(x_amount_in, y_amount_in),
            self.gas_limit,
        )
        .await
    }

    async fn remove_liquidity(&self, lp_amount: U256) -> Result<TxHandle> {
        ensure_writable(self.writable)?;
        send_and_confirm(self.contract.remove_liquidity(lp_amount), self.gas_limit).await
    }
}

/// Submit a call and wait for its receipt
async fn send_and_confirm<M, D>(call: ContractCall<M, D>, gas_limit: U256) -> Result<TxHandle>
where
    M: Middleware + 'static,
    D: Detokenize + Send + Sync,
{
    let call = call.gas(gas_limit);
    let pending = call.send().await.map_err(contract_error)?;
    let hash = *pending;
    debug!("Submitted transaction {:?}", hash);

    let receipt = pending
        .await
        .map_err(|e| FrontendError::chain(e.to_string()))?
        .ok_or(FrontendError::Dropped)?;

    if receipt.status == Some(U64::zero()) {
        return Err(FrontendError::revert(
            format!("Transaction {:?} reverted", hash),
            "Transaction reverted",
        ));
    }

    Ok(TxHandle {
        hash,
        block_number: receipt.block_number.map(|block| block.as_u64()),
    })
}

/// Convert an ethers contract error, keeping any revert reason as the
/// short message
pub fn contract_error<M: Middleware>(err: ContractError<M>) -> FrontendError {
    let short = match &err {
        ContractError::Revert(data) => decode_revert_reason(data),
        _ => None,
    };

    FrontendError::Chain {
        message: err.to_string(),
        short,
    }
}

/// Decode `Error(string)` revert data
pub fn decode_revert_reason(data: &[u8]) -> Option<String> {
    if data.len() < 4 || data[..4] != ERROR_STRING_SELECTOR {
        return None;
    }

    let tokens = abi::decode(&[ParamType::String], &data[4..]).ok()?;
    match tokens.into_iter().next()? {
        Token::String(reason) if !reason.is_empty() => Some(reason),
        _ => None,
    }
}

/// Handles for one session
#[derive(Clone, Default)]
pub struct ContractSet {
    pub token_x: Option<Arc<dyn TokenApi>>,
    pub token_y: Option<Arc<dyn TokenApi>>,
    pub amm: Option<Arc<dyn AmmApi>>,
    /// Connected account, known even when the wallet is read-only
    pub account: Option<Address>,
    pub writable: bool,
}

impl ContractSet {
    /// Signer-backed set built from already-connected handles
    pub fn new(
        token_x: Option<Arc<dyn TokenApi>>,
        token_y: Option<Arc<dyn TokenApi>>,
        amm: Option<Arc<dyn AmmApi>>,
        account: Option<Address>,
    ) -> Self {
        Self {
            token_x,
            token_y,
            amm,
            account,
            writable: account.is_some(),
        }
    }

    /// No RPC: nothing can be read or written
    pub fn unavailable() -> Self {
        Self::default()
    }

    /// Connect to the configured RPC and wallet
    pub async fn resolve(config: &AppConfig, wallet_key: Option<&str>) -> anyhow::Result<Self> {
        let addresses = config
            .contracts
            .resolve()
            .context("Invalid contract address in configuration")?;

        let Some(rpc_url) = config
            .network
            .rpc_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
        else {
            warn!(
                "{} No RPC URL configured; contracts unavailable",
                LogEmoji::WARNING
            );
            return Ok(Self::unavailable());
        };

        let url: Url = match rpc_url.parse() {
            Ok(url) => url,
            Err(e) => {
                warn!(
                    "{} Invalid RPC URL {}: {}; contracts unavailable",
                    LogEmoji::WARNING,
                    rpc_url,
                    e
                );
                return Ok(Self::unavailable());
            }
        };
        let provider = Provider::new(Http::new(url));
        let gas_limit = U256::from(config.tx.gas_limit);
        info!("{} Connected to RPC {}", LogEmoji::NETWORK, rpc_url);

        let (signer, account) = match wallet_key {
            Some(key) => connect_wallet(&provider, key, config.chain.chain_id).await,
            None => (None, None),
        };

        Ok(match signer {
            Some(wallet) => {
                let client = Arc::new(SignerMiddleware::new(provider, wallet));
                Self::from_client(client, &addresses, true, gas_limit, account)
            }
            None => Self::from_client(Arc::new(provider), &addresses, false, gas_limit, account),
        })
    }

    /// Build handles over any middleware
    pub fn from_client<M: Middleware + 'static>(
        client: Arc<M>,
        addresses: &ResolvedAddresses,
        writable: bool,
        gas_limit: U256,
        account: Option<Address>,
    ) -> Self {
        let token = |address: Option<Address>| {
            address.map(|address| {
                Arc::new(Erc20Handle::new(
                    address,
                    Arc::clone(&client),
                    writable,
                    gas_limit,
                )) as Arc<dyn TokenApi>
            })
        };

        let amm = addresses.mini_amm.map(|address| {
            Arc::new(AmmHandle::new(
                address,
                Arc::clone(&client),
                writable,
                gas_limit,
            )) as Arc<dyn AmmApi>
        });

        for (name, address) in [
            ("token_x", addresses.token_x),
            ("token_y", addresses.token_y),
            ("mini_amm", addresses.mini_amm),
        ] {
            if address.is_none() {
                warn!("{} {} not configured", LogEmoji::WARNING, name);
            }
        }

        Self {
            token_x: token(addresses.token_x),
            token_y: token(addresses.token_y),
            amm,
            account,
            writable,
        }
    }

    pub fn token(&self, side: TokenSide) -> Option<Arc<dyn TokenApi>> {
        match side {
            TokenSide::X => self.token_x.clone(),
            TokenSide::Y => self.token_y.clone(),
        }
    }

    /// Spender for every allowance the client checks
    pub fn amm_address(&self) -> Option<Address> {
        self.amm.as_ref().map(|amm| amm.address())
    }
}

impl fmt::Debug for ContractSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContractSet")
            .field("token_x", &self.token_x.as_ref().map(|t| t.address()))
            .field("token_y", &self.token_y.as_ref().map(|t| t.address()))
            .field("amm", &self.amm_address())
            .field("account", &self.account)
            .field("writable", &self.writable)
            .finish()
    }
}

/// Returns the signer when usable and the account whenever the key parses
async fn connect_wallet(
    provider: &Provider<Http>,
    key: &str,
    chain_id: u64,
) -> (Option<LocalWallet>, Option<Address>) {
    let key = key.trim();
    let wallet = match key.strip_prefix("0x").unwrap_or(key).parse::<LocalWallet>() {
        Ok(wallet) => wallet,
        Err(e) => {
            warn!("{} Invalid private key ({}); read-only", LogEmoji::WARNING, e);
            return (None, None);
        }
    };
    let account = wallet.address();

    match provider.get_chainid().await {
        Ok(id) if id == U256::from(chain_id) => {
            info!("{} Wallet {:?} connected", LogEmoji::NETWORK, account);
            (Some(wallet.with_chain_id(chain_id)), Some(account))
        }
        Ok(id) => {
            warn!(
                "{} RPC reports chain {} but contracts live on {}; read-only",
                LogEmoji::WARNING,
                id,
                chain_id
            );
            (None, Some(account))
        }
        Err(e) => {
            warn!(
                "{} Chain id lookup failed ({}); read-only",
                LogEmoji::WARNING,
                e
            );
            (None, Some(account))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    const TOKEN: &str = "0x5FbDB2315678afecb367f032d93F642f64180aa3";
    const AMM: &str = "0xe7f1725E7734CE288F8367e1Bb143E90bb3F0512";

    fn revert_data(reason: &str) -> Vec<u8> {
        let mut data = ERROR_STRING_SELECTOR.to_vec();
        data.extend(abi::encode(&[Token::String(reason.to_string())]));
        data
    }

    fn offline_provider() -> Arc<Provider<Http>> {
        Arc::new(Provider::new(Http::new(
            Url::parse("http://127.0.0.1:8545").unwrap(),
        )))
    }

    #[test]
    fn test_decode_revert_reason() {
        assert_eq!(
            decode_revert_reason(&revert_data("Insufficient allowance")).as_deref(),
            Some("Insufficient allowance")
        );
        assert_eq!(decode_revert_reason(&revert_data("")), None);
        assert_eq!(decode_revert_reason(&[0xde, 0xad, 0xbe, 0xef, 0x00]), None);
        assert_eq!(decode_revert_reason(&[0x08, 0xc3]), None);
    }

    #[tokio::test]
    async fn test_missing_rpc_leaves_everything_unavailable() {
        let mut config = AppConfig::default();
        config.contracts.token_x = Some(TOKEN.to_string());

        let set = ContractSet::resolve(&config, Some("not-a-key")).await.unwrap();
        assert!(set.token_x.is_none());
        assert!(set.amm.is_none());
        assert!(set.account.is_none());
    }

    #[tokio::test]
    async fn test_malformed_rpc_url_degrades() {
        let mut config = AppConfig::default();
        config.network.rpc_url = Some("not a url".to_string());
        config.contracts.mini_amm = Some(AMM.to_string());

        let set = ContractSet::resolve(&config, None).await.unwrap();
        assert!(set.amm.is_none());
        assert!(!set.writable);
    }

    #[tokio::test]
    async fn test_zero_address_is_not_configured() {
        let addresses = ResolvedAddresses {
            token_x: Some(Address::from_str(TOKEN).unwrap()),
            token_y: None,
            mini_amm: Some(Address::from_str(AMM).unwrap()),
            mini_amm_factory: None,
        };
        let set = ContractSet::from_client(
            offline_provider(),
            &addresses,
            false,
            U256::from(500_000u64),
            None,
        );

        assert!(set.token(TokenSide::X).is_some());
        assert!(set.token(TokenSide::Y).is_none());
        assert_eq!(set.amm_address(), Some(Address::from_str(AMM).unwrap()));
    }

    #[tokio::test]
    async fn test_read_only_handles_reject_writes() {
        let token = Erc20Handle::new(
            Address::from_str(TOKEN).unwrap(),
            offline_provider(),
            false,
            U256::from(500_000u64),
        );
        let amm = AmmHandle::new(
            Address::from_str(AMM).unwrap(),
            offline_provider(),
            false,
            U256::from(500_000u64),
        );

        assert!(matches!(
            token.approve(Address::zero(), U256::one()).await,
            Err(FrontendError::ReadOnly)
        ));
        assert!(matches!(
            token.free_mint_to_sender(U256::one()).await,
            Err(FrontendError::ReadOnly)
        ));
        assert!(matches!(
            amm.swap(U256::one(), U256::zero()).await,
            Err(FrontendError::ReadOnly)
        ));
        assert!(matches!(
            amm.remove_liquidity(U256::one()).await,
            Err(FrontendError::ReadOnly)
        ));
    }

    #[test]
    fn test_token_side_metadata() {
        assert_eq!(TokenSide::X.to_string(), "TOKX");
        assert_eq!(TokenSide::Y.info().decimals, 18);
    }
}
