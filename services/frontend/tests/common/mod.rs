//! In-memory MiniAMM deployment for widget tests
#![allow(dead_code)]

use async_trait::async_trait;
use ethers::types::{Address, H256, U256};
use miniamm_amm::{compute_removal_amounts, compute_swap_output, PoolReserves};
use miniamm_config::AppConfig;
use miniamm_frontend::contracts::{AmmApi, ContractSet, TokenApi, TokenSide, TxHandle};
use miniamm_frontend::error::{FrontendError, Result};
use miniamm_frontend::notify::{Notifier, ToastId};
use miniamm_frontend::AppContext;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

pub fn ether(value: u64) -> U256 {
    U256::from(value) * U256::exp10(18)
}

#[derive(Default)]
struct Ledger {
    balances: HashMap<(Address, Address), U256>,
    allowances: HashMap<(Address, Address, Address), U256>,
    reserve_x: U256,
    reserve_y: U256,
    lp_balances: HashMap<Address, U256>,
    lp_supply: U256,
    block: u64,
    fail_reads: bool,
    revert_next_write: Option<String>,
}

/// Two mintable tokens and a zero-fee AMM with a single connected account
pub struct FakeChain {
    ledger: Mutex<Ledger>,
    pub account: Address,
    pub token_x: Address,
    pub token_y: Address,
    pub amm: Address,
}

impl FakeChain {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            ledger: Mutex::new(Ledger::default()),
            account: Address::repeat_byte(0xaa),
            token_x: Address::repeat_byte(0x01),
            token_y: Address::repeat_byte(0x02),
            amm: Address::repeat_byte(0x03),
        })
    }

    pub fn contracts(self: &Arc<Self>) -> ContractSet {
        ContractSet::new(
            Some(Arc::new(FakeToken {
                chain: Arc::clone(self),
                address: self.token_x,
            }) as Arc<dyn TokenApi>),
            Some(Arc::new(FakeToken {
                chain: Arc::clone(self),
                address: self.token_y,
            }) as Arc<dyn TokenApi>),
            Some(Arc::new(FakeAmm {
                chain: Arc::clone(self),
            }) as Arc<dyn AmmApi>),
            Some(self.account),
        )
    }

    pub fn context(self: &Arc<Self>) -> (AppContext, Arc<RecordingNotifier>) {
        let notifier = Arc::new(RecordingNotifier::default());
        let ctx = AppContext::new(AppConfig::default(), self.contracts(), notifier.clone());
        (ctx, notifier)
    }

    pub fn token_address(&self, side: TokenSide) -> Address {
        match side {
            TokenSide::X => self.token_x,
            TokenSide::Y => self.token_y,
        }
    }

    pub fn mint(&self, side: TokenSide, amount: U256) {
        let token = self.token_address(side);
        let mut ledger = self.ledger.lock();
        *ledger.balances.entry((token, self.account)).or_default() += amount;
    }

    pub fn approve(&self, side: TokenSide, amount: U256) {
        let token = self.token_address(side);
        self.ledger
            .lock()
            .allowances
            .insert((token, self.account, self.amm), amount);
    }

    /// Liquidity owned by someone other than the test account
    pub fn seed_pool(&self, reserve_x: U256, reserve_y: U256) {
        let mut ledger = self.ledger.lock();
        ledger.reserve_x = reserve_x;
        ledger.reserve_y = reserve_y;
        ledger.lp_supply = (reserve_x * reserve_y).integer_sqrt();
    }

    /// Give the test account `lp` shares of an already seeded pool
    pub fn grant_lp(&self, lp: U256) {
        let mut ledger = self.ledger.lock();
        *ledger.lp_balances.entry(self.account).or_default() += lp;
    }

    pub fn balance(&self, side: TokenSide) -> U256 {
        let token = self.token_address(side);
        self.ledger
            .lock()
            .balances
            .get(&(token, self.account))
            .copied()
            .unwrap_or_default()
    }

    pub fn reserves(&self) -> PoolReserves {
        let ledger = self.ledger.lock();
        PoolReserves::new(
            ledger.reserve_x,
            ledger.reserve_y,
            ledger.reserve_x * ledger.reserve_y,
        )
    }

    pub fn lp_balance(&self) -> U256 {
        self.ledger
            .lock()
            .lp_balances
            .get(&self.account)
            .copied()
            .unwrap_or_default()
    }

    pub fn lp_supply(&self) -> U256 {
        self.ledger.lock().lp_supply
    }

    pub fn fail_reads(&self, fail: bool) {
        self.ledger.lock().fail_reads = fail;
    }

    pub fn revert_next_write(&self, reason: &str) {
        self.ledger.lock().revert_next_write = Some(reason.to_string());
    }

    fn read<T>(&self, read: impl FnOnce(&Ledger) -> T) -> Result<T> {
        let ledger = self.ledger.lock();
        if ledger.fail_reads {
            return Err(FrontendError::chain("connection refused"));
        }
        Ok(read(&ledger))
    }

    fn write(&self, apply: impl FnOnce(&mut Ledger, Address) -> Result<()>) -> Result<TxHandle> {
        let mut ledger = self.ledger.lock();
        if let Some(reason) = ledger.revert_next_write.take() {
            return Err(FrontendError::revert("execution reverted", reason));
        }
        apply(&mut ledger, self.account)?;
        ledger.block += 1;
        Ok(TxHandle {
            hash: H256::from_low_u64_be(ledger.block),
            block_number: Some(ledger.block),
        })
    }
}

fn revert(reason: &str) -> FrontendError {
    FrontendError::revert("execution reverted", reason)
}

impl Ledger {
    fn balance(&self, token: Address, owner: Address) -> U256 {
        self.balances.get(&(token, owner)).copied().unwrap_or_default()
    }

    /// `transferFrom(owner, amm, amount)` as the AMM would call it
    fn pull(&mut self, token: Address, owner: Address, amm: Address, amount: U256) -> Result<()> {
        let allowance = self
            .allowances
            .get(&(token, owner, amm))
            .copied()
            .unwrap_or_default();
        if allowance < amount {
            return Err(revert("ERC20: insufficient allowance"));
        }
        let balance = self.balance(token, owner);
        if balance < amount {
            return Err(revert("ERC20: transfer amount exceeds balance"));
        }
        if allowance != U256::MAX {
            self.allowances.insert((token, owner, amm), allowance - amount);
        }
        self.balances.insert((token, owner), balance - amount);
        Ok(())
    }

    fn push(&mut self, token: Address, owner: Address, amount: U256) {
        *self.balances.entry((token, owner)).or_default() += amount;
    }
}

struct FakeToken {
    chain: Arc<FakeChain>,
    address: Address,
}

#[async_trait]
impl TokenApi for FakeToken {
    fn address(&self) -> Address {
        self.address
    }

    async fn balance_of(&self, owner: Address) -> Result<U256> {
        self.chain.read(|ledger| ledger.balance(self.address, owner))
    }

    async fn allowance(&self, owner: Address, spender: Address) -> Result<U256> {
        self.chain.read(|ledger| {
            ledger
                .allowances
                .get(&(self.address, owner, spender))
                .copied()
                .unwrap_or_default()
        })
    }

    async fn total_supply(&self) -> Result<U256> {
        self.chain.read(|ledger| {
            ledger
                .balances
                .iter()
                .filter(|((token, _), _)| *token == self.address)
                .fold(U256::zero(), |sum, (_, amount)| sum + *amount)
        })
    }

    async fn decimals(&self) -> Result<u8> {
        Ok(18)
    }

    async fn symbol(&self) -> Result<String> {
        Ok(if self.address == self.chain.token_x {
            "TOKX".to_string()
        } else {
            "TOKY".to_string()
        })
    }

    async fn approve(&self, spender: Address, amount: U256) -> Result<TxHandle> {
        let token = self.address;
        self.chain.write(|ledger, sender| {
            ledger.allowances.insert((token, sender, spender), amount);
            Ok(())
        })
    }

    async fn free_mint_to_sender(&self, amount: U256) -> Result<TxHandle> {
        let token = self.address;
        self.chain.write(|ledger, sender| {
            ledger.push(token, sender, amount);
            Ok(())
        })
    }
}

struct FakeAmm {
    chain: Arc<FakeChain>,
}

#[async_trait]
impl AmmApi for FakeAmm {
    fn address(&self) -> Address {
        self.chain.amm
    }

    async fn reserves(&self) -> Result<PoolReserves> {
        self.chain.read(|ledger| {
            PoolReserves::new(
                ledger.reserve_x,
                ledger.reserve_y,
                ledger.reserve_x * ledger.reserve_y,
            )
        })
    }

    async fn lp_balance_of(&self, owner: Address) -> Result<U256> {
        self.chain
            .read(|ledger| ledger.lp_balances.get(&owner).copied().unwrap_or_default())
    }

    async fn total_supply(&self) -> Result<U256> {
        self.chain.read(|ledger| ledger.lp_supply)
    }

    async fn swap(&self, x_amount_in: U256, y_amount_in: U256) -> Result<TxHandle> {
        let (token_x, token_y, amm) = (self.chain.token_x, self.chain.token_y, self.chain.amm);
        self.chain.write(|ledger, sender| {
            if x_amount_in.is_zero() == y_amount_in.is_zero() {
                return Err(revert("MiniAMM: exactly one input must be positive"));
            }
            if x_amount_in > U256::zero() {
                ledger.pull(token_x, sender, amm, x_amount_in)?;
                let out = compute_swap_output(x_amount_in, ledger.reserve_x, ledger.reserve_y);
                ledger.reserve_x += x_amount_in;
                ledger.reserve_y -= out;
                ledger.push(token_y, sender, out);
            } else {
                ledger.pull(token_y, sender, amm, y_amount_in)?;
                let out = compute_swap_output(y_amount_in, ledger.reserve_y, ledger.reserve_x);
                ledger.reserve_y += y_amount_in;
                ledger.reserve_x -= out;
                ledger.push(token_x, sender, out);
            }
            Ok(())
        })
    }

    async fn add_liquidity(&self, x_amount_in: U256, y_amount_in: U256) -> Result<TxHandle> {
        let (token_x, token_y, amm) = (self.chain.token_x, self.chain.token_y, self.chain.amm);
        self.chain.write(|ledger, sender| {
            let minted = if ledger.lp_supply.is_zero() {
                (x_amount_in * y_amount_in).integer_sqrt()
            } else {
                std::cmp::min(
                    x_amount_in * ledger.lp_supply / ledger.reserve_x,
                    y_amount_in * ledger.lp_supply / ledger.reserve_y,
                )
            };
            if minted.is_zero() {
                return Err(revert("MiniAMM: insufficient liquidity minted"));
            }
            ledger.pull(token_x, sender, amm, x_amount_in)?;
            ledger.pull(token_y, sender, amm, y_amount_in)?;
            ledger.reserve_x += x_amount_in;
            ledger.reserve_y += y_amount_in;
            ledger.lp_supply += minted;
            *ledger.lp_balances.entry(sender).or_default() += minted;
            Ok(())
        })
    }

    async fn remove_liquidity(&self, lp_amount: U256) -> Result<TxHandle> {
        let (token_x, token_y) = (self.chain.token_x, self.chain.token_y);
        self.chain.write(|ledger, sender| {
            let held = ledger.lp_balances.get(&sender).copied().unwrap_or_default();
            if held < lp_amount {
                return Err(revert("MiniAMM: insufficient LP balance"));
            }
            let (x, y) = compute_removal_amounts(
                lp_amount,
                ledger.reserve_x,
                ledger.reserve_y,
                ledger.lp_supply,
            );
            ledger.lp_balances.insert(sender, held - lp_amount);
            ledger.lp_supply -= lp_amount;
            ledger.reserve_x -= x;
            ledger.reserve_y -= y;
            ledger.push(token_x, sender, x);
            ledger.push(token_y, sender, y);
            Ok(())
        })
    }
}

/// Notifier that records every notice as `kind:message`
#[derive(Default)]
pub struct RecordingNotifier {
    events: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn events(&self) -> Vec<String> {
        self.events.lock().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn loading(&self, message: &str) -> ToastId {
        let mut events = self.events.lock();
        events.push(format!("loading:{}", message));
        events.len() as ToastId
    }

    fn success(&self, _id: ToastId, message: &str) {
        self.events.lock().push(format!("success:{}", message));
    }

    fn error(&self, _id: ToastId, message: &str) {
        self.events.lock().push(format!("error:{}", message));
    }
}

/// Poll `condition` until it holds or two seconds pass
pub async fn eventually<F>(mut condition: F) -> bool
where
    F: FnMut() -> bool,
{
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    while tokio::time::Instant::now() < deadline {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    condition()
}

/// Let freshly spawned watchers finish their first fetch
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(50)).await;
}

/// Run `future` to completion with a generous timeout
pub async fn within<F: Future>(future: F) -> F::Output {
    tokio::time::timeout(Duration::from_secs(5), future)
        .await
        .expect("operation timed out")
}
