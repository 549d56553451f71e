//! Shared fakes for integration testing.

#![allow(dead_code)]

use alloy::primitives::{address, Address, TxHash, U256};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use gm_dashboard::blockchain::contract::{ContractBinding, GreetingContract};
use gm_dashboard::blockchain::types::{
    ChainParams, Confirmation, ContractError, ContractResult, GreetingEntry, WalletError,
};
use gm_dashboard::blockchain::WalletProvider;
use gm_dashboard::config::AppConfig;
use gm_dashboard::cooldown::{CooldownStore, ManualClock, MemoryStore};
use gm_dashboard::session::{ControllerSettings, SessionController};

pub const USER: Address = address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266");
pub const OTHER: Address = address!("70997970C51812dc3A010C7d01b50e0d17dc79C8");

/// 2023-11-14T22:13:20Z
pub const T0: u64 = 1_700_000_000_000;

fn rpc_error(code: i64, message: &str) -> WalletError {
    WalletError::Rpc {
        code,
        message: message.to_string(),
    }
}

/// How the fake wallet answers `wallet_switchEthereumChain`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchBehavior {
    Succeed,
    /// Unknown chain until it has been added.
    Unrecognized,
    FailWith(i64),
}

/// How the fake contract handles `sendGM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitBehavior {
    Confirm,
    RejectInWallet,
    Revert,
    NeverConfirm,
}

pub struct FakeContract {
    pub total: Mutex<Option<u64>>,
    pub recent: Mutex<Option<Vec<GreetingEntry>>>,
    pub submit: Mutex<SubmitBehavior>,
    /// Advanced by `confirm_delay` while a send confirms.
    pub clock: Option<ManualClock>,
    pub confirm_delay: Duration,
    /// Real time a confirmation takes.
    pub confirm_wait: Mutex<Duration>,
    pub submits: AtomicUsize,
    pub total_calls: AtomicUsize,
    pub recent_calls: AtomicUsize,
}

impl FakeContract {
    pub fn new() -> Self {
        Self {
            total: Mutex::new(Some(42)),
            recent: Mutex::new(Some(Vec::new())),
            submit: Mutex::new(SubmitBehavior::Confirm),
            clock: None,
            confirm_delay: Duration::ZERO,
            confirm_wait: Mutex::new(Duration::ZERO),
            submits: AtomicUsize::new(0),
            total_calls: AtomicUsize::new(0),
            recent_calls: AtomicUsize::new(0),
        }
    }

    pub fn with_clock(mut self, clock: ManualClock, confirm_delay: Duration) -> Self {
        self.clock = Some(clock);
        self.confirm_delay = confirm_delay;
        self
    }

    pub fn set_submit(&self, behavior: SubmitBehavior) {
        *self.submit.lock().unwrap() = behavior;
    }

    pub fn set_confirm_wait(&self, wait: Duration) {
        *self.confirm_wait.lock().unwrap() = wait;
    }

    pub fn set_total(&self, total: Option<u64>) {
        *self.total.lock().unwrap() = total;
    }

    pub fn set_recent(&self, recent: Option<Vec<GreetingEntry>>) {
        *self.recent.lock().unwrap() = recent;
    }

    pub fn read_calls(&self) -> usize {
        self.total_calls.load(Ordering::SeqCst) + self.recent_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GreetingContract for FakeContract {
    async fn submit_greeting(&self) -> ContractResult<TxHash> {
        self.submits.fetch_add(1, Ordering::SeqCst);
        let behavior = *self.submit.lock().unwrap();
        match behavior {
            SubmitBehavior::RejectInWallet => Err(ContractError::Rejected),
            _ => Ok(TxHash::repeat_byte(0xab)),
        }
    }

    async fn wait_for_confirmation(&self, tx_hash: TxHash) -> ContractResult<Confirmation> {
        let behavior = *self.submit.lock().unwrap();
        match behavior {
            SubmitBehavior::Revert => Err(ContractError::Reverted(tx_hash)),
            SubmitBehavior::NeverConfirm => std::future::pending().await,
            _ => {
                let wait = *self.confirm_wait.lock().unwrap();
                if !wait.is_zero() {
                    tokio::time::sleep(wait).await;
                }
                if let Some(clock) = &self.clock {
                    clock.advance(self.confirm_delay);
                }
                Ok(Confirmation {
                    tx_hash,
                    block_number: 77,
                })
            }
        }
    }

    async fn total_greetings(&self) -> ContractResult<U256> {
        self.total_calls.fetch_add(1, Ordering::SeqCst);
        let total = *self.total.lock().unwrap();
        total
            .map(U256::from)
            .ok_or_else(|| ContractError::Query("execution reverted".into()))
    }

    async fn recent_greetings(&self, _count: u64) -> ContractResult<Vec<GreetingEntry>> {
        self.recent_calls.fetch_add(1, Ordering::SeqCst);
        let recent = self.recent.lock().unwrap().clone();
        recent.ok_or_else(|| ContractError::Query("execution reverted".into()))
    }
}

pub struct FakeWallet {
    pub accounts: Vec<Address>,
    pub accounts_error: Option<i64>,
    pub hang_accounts: bool,
    /// Time the user takes to approve the account request.
    pub accounts_delay: Duration,
    pub switch: SwitchBehavior,
    pub add_error: Option<i64>,
    pub contract: Arc<FakeContract>,
    pub calls: Mutex<Vec<String>>,
    pub added: Mutex<Vec<ChainParams>>,
}

impl FakeWallet {
    pub fn new(contract: Arc<FakeContract>) -> Self {
        Self {
            accounts: vec![USER],
            accounts_error: None,
            hang_accounts: false,
            accounts_delay: Duration::ZERO,
            switch: SwitchBehavior::Succeed,
            add_error: None,
            contract,
            calls: Mutex::new(Vec::new()),
            added: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn added(&self) -> Vec<ChainParams> {
        self.added.lock().unwrap().clone()
    }

    fn log(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }
}

#[async_trait]
impl WalletProvider for FakeWallet {
    fn name(&self) -> &str {
        "fake"
    }

    async fn request_accounts(&self) -> Result<Vec<Address>, WalletError> {
        self.log("request_accounts");
        if self.hang_accounts {
            std::future::pending::<()>().await;
        }
        if !self.accounts_delay.is_zero() {
            tokio::time::sleep(self.accounts_delay).await;
        }
        match self.accounts_error {
            Some(code) => Err(rpc_error(code, "User rejected the request.")),
            None => Ok(self.accounts.clone()),
        }
    }

    async fn switch_chain(&self, chain_id: u64) -> Result<(), WalletError> {
        self.log(format!("switch_chain:{}", chain_id));
        match self.switch {
            SwitchBehavior::Succeed => Ok(()),
            SwitchBehavior::Unrecognized if !self.added.lock().unwrap().is_empty() => Ok(()),
            SwitchBehavior::Unrecognized => Err(rpc_error(4902, "Unrecognized chain ID")),
            SwitchBehavior::FailWith(code) => Err(rpc_error(code, "switch failed")),
        }
    }

    async fn add_chain(&self, params: &ChainParams) -> Result<(), WalletError> {
        self.log(format!("add_chain:{}", params.chain_id));
        if let Some(code) = self.add_error {
            return Err(rpc_error(code, "add failed"));
        }
        self.added.lock().unwrap().push(params.clone());
        Ok(())
    }

    fn bind_contract(
        &self,
        _binding: ContractBinding,
        _account: Address,
    ) -> Result<Arc<dyn GreetingContract>, WalletError> {
        self.log("bind_contract");
        Ok(self.contract.clone())
    }
}

/// Default configuration with short timers for tests.
pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.cooldown.duration_ms = 3_600_000;
    config.cooldown.store_path = None;
    config.refresh.interval_ms = 50;
    config.timeouts.prompt_secs = 2;
    config.timeouts.chain_secs = 2;
    config.timeouts.submit_secs = 2;
    config.timeouts.confirmation_secs = 2;
    config.timeouts.query_secs = 2;
    config
}

pub struct Harness {
    pub controller: Arc<SessionController>,
    pub wallet: Arc<FakeWallet>,
    pub contract: Arc<FakeContract>,
    pub store: Arc<MemoryStore>,
    pub clock: ManualClock,
}

impl Harness {
    pub fn new(configure: impl FnOnce(&mut FakeWallet)) -> Self {
        Self::with_config(test_config(), configure)
    }

    pub fn with_config(config: AppConfig, configure: impl FnOnce(&mut FakeWallet)) -> Self {
        let store = Arc::new(MemoryStore::new());
        let mut h = Self::with_store(config, store.clone(), configure);
        h.store = store;
        h
    }

    /// Harness whose controller writes cooldown records to `records`.
    /// `store` is then a detached, unused memory store.
    pub fn with_store(
        config: AppConfig,
        records: Arc<dyn CooldownStore>,
        configure: impl FnOnce(&mut FakeWallet),
    ) -> Self {
        let clock = ManualClock::new(T0);
        let contract = Arc::new(FakeContract::new().with_clock(clock.clone(), Duration::from_secs(12)));
        let mut wallet = FakeWallet::new(contract.clone());
        configure(&mut wallet);
        let wallet = Arc::new(wallet);
        let store = Arc::new(MemoryStore::new());

        let settings = ControllerSettings::from_config(&config).unwrap();
        let controller = Arc::new(SessionController::new(
            Some(wallet.clone()),
            records,
            Arc::new(clock.clone()),
            settings,
        ));

        Self {
            controller,
            wallet,
            contract,
            store,
            clock,
        }
    }
}

/// Poll `check` until it holds or two seconds pass.
pub async fn eventually<F>(mut check: F) -> bool
where
    F: FnMut() -> bool,
{
    for _ in 0..200 {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    check()
}
