//! Wallet session controller.
//!
//! # Responsibilities
//! - Connect a wallet, select the target chain and bind the contract
//! - Gate greeting sends behind the per-address cooldown
//! - Own the session's background tasks and stop them on disconnect
//!
//! The state lock is never held across a wallet or network await. Connects
//! and sends run on their own task, so they finish even when the caller
//! stops waiting.

use alloy::primitives::{Address, TxHash};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::blockchain::contract::{ContractBinding, GreetingContract};
use crate::blockchain::types::{ChainParams, Confirmation, ContractError};
use crate::blockchain::wallet::WalletProvider;
use crate::config::AppConfig;
use crate::cooldown::{cooldown_status, Clock, CooldownStatus, CooldownStore};
use crate::lifecycle::ShutdownSignal;
use crate::observability::metrics;
use crate::resilience::{with_deadline, with_timeout};
use crate::session::dashboard::{
    connected_status, Dashboard, DashboardHandle, Phase, LOADING, STATUS_CONNECTING, STATUS_FAILED,
};
use crate::session::error::SessionError;
use crate::session::state::{ConnectAttempt, Session, SessionState};
use crate::session::tasks::{
    apply_cooldown, apply_read_state, refresh_read_state, CooldownTicker, RefreshPoller,
};

/// Deadline for each suspension point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperationTimeouts {
    pub prompt: Duration,
    pub chain: Duration,
    pub submit: Duration,
    pub confirmation: Duration,
    pub query: Duration,
}

/// Everything the controller needs from the configuration.
#[derive(Debug, Clone)]
pub struct ControllerSettings {
    pub chain: ChainParams,
    pub chain_id: u64,
    pub binding: ContractBinding,
    pub recent_count: u64,
    pub cooldown: Duration,
    pub cooldown_recheck: Duration,
    pub refresh_interval: Duration,
    pub timeouts: OperationTimeouts,
}

impl ControllerSettings {
    pub fn from_config(config: &AppConfig) -> Result<Self, ContractError> {
        let t = &config.timeouts;
        Ok(Self {
            chain: ChainParams::from(&config.chain),
            chain_id: config.chain.chain_id,
            binding: ContractBinding::from_config(&config.contract)?,
            recent_count: config.contract.recent_count,
            cooldown: Duration::from_millis(config.cooldown.duration_ms),
            cooldown_recheck: Duration::from_millis(config.cooldown.recheck_interval_ms),
            refresh_interval: Duration::from_millis(config.refresh.interval_ms),
            timeouts: OperationTimeouts {
                prompt: Duration::from_secs(t.prompt_secs),
                chain: Duration::from_secs(t.chain_secs),
                submit: Duration::from_secs(t.submit_secs),
                confirmation: Duration::from_secs(t.confirmation_secs),
                query: Duration::from_secs(t.query_secs),
            },
        })
    }
}

/// A confirmed greeting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SendReceipt {
    pub tx_hash: TxHash,
    pub block_number: u64,
    /// Cooldown record written for this send, ms since epoch.
    pub recorded_at_ms: u64,
}

pub struct SessionController {
    wallet: Option<Arc<dyn WalletProvider>>,
    store: Arc<dyn CooldownStore>,
    clock: Arc<dyn Clock>,
    settings: ControllerSettings,
    state: Mutex<SessionState>,
    dashboard: DashboardHandle,
    attempts: AtomicU64,
}

impl SessionController {
    pub fn new(
        wallet: Option<Arc<dyn WalletProvider>>,
        store: Arc<dyn CooldownStore>,
        clock: Arc<dyn Clock>,
        settings: ControllerSettings,
    ) -> Self {
        Self {
            wallet,
            store,
            clock,
            settings,
            state: Mutex::new(SessionState::default()),
            dashboard: DashboardHandle::new(),
            attempts: AtomicU64::new(0),
        }
    }

    pub fn settings(&self) -> &ControllerSettings {
        &self.settings
    }

    pub fn dashboard(&self) -> DashboardHandle {
        self.dashboard.clone()
    }

    pub fn snapshot(&self) -> Arc<Dashboard> {
        self.dashboard.snapshot()
    }

    pub async fn phase(&self) -> Phase {
        self.state.lock().await.phase()
    }

    /// Address of the current session, if connected.
    pub async fn connected_address(&self) -> Option<Address> {
        self.state.lock().await.address()
    }

    /// Connect the configured wallet.
    ///
    /// Returns the existing address when already connected. A concurrent
    /// [`disconnect`](Self::disconnect) cancels an attempt in flight.
    pub async fn connect(self: &Arc<Self>) -> Result<Address, SessionError> {
        let this = Arc::clone(self);
        join_task("connect", tokio::spawn(async move { this.run_connect().await })).await
    }

    async fn run_connect(&self) -> Result<Address, SessionError> {
        let Some(wallet) = self.wallet.clone() else {
            let err = SessionError::ProviderMissing;
            tracing::warn!("Connect requested but no wallet is available");
            self.dashboard.update(|d| d.error(&err));
            metrics::record_connect(err.kind());
            return Err(err);
        };

        let attempt_id = self.attempts.fetch_add(1, Ordering::Relaxed) + 1;
        let attempt = ConnectAttempt::new(attempt_id);
        let mut cancel = attempt.cancellation();

        {
            let mut state = self.state.lock().await;
            if let Some(address) = state.address() {
                return Ok(address);
            }
            let (next, started) = std::mem::take(&mut *state).begin_connect(attempt);
            *state = next;
            started?;
        }

        tracing::info!(attempt = attempt_id, wallet = wallet.name(), "Connecting wallet");
        self.dashboard.update(|d| {
            d.phase = Phase::Connecting;
            d.wallet_status = STATUS_CONNECTING.to_string();
        });

        let outcome = self.establish(wallet, &mut cancel).await;

        let mut state = self.state.lock().await;
        let (next, finished) = std::mem::take(&mut *state).finish_connect(attempt_id, outcome);
        *state = next;

        if let Err(err) = finished {
            drop(state);
            metrics::record_connect(err.kind());
            if let SessionError::Cancelled { .. } = err {
                tracing::info!(attempt = attempt_id, "Connect attempt superseded");
            } else {
                tracing::error!(attempt = attempt_id, error = %err, "Wallet connection failed");
                self.dashboard.update(|d| {
                    d.reset();
                    d.phase = Phase::Failed;
                    d.wallet_status = STATUS_FAILED.to_string();
                    d.error(&err);
                });
            }
            return Err(err);
        }

        let Some(session) = state.session_mut() else {
            return Err(SessionError::NotConnected);
        };
        let address = session.address;
        let chain_id = session.chain_id;

        let cooldown = self.check_cooldown(&address);
        self.dashboard.update(|d| {
            d.phase = Phase::Connected;
            d.wallet_status = connected_status(&address);
            d.address = Some(address);
            d.chain_id = chain_id;
            d.total = LOADING.to_string();
            d.recent.clear();
        });
        apply_cooldown(&self.dashboard, address, &cooldown);
        self.start_session_tasks(session, &cooldown);

        metrics::record_connect("ok");
        metrics::record_session_connected(true);
        tracing::info!(address = %address, chain_id = ?chain_id, "Wallet connected");

        Ok(address)
    }

    async fn establish(&self, wallet: Arc<dyn WalletProvider>, cancel: &mut ShutdownSignal) -> Result<Session, SessionError> {
        let timeouts = self.settings.timeouts;

        let accounts = with_deadline("account request", timeouts.prompt, cancel, wallet.request_accounts()).await??;
        let address = accounts.first().copied().ok_or(SessionError::NoAccounts)?;
        tracing::debug!(address = %address, accounts = accounts.len(), "Accounts granted");

        let chain_id = self.ensure_chain(wallet.as_ref(), cancel).await?;
        let contract = wallet.bind_contract(self.settings.binding, address)?;

        Ok(Session::new(address, chain_id, wallet, contract))
    }

    /// Switch to the target chain, adding it when the wallet reports 4902.
    ///
    /// Only timeouts and cancellation fail the connect. Returns the chain the
    /// wallet is known to be on.
    async fn ensure_chain(
        &self,
        wallet: &dyn WalletProvider,
        cancel: &mut ShutdownSignal,
    ) -> Result<Option<u64>, SessionError> {
        let target = self.settings.chain_id;
        let limit = self.settings.timeouts.chain;

        match with_deadline("chain switch", limit, cancel, wallet.switch_chain(target)).await? {
            Ok(()) => Ok(Some(target)),
            Err(e) if e.is_unrecognized_chain() => {
                tracing::info!(chain_id = target, chain = %self.settings.chain.chain_name, "Chain unknown to wallet, adding it");
                match with_deadline("chain add", limit, cancel, wallet.add_chain(&self.settings.chain)).await? {
                    Ok(()) => Ok(Some(target)),
                    Err(add_err) => {
                        let err = SessionError::ChainUnrecognized(target);
                        tracing::warn!(error = %err, cause = %add_err, "Adding chain failed, continuing");
                        Ok(None)
                    }
                }
            }
            Err(e) => {
                let err = SessionError::ChainSwitchOther(e.to_string());
                tracing::warn!(error = %err, code = ?e.code(), "Chain switch failed, continuing");
                Ok(None)
            }
        }
    }

    fn check_cooldown(&self, address: &Address) -> CooldownStatus {
        match cooldown_status(self.store.as_ref(), self.clock.as_ref(), address, self.settings.cooldown) {
            Ok(status) => status,
            Err(e) => {
                tracing::warn!(address = %address, error = %e, "Cooldown record unreadable, treating as active");
                CooldownStatus::Active
            }
        }
    }

    fn start_session_tasks(&self, session: &mut Session, cooldown: &CooldownStatus) {
        let poller = RefreshPoller {
            contract: session.contract.clone(),
            dashboard: self.dashboard.clone(),
            clock: self.clock.clone(),
            address: session.address,
            recent_count: self.settings.recent_count,
            query_timeout: self.settings.timeouts.query,
            interval: self.settings.refresh_interval,
        };
        tokio::spawn(poller.run(session.task_signal()));

        if cooldown.is_locked() {
            self.start_cooldown_ticker(session);
        }
    }

    fn start_cooldown_ticker(&self, session: &mut Session) {
        let ticker = CooldownTicker {
            store: self.store.clone(),
            clock: self.clock.clone(),
            dashboard: self.dashboard.clone(),
            address: session.address,
            duration: self.settings.cooldown,
            recheck: self.settings.cooldown_recheck,
        };
        let handle = tokio::spawn(ticker.run(session.task_signal()));
        session.replace_cooldown_ticker(handle.abort_handle());
    }

    /// Drop the session and stop its tasks. Idempotent.
    ///
    /// Returns whether a session or attempt was actually closed.
    pub async fn disconnect(&self) -> bool {
        let (closed, was_active) = {
            let mut state = self.state.lock().await;
            let was_active = !matches!(*state, SessionState::Disconnected | SessionState::Failed(_));
            let (next, closed) = std::mem::take(&mut *state).disconnect();
            *state = next;
            (closed, was_active)
        };

        if let Some(session) = closed {
            tracing::info!(address = %session.address, "Wallet disconnected");
        }

        self.dashboard.update(|d| d.reset());
        metrics::record_session_connected(false);
        metrics::record_cooldown_locked(false);
        was_active
    }

    /// Submit `sendGM` and wait for it to confirm.
    ///
    /// The cooldown record is written only after confirmation. Failures are
    /// surfaced as a notice and never retried.
    pub async fn send_greeting(self: &Arc<Self>) -> Result<SendReceipt, SessionError> {
        let this = Arc::clone(self);
        join_task("send", tokio::spawn(async move { this.run_send().await })).await
    }

    async fn run_send(&self) -> Result<SendReceipt, SessionError> {
        let result = self.try_send().await;
        match &result {
            Ok(receipt) => {
                metrics::record_send("ok");
                tracing::info!(tx_hash = %receipt.tx_hash, block = receipt.block_number, "Greeting confirmed");
                self.dashboard.update(|d| d.info("Greeting sent successfully!"));
            }
            Err(err) => {
                metrics::record_send(err.kind());
                tracing::error!(error = %err, "Greeting send failed");
                self.dashboard.update(|d| d.error(err));
            }
        }
        result
    }

    async fn try_send(&self) -> Result<SendReceipt, SessionError> {
        let (address, contract, send_lock) = {
            let state = self.state.lock().await;
            let session = state.session().ok_or(SessionError::NotConnected)?;
            (session.address, session.contract.clone(), session.send_lock.clone())
        };

        let _sending = send_lock.try_lock_owned().map_err(|_| SessionError::SendInProgress)?;

        let status = cooldown_status(self.store.as_ref(), self.clock.as_ref(), &address, self.settings.cooldown)?;
        if let CooldownStatus::Locked { remaining } = status {
            return Err(SessionError::CooldownActive { remaining });
        }

        self.dashboard.update(|d| {
            if d.address == Some(address) {
                d.send_enabled = false;
            }
        });

        let confirmation = match self.submit_and_confirm(contract.as_ref()).await {
            Ok(confirmation) => confirmation,
            Err(err) => {
                self.dashboard.update(|d| {
                    if d.address == Some(address) {
                        d.send_enabled = true;
                    }
                });
                return Err(err);
            }
        };

        let recorded_at_ms = self.clock.now_millis();
        if let Err(e) = self.store.record_send(&address, recorded_at_ms) {
            tracing::error!(
                address = %address,
                tx_hash = %confirmation.tx_hash,
                error = %e,
                "Greeting confirmed but cooldown record not written"
            );
            apply_cooldown(&self.dashboard, address, &self.check_cooldown(&address));
            return Err(e.into());
        }

        apply_cooldown(
            &self.dashboard,
            address,
            &CooldownStatus::Locked {
                remaining: self.settings.cooldown,
            },
        );
        {
            let mut state = self.state.lock().await;
            if let Some(session) = state.session_mut().filter(|s| s.address == address) {
                self.start_cooldown_ticker(session);
            }
        }

        Ok(SendReceipt {
            tx_hash: confirmation.tx_hash,
            block_number: confirmation.block_number,
            recorded_at_ms,
        })
    }

    async fn submit_and_confirm(
        &self,
        contract: &dyn GreetingContract,
    ) -> Result<Confirmation, SessionError> {
        let timeouts = self.settings.timeouts;

        let tx_hash = with_timeout("transaction submission", timeouts.submit, contract.submit_greeting()).await??;
        tracing::info!(tx_hash = %tx_hash, "Greeting submitted, awaiting confirmation");

        let confirmation =
            with_timeout("transaction confirmation", timeouts.confirmation, contract.wait_for_confirmation(tx_hash))
                .await??;
        Ok(confirmation)
    }

    /// Cooldown status of any address. Works without a session.
    pub fn cooldown_status(&self, address: &Address) -> Result<CooldownStatus, SessionError> {
        Ok(cooldown_status(
            self.store.as_ref(),
            self.clock.as_ref(),
            address,
            self.settings.cooldown,
        )?)
    }

    /// Run one read cycle now, outside the poller's schedule.
    pub async fn refresh_now(&self) -> Result<Arc<Dashboard>, SessionError> {
        let (address, contract) = {
            let state = self.state.lock().await;
            let session = state.session().ok_or(SessionError::NotConnected)?;
            (session.address, session.contract.clone())
        };

        let read = refresh_read_state(contract.as_ref(), self.settings.recent_count, self.settings.timeouts.query).await;
        apply_read_state(&self.dashboard, address, &read, self.clock.now_millis());
        Ok(self.dashboard.snapshot())
    }
}

/// Await a controller task, turning a panic or abort into an error.
async fn join_task<T>(
    operation: &'static str,
    handle: JoinHandle<Result<T, SessionError>>,
) -> Result<T, SessionError> {
    handle.await.unwrap_or_else(|e| {
        tracing::error!(operation, error = %e, "Controller task did not complete");
        Err(SessionError::TaskFailed(operation))
    })
}

impl std::fmt::Debug for SessionController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionController")
            .field("wallet", &self.wallet.as_ref().map(|w| w.name().to_string()))
            .field("settings", &self.settings)
            .finish()
    }
}
