//! Session state machine.
//!
//! # States
//! ```text
//! Disconnected ──begin_connect──▶ Connecting ──finish_connect(Ok)──▶ Connected
//!      ▲                              │                                  │
//!      │                    finish_connect(Err)                     disconnect
//!      │                              ▼                                  │
//!      └──────────begin_connect──── Failed ◀──────────────────────────────┘
//!                                                       (Connected → Disconnected)
//! ```
//!
//! Transitions consume the current state and return the next one. The
//! controller swaps states under its lock; nothing here performs I/O.

use alloy::primitives::Address;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::AbortHandle;

use crate::blockchain::contract::GreetingContract;
use crate::blockchain::wallet::WalletProvider;
use crate::lifecycle::{Shutdown, ShutdownSignal};
use crate::session::dashboard::Phase;
use crate::session::error::SessionError;

/// An in-flight connect. Dropping it cancels the attempt.
#[derive(Debug)]
pub struct ConnectAttempt {
    pub id: u64,
    cancel: Shutdown,
}

impl ConnectAttempt {
    pub fn new(id: u64) -> Self {
        Self {
            id,
            cancel: Shutdown::new(),
        }
    }

    pub fn cancellation(&self) -> ShutdownSignal {
        self.cancel.subscribe()
    }
}

impl Drop for ConnectAttempt {
    fn drop(&mut self) {
        self.cancel.trigger();
    }
}

/// A connected wallet session. Dropping it stops every task it started.
pub struct Session {
    pub address: Address,
    /// Chain the wallet confirmed as active, if the switch succeeded.
    pub chain_id: Option<u64>,
    pub wallet: Arc<dyn WalletProvider>,
    pub contract: Arc<dyn GreetingContract>,
    pub send_lock: Arc<Mutex<()>>,
    tasks: Shutdown,
    cooldown_ticker: Option<AbortHandle>,
}

impl Session {
    pub fn new(
        address: Address,
        chain_id: Option<u64>,
        wallet: Arc<dyn WalletProvider>,
        contract: Arc<dyn GreetingContract>,
    ) -> Self {
        Self {
            address,
            chain_id,
            wallet,
            contract,
            send_lock: Arc::new(Mutex::new(())),
            tasks: Shutdown::new(),
            cooldown_ticker: None,
        }
    }

    /// Signal that fires when the session ends.
    pub fn task_signal(&self) -> ShutdownSignal {
        self.tasks.subscribe()
    }

    /// Install a new cooldown ticker, aborting the previous one.
    pub fn replace_cooldown_ticker(&mut self, handle: AbortHandle) {
        if let Some(previous) = self.cooldown_ticker.replace(handle) {
            previous.abort();
        }
    }

    pub fn is_closed(&self) -> bool {
        self.tasks.is_triggered()
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.tasks.trigger();
        if let Some(ticker) = self.cooldown_ticker.take() {
            ticker.abort();
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("address", &self.address)
            .field("chain_id", &self.chain_id)
            .field("wallet", &self.wallet.name())
            .finish()
    }
}

/// Controller state.
#[derive(Debug, Default)]
pub enum SessionState {
    #[default]
    Disconnected,
    Failed(SessionError),
    Connecting(ConnectAttempt),
    Connected(Session),
}

impl SessionState {
    pub fn phase(&self) -> Phase {
        match self {
            SessionState::Disconnected => Phase::Disconnected,
            SessionState::Failed(_) => Phase::Failed,
            SessionState::Connecting(_) => Phase::Connecting,
            SessionState::Connected(_) => Phase::Connected,
        }
    }

    pub fn session(&self) -> Option<&Session> {
        match self {
            SessionState::Connected(session) => Some(session),
            _ => None,
        }
    }

    pub fn session_mut(&mut self) -> Option<&mut Session> {
        match self {
            SessionState::Connected(session) => Some(session),
            _ => None,
        }
    }

    pub fn address(&self) -> Option<Address> {
        self.session().map(|s| s.address)
    }

    /// Disconnected | Failed → Connecting.
    pub fn begin_connect(self, attempt: ConnectAttempt) -> (SessionState, Result<(), SessionError>) {
        match self {
            SessionState::Disconnected | SessionState::Failed(_) => (SessionState::Connecting(attempt), Ok(())),
            connecting @ SessionState::Connecting(_) => (connecting, Err(SessionError::AlreadyConnecting)),
            connected @ SessionState::Connected(_) => (connected, Err(SessionError::AlreadyConnected)),
        }
    }

    /// Connecting → Connected | Failed, for the attempt that is still current.
    ///
    /// An outcome for a superseded attempt (the user disconnected meanwhile)
    /// leaves the state untouched, drops the session and reports `Cancelled`.
    pub fn finish_connect(
        self,
        attempt_id: u64,
        outcome: Result<Session, SessionError>,
    ) -> (SessionState, Result<(), SessionError>) {
        match self {
            SessionState::Connecting(attempt) if attempt.id == attempt_id => match outcome {
                Ok(session) => (SessionState::Connected(session), Ok(())),
                Err(e) => (SessionState::Failed(e.clone()), Err(e)),
            },
            other => (other, Err(SessionError::Cancelled { operation: "connect" })),
        }
    }

    /// Any → Disconnected. Returns the session that was closed, if any.
    pub fn disconnect(self) -> (SessionState, Option<Session>) {
        match self {
            SessionState::Connected(session) => (SessionState::Disconnected, Some(session)),
            // Dropping the attempt cancels it.
            _ => (SessionState::Disconnected, None),
        }
    }
}
