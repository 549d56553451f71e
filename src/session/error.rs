//! Session-level error taxonomy.

use std::time::Duration;
use thiserror::Error;

use crate::blockchain::types::{ContractError, WalletError};
use crate::cooldown::{format_remaining, StoreError};
use crate::resilience::DeadlineError;

/// Everything a controller operation can fail with.
///
/// Errors end at the operation that raised them: they are logged, shown as
/// a dashboard notice and returned, never retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("no wallet available; configure a wallet endpoint or private key")]
    ProviderMissing,

    #[error("request rejected in wallet")]
    UserRejected,

    #[error("wallet does not recognize chain {0}")]
    ChainUnrecognized(u64),

    #[error("chain switch failed: {0}")]
    ChainSwitchOther(String),

    #[error("wallet returned no accounts")]
    NoAccounts,

    #[error("wallet not connected")]
    NotConnected,

    #[error("already connected")]
    AlreadyConnected,

    #[error("connection already in progress")]
    AlreadyConnecting,

    #[error("cooldown active, {} remaining", remaining_text(.remaining))]
    CooldownActive { remaining: Duration },

    #[error("a greeting is already being sent")]
    SendInProgress,

    #[error("transaction failed: {0}")]
    TransactionFailed(String),

    #[error("query failed: {0}")]
    QueryFailed(String),

    #[error("{operation} timed out after {}s", .after.as_secs())]
    Timeout { operation: &'static str, after: Duration },

    #[error("{operation} cancelled")]
    Cancelled { operation: &'static str },

    #[error("wallet error: {0}")]
    Wallet(String),

    #[error("cooldown storage error: {0}")]
    Storage(String),

    #[error("{0} task did not complete")]
    TaskFailed(&'static str),
}

fn remaining_text(remaining: &Duration) -> String {
    format_remaining(*remaining)
}

impl SessionError {
    /// Stable snake_case identifier for APIs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            SessionError::ProviderMissing => "provider_missing",
            SessionError::UserRejected => "user_rejected",
            SessionError::ChainUnrecognized(_) => "chain_unrecognized",
            SessionError::ChainSwitchOther(_) => "chain_switch_other",
            SessionError::NoAccounts => "no_accounts",
            SessionError::NotConnected => "not_connected",
            SessionError::AlreadyConnected => "already_connected",
            SessionError::AlreadyConnecting => "already_connecting",
            SessionError::CooldownActive { .. } => "cooldown_active",
            SessionError::SendInProgress => "send_in_progress",
            SessionError::TransactionFailed(_) => "transaction_failed",
            SessionError::QueryFailed(_) => "query_failed",
            SessionError::Timeout { .. } => "timeout",
            SessionError::Cancelled { .. } => "cancelled",
            SessionError::Wallet(_) => "wallet",
            SessionError::Storage(_) => "storage",
            SessionError::TaskFailed(_) => "task_failed",
        }
    }
}

impl From<WalletError> for SessionError {
    fn from(err: WalletError) -> Self {
        if err.is_user_rejection() {
            return SessionError::UserRejected;
        }
        match err {
            WalletError::NoAccounts => SessionError::NoAccounts,
            other => SessionError::Wallet(other.to_string()),
        }
    }
}

impl From<ContractError> for SessionError {
    fn from(err: ContractError) -> Self {
        match err {
            ContractError::Rejected => SessionError::UserRejected,
            ContractError::Query(msg) => SessionError::QueryFailed(msg),
            other => SessionError::TransactionFailed(other.to_string()),
        }
    }
}

impl From<DeadlineError> for SessionError {
    fn from(err: DeadlineError) -> Self {
        match err {
            DeadlineError::Elapsed { operation, after } => SessionError::Timeout { operation, after },
            DeadlineError::Cancelled { operation } => SessionError::Cancelled { operation },
        }
    }
}

impl From<StoreError> for SessionError {
    fn from(err: StoreError) -> Self {
        SessionError::Storage(err.to_string())
    }
}
