//! Chain-specific types and error definitions.

use alloy::primitives::{Address, TxHash, U256};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::ChainConfig;

/// EIP-1193 code returned when the user declines a wallet prompt.
pub const USER_REJECTED_CODE: i64 = 4001;

/// EIP-1193 code returned when the wallet does not know the requested chain.
pub const UNRECOGNIZED_CHAIN_CODE: i64 = 4902;

/// Chain ID type for strong typing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChainId(pub u64);

impl ChainId {
    /// Hex quantity form used by wallet RPC methods (`0x20d8`).
    pub fn to_hex(self) -> String {
        format!("{:#x}", self.0)
    }
}

impl From<u64> for ChainId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl From<ChainId> for u64 {
    fn from(id: ChainId) -> Self {
        id.0
    }
}

/// Native currency block of an `wallet_addEthereumChain` request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeCurrency {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

/// EIP-3085 `wallet_addEthereumChain` parameter object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainParams {
    pub chain_id: String,
    pub chain_name: String,
    pub rpc_urls: Vec<String>,
    pub native_currency: NativeCurrency,
    pub block_explorer_urls: Vec<String>,
}

impl ChainParams {
    /// Numeric chain id, if the hex quantity is well formed.
    pub fn numeric_chain_id(&self) -> Option<u64> {
        let digits = self.chain_id.strip_prefix("0x")?;
        u64::from_str_radix(digits, 16).ok()
    }
}

impl From<&ChainConfig> for ChainParams {
    fn from(config: &ChainConfig) -> Self {
        Self {
            chain_id: ChainId(config.chain_id).to_hex(),
            chain_name: config.chain_name.clone(),
            rpc_urls: vec![config.rpc_url.clone()],
            native_currency: NativeCurrency {
                name: config.native_currency.name.clone(),
                symbol: config.native_currency.symbol.clone(),
                decimals: config.native_currency.decimals,
            },
            block_explorer_urls: vec![config.explorer_url.clone()],
        }
    }
}

/// One row of the contract's recent-greetings query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GreetingEntry {
    pub user: Address,
    /// Seconds since epoch, as stored by the contract.
    pub timestamp: u64,
}

/// Errors raised at the wallet provider boundary.
#[derive(Debug, Error)]
pub enum WalletError {
    /// The wallet answered with an EIP-1193 error object.
    #[error("wallet error {code}: {message}")]
    Rpc { code: i64, message: String },

    /// The wallet could not be reached.
    #[error("wallet transport error: {0}")]
    Transport(String),

    /// The wallet granted access but exposed no accounts.
    #[error("wallet returned no accounts")]
    NoAccounts,

    /// Key material or provider construction failed.
    #[error("wallet setup failed: {0}")]
    Setup(String),
}

impl WalletError {
    /// EIP-1193 error code, when the wallet supplied one.
    pub fn code(&self) -> Option<i64> {
        match self {
            WalletError::Rpc { code, .. } => Some(*code),
            _ => None,
        }
    }

    pub fn is_user_rejection(&self) -> bool {
        self.code() == Some(USER_REJECTED_CODE)
    }

    pub fn is_unrecognized_chain(&self) -> bool {
        self.code() == Some(UNRECOGNIZED_CHAIN_CODE)
    }
}

/// Errors raised at the contract boundary.
#[derive(Debug, Error)]
pub enum ContractError {
    /// The wallet refused to sign or send.
    #[error("transaction rejected by user")]
    Rejected,

    /// Submission failed before a hash was obtained.
    #[error("transaction submission failed: {0}")]
    Submit(String),

    /// The transaction was mined but reverted.
    #[error("transaction {0} reverted")]
    Reverted(TxHash),

    /// A view call failed.
    #[error("contract query failed: {0}")]
    Query(String),

    /// RPC connection or request failed.
    #[error("RPC error: {0}")]
    Rpc(String),
}

/// Result type for contract operations.
pub type ContractResult<T> = Result<T, ContractError>;

/// Outcome of waiting for a greeting transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Confirmation {
    pub tx_hash: TxHash,
    pub block_number: u64,
}

/// Convert the contract's `uint256` timestamp, saturating absurd values.
pub fn timestamp_secs(value: U256) -> u64 {
    u64::try_from(value).unwrap_or(u64::MAX)
}
