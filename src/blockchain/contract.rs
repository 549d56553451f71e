//! Greeting contract binding.
//!
//! # Responsibilities
//! - Declare the `GMContract` interface (`sendGM`, `totalGMs`, `getLastGMs`)
//! - Submit the greeting transaction through the session's provider
//! - Run the two read-only queries used by the dashboard

use alloy::primitives::{Address, TxHash, U256};
use alloy::providers::DynProvider;
use alloy::sol;
use async_trait::async_trait;
use std::time::Duration;

use crate::blockchain::transaction::wait_for_receipt;
use crate::blockchain::types::{
    timestamp_secs, Confirmation, ContractError, ContractResult, GreetingEntry, USER_REJECTED_CODE,
};
use crate::config::ContractConfig;

sol! {
    #[sol(rpc)]
    contract GMContract {
        struct GM {
            address user;
            uint256 timestamp;
        }

        function sendGM() external;
        function totalGMs() external view returns (uint256);
        function getLastGMs(uint256 count) external view returns (GM[] memory);
    }
}

/// Contract handle used by the session controller.
#[async_trait]
pub trait GreetingContract: Send + Sync {
    /// Submit `sendGM` and return the transaction hash once the wallet accepted it.
    async fn submit_greeting(&self) -> ContractResult<TxHash>;

    /// Wait until the submitted transaction is included and confirmed.
    async fn wait_for_confirmation(&self, tx_hash: TxHash) -> ContractResult<Confirmation>;

    /// Running total of greetings.
    async fn total_greetings(&self) -> ContractResult<U256>;

    /// Most recent `count` greetings, in contract order.
    async fn recent_greetings(&self, count: u64) -> ContractResult<Vec<GreetingEntry>>;
}

/// Settings for submitting and confirming a greeting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SendOptions {
    pub gas_limit: u64,
    pub confirmations: u32,
    pub receipt_poll: Duration,
}

/// Fixed contract address plus send settings, resolved from config.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContractBinding {
    pub address: Address,
    pub options: SendOptions,
}

impl ContractBinding {
    pub fn from_config(config: &ContractConfig) -> Result<Self, ContractError> {
        let address = config
            .address
            .parse::<Address>()
            .map_err(|e| ContractError::Rpc(format!("Invalid contract address '{}': {}", config.address, e)))?;

        Ok(Self {
            address,
            options: SendOptions {
                gas_limit: config.gas_limit,
                confirmations: config.confirmations,
                receipt_poll: Duration::from_millis(config.receipt_poll_ms),
            },
        })
    }
}

/// [`GreetingContract`] backed by an alloy provider.
pub struct AlloyGreetingContract {
    instance: GMContract::GMContractInstance<DynProvider>,
    provider: DynProvider,
    account: Address,
    options: SendOptions,
}

impl AlloyGreetingContract {
    /// Bind the contract described by `binding`, sending from `account`.
    pub fn new(binding: ContractBinding, provider: DynProvider, account: Address) -> Self {
        Self {
            instance: GMContract::new(binding.address, provider.clone()),
            provider,
            account,
            options: binding.options,
        }
    }

    /// Address the contract handle is bound to.
    pub fn address(&self) -> Address {
        *self.instance.address()
    }
}

#[async_trait]
impl GreetingContract for AlloyGreetingContract {
    async fn submit_greeting(&self) -> ContractResult<TxHash> {
        let pending = self
            .instance
            .sendGM()
            .from(self.account)
            .gas(self.options.gas_limit)
            .send()
            .await
            .map_err(classify_send_error)?;

        let tx_hash = *pending.tx_hash();
        tracing::info!(tx_hash = %tx_hash, account = %self.account, "Greeting submitted");
        Ok(tx_hash)
    }

    async fn wait_for_confirmation(&self, tx_hash: TxHash) -> ContractResult<Confirmation> {
        wait_for_receipt(
            &self.provider,
            tx_hash,
            self.options.confirmations,
            self.options.receipt_poll,
        )
        .await
    }

    async fn total_greetings(&self) -> ContractResult<U256> {
        self.instance
            .totalGMs()
            .call()
            .await
            .map_err(|e| ContractError::Query(format!("totalGMs: {}", e)))
    }

    async fn recent_greetings(&self, count: u64) -> ContractResult<Vec<GreetingEntry>> {
        let rows = self
            .instance
            .getLastGMs(U256::from(count))
            .call()
            .await
            .map_err(|e| ContractError::Query(format!("getLastGMs: {}", e)))?;

        Ok(rows
            .into_iter()
            .map(|gm| GreetingEntry {
                user: gm.user,
                timestamp: timestamp_secs(gm.timestamp),
            })
            .collect())
    }
}

fn classify_send_error(err: alloy::contract::Error) -> ContractError {
    if let alloy::contract::Error::TransportError(transport) = &err {
        if let Some(payload) = transport.as_error_resp() {
            if payload.code == USER_REJECTED_CODE {
                return ContractError::Rejected;
            }
        }
    }
    ContractError::Submit(err.to_string())
}
