//! EIP-1193 wallet bridge over JSON-RPC.
//!
//! Desktop wallets such as Frame expose the same request methods a browser
//! extension injects (`eth_requestAccounts`, `wallet_switchEthereumChain`,
//! `wallet_addEthereumChain`) on a local JSON-RPC endpoint. Transactions go
//! out as `eth_sendTransaction`, so signing stays inside the wallet.

use alloy::primitives::Address;
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::transports::TransportError;
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;

use crate::blockchain::contract::{AlloyGreetingContract, ContractBinding, GreetingContract};
use crate::blockchain::types::{ChainId, ChainParams, WalletError};
use crate::blockchain::wallet::WalletProvider;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct SwitchChainParams {
    chain_id: String,
}

/// Wallet reached through an EIP-1193 JSON-RPC bridge.
#[derive(Clone)]
pub struct Eip1193Wallet {
    endpoint: String,
    provider: DynProvider,
}

impl Eip1193Wallet {
    /// Create a bridge client. Does not contact the wallet.
    pub fn new(endpoint: &str) -> Result<Self, WalletError> {
        let url: url::Url = endpoint
            .parse()
            .map_err(|e| WalletError::Setup(format!("Invalid wallet endpoint '{}': {}", endpoint, e)))?;

        Ok(Self {
            endpoint: endpoint.to_string(),
            provider: ProviderBuilder::new().connect_http(url).erased(),
        })
    }

    /// The bridge URL.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

/// Split wallet error objects (with EIP-1193 codes) from transport failures.
pub fn classify_transport_error(err: TransportError) -> WalletError {
    match err.as_error_resp() {
        Some(payload) => WalletError::Rpc {
            code: payload.code,
            message: payload.message.to_string(),
        },
        None => WalletError::Transport(err.to_string()),
    }
}

#[async_trait]
impl WalletProvider for Eip1193Wallet {
    fn name(&self) -> &str {
        "eip1193"
    }

    async fn request_accounts(&self) -> Result<Vec<Address>, WalletError> {
        self.provider
            .raw_request::<_, Vec<Address>>("eth_requestAccounts".into(), ())
            .await
            .map_err(classify_transport_error)
    }

    async fn switch_chain(&self, chain_id: u64) -> Result<(), WalletError> {
        let params = [SwitchChainParams {
            chain_id: ChainId(chain_id).to_hex(),
        }];
        self.provider
            .raw_request::<_, serde_json::Value>("wallet_switchEthereumChain".into(), params)
            .await
            .map_err(classify_transport_error)?;
        Ok(())
    }

    async fn add_chain(&self, params: &ChainParams) -> Result<(), WalletError> {
        self.provider
            .raw_request::<_, serde_json::Value>("wallet_addEthereumChain".into(), [params.clone()])
            .await
            .map_err(classify_transport_error)?;
        Ok(())
    }

    fn bind_contract(
        &self,
        binding: ContractBinding,
        account: Address,
    ) -> Result<Arc<dyn GreetingContract>, WalletError> {
        Ok(Arc::new(AlloyGreetingContract::new(binding, self.provider.clone(), account)))
    }
}

impl std::fmt::Debug for Eip1193Wallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Eip1193Wallet")
            .field("endpoint", &self.endpoint)
            .finish()
    }
}
