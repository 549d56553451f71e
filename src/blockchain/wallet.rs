//! Wallet provider boundary.
//!
//! A [`WalletProvider`] is whatever authorizes account access and signs the
//! greeting transaction: a wallet bridge speaking EIP-1193 methods over
//! JSON-RPC ([`crate::blockchain::provider::Eip1193Wallet`]) or a local key.
//!
//! # Security
//! - Private keys are loaded ONLY from environment variables
//! - Keys are never logged or serialized

use alloy::primitives::Address;
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::signers::local::PrivateKeySigner;
use arc_swap::ArcSwap;
use async_trait::async_trait;
use std::sync::Arc;

use crate::blockchain::contract::{AlloyGreetingContract, ContractBinding, GreetingContract};
use crate::blockchain::provider::Eip1193Wallet;
use crate::blockchain::types::{ChainParams, WalletError, UNRECOGNIZED_CHAIN_CODE};
use crate::config::AppConfig;

/// Environment variable name for the private key.
pub const PRIVATE_KEY_ENV_VAR: &str = "GM_WALLET_PRIVATE_KEY";

/// Request/response surface of a wallet.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Short label for logs.
    fn name(&self) -> &str;

    /// Ask for account access. May prompt the user.
    async fn request_accounts(&self) -> Result<Vec<Address>, WalletError>;

    /// Make `chain_id` the active chain. Fails with code 4902 when unknown.
    async fn switch_chain(&self, chain_id: u64) -> Result<(), WalletError>;

    /// Register a network with the wallet.
    async fn add_chain(&self, params: &ChainParams) -> Result<(), WalletError>;

    /// Build a contract handle that sends from `account`.
    fn bind_contract(
        &self,
        binding: ContractBinding,
        account: Address,
    ) -> Result<Arc<dyn GreetingContract>, WalletError>;
}

/// Pick the wallet described by the configuration.
///
/// Returns `Ok(None)` when no wallet is available: no bridge endpoint is
/// configured and no private key is present in the environment.
pub fn detect_wallet(config: &AppConfig) -> Result<Option<Arc<dyn WalletProvider>>, WalletError> {
    if let Some(endpoint) = &config.wallet.endpoint {
        let wallet = Eip1193Wallet::new(endpoint)?;
        tracing::info!(endpoint = %endpoint, "Using EIP-1193 wallet bridge");
        return Ok(Some(Arc::new(wallet)));
    }

    match std::env::var(PRIVATE_KEY_ENV_VAR) {
        Ok(key) => {
            let wallet = LocalKeyWallet::from_private_key(&key, &config.chain.rpc_url)?;
            Ok(Some(Arc::new(wallet)))
        }
        Err(_) => {
            tracing::warn!(
                env_var = PRIVATE_KEY_ENV_VAR,
                "No wallet endpoint configured and no private key in environment"
            );
            Ok(None)
        }
    }
}

/// Wallet backed by a private key and a plain JSON-RPC node.
///
/// There is no user prompt: the key's address is the only account. The
/// node decides the chain, so "switching" checks the node's chain id and
/// "adding" a chain re-targets the provider to the descriptor's RPC URL.
pub struct LocalKeyWallet {
    signer: PrivateKeySigner,
    provider: ArcSwap<DynProvider>,
}

impl LocalKeyWallet {
    /// Create a wallet from a hex-encoded private key string.
    ///
    /// # Arguments
    /// * `private_key_hex` - Hex string (with or without 0x prefix)
    /// * `rpc_url` - Node the wallet talks to until a chain is added
    pub fn from_private_key(private_key_hex: &str, rpc_url: &str) -> Result<Self, WalletError> {
        let key_hex = private_key_hex.trim();
        let key_hex = key_hex.strip_prefix("0x").unwrap_or(key_hex);

        let signer: PrivateKeySigner = key_hex
            .parse()
            .map_err(|e| WalletError::Setup(format!("Invalid private key format: {}", e)))?;

        let provider = connect(&signer, rpc_url)?;

        tracing::info!(address = %signer.address(), rpc_url = %rpc_url, "Local key wallet initialized");

        Ok(Self {
            signer,
            provider: ArcSwap::from_pointee(provider),
        })
    }

    /// Get the wallet's address.
    pub fn address(&self) -> Address {
        self.signer.address()
    }
}

fn connect(signer: &PrivateKeySigner, rpc_url: &str) -> Result<DynProvider, WalletError> {
    let url: url::Url = rpc_url
        .parse()
        .map_err(|e| WalletError::Setup(format!("Invalid RPC URL '{}': {}", rpc_url, e)))?;

    Ok(ProviderBuilder::new()
        .wallet(signer.clone())
        .connect_http(url)
        .erased())
}

#[async_trait]
impl WalletProvider for LocalKeyWallet {
    fn name(&self) -> &str {
        "local-key"
    }

    async fn request_accounts(&self) -> Result<Vec<Address>, WalletError> {
        Ok(vec![self.signer.address()])
    }

    async fn switch_chain(&self, chain_id: u64) -> Result<(), WalletError> {
        let provider = self.provider.load_full();
        let actual = provider
            .get_chain_id()
            .await
            .map_err(|e| WalletError::Transport(e.to_string()))?;

        if actual == chain_id {
            Ok(())
        } else {
            Err(WalletError::Rpc {
                code: UNRECOGNIZED_CHAIN_CODE,
                message: format!("node serves chain {}, not {}", actual, chain_id),
            })
        }
    }

    async fn add_chain(&self, params: &ChainParams) -> Result<(), WalletError> {
        let rpc_url = params
            .rpc_urls
            .first()
            .ok_or_else(|| WalletError::Setup("chain descriptor has no RPC URL".to_string()))?;

        let provider = connect(&self.signer, rpc_url)?;
        let actual = provider
            .get_chain_id()
            .await
            .map_err(|e| WalletError::Transport(e.to_string()))?;

        if Some(actual) != params.numeric_chain_id() {
            return Err(WalletError::Setup(format!(
                "{} serves chain {}, expected {}",
                rpc_url, actual, params.chain_id
            )));
        }

        self.provider.store(Arc::new(provider));
        tracing::info!(rpc_url = %rpc_url, chain = %params.chain_name, "Local key wallet re-targeted");
        Ok(())
    }

    fn bind_contract(
        &self,
        binding: ContractBinding,
        account: Address,
    ) -> Result<Arc<dyn GreetingContract>, WalletError> {
        if account != self.signer.address() {
            return Err(WalletError::Setup(format!("account {} is not held by this wallet", account)));
        }
        let provider = self.provider.load_full().as_ref().clone();
        Ok(Arc::new(AlloyGreetingContract::new(binding, provider, account)))
    }
}

impl std::fmt::Debug for LocalKeyWallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalKeyWallet")
            .field("address", &self.signer.address())
            .finish()
    }
}
