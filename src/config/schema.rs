//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the dashboard.
//! All types derive Serde traits for deserialization from config files, and
//! every section has defaults so an empty file targets the ZenChain testnet.

use serde::{Deserialize, Serialize};

/// Root configuration for the greeting dashboard.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Target network descriptor (used for switch/add chain).
    pub chain: ChainConfig,

    /// Greeting contract binding.
    pub contract: ContractConfig,

    /// Send cooldown settings.
    pub cooldown: CooldownConfig,

    /// Read-state polling.
    pub refresh: RefreshConfig,

    /// Per-operation deadlines.
    pub timeouts: TimeoutConfig,

    /// Wallet provider selection.
    pub wallet: WalletConfig,

    /// HTTP API listener.
    pub server: ServerConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Network descriptor handed to the wallet when the chain must be added.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ChainConfig {
    /// Numeric chain identifier.
    pub chain_id: u64,

    /// Display name shown by the wallet.
    pub chain_name: String,

    /// Public JSON-RPC endpoint.
    pub rpc_url: String,

    /// Block explorer base URL.
    pub explorer_url: String,

    /// Native currency metadata.
    pub native_currency: NativeCurrencyConfig,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            chain_id: 8408,
            chain_name: "ZenChain Testnet".to_string(),
            rpc_url: "https://zenchain-testnet.api.onfinality.io/public".to_string(),
            explorer_url: "https://zentrace.io".to_string(),
            native_currency: NativeCurrencyConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct NativeCurrencyConfig {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

impl Default for NativeCurrencyConfig {
    fn default() -> Self {
        Self {
            name: "ZTC".to_string(),
            symbol: "ZTC".to_string(),
            decimals: 18,
        }
    }
}

/// Greeting contract binding.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ContractConfig {
    /// Deployed contract address (hex).
    pub address: String,

    /// Gas limit attached to `sendGM`.
    pub gas_limit: u64,

    /// Number of entries requested from `getLastGMs`.
    pub recent_count: u64,

    /// Blocks mined on top of the inclusion block before a send counts as
    /// confirmed. Zero means inclusion is enough.
    pub confirmations: u32,

    /// Receipt polling interval while waiting for confirmation.
    pub receipt_poll_ms: u64,
}

impl Default for ContractConfig {
    fn default() -> Self {
        Self {
            address: "0x72bf210e0a01838367ef47f5b6087d22d53c93d6".to_string(),
            gas_limit: 300_000,
            recent_count: 5,
            confirmations: 0,
            receipt_poll_ms: 2000,
        }
    }
}

/// Cooldown configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CooldownConfig {
    /// Minimum time between sends from one address, in milliseconds.
    pub duration_ms: u64,

    /// How often a locked cooldown is re-evaluated.
    pub recheck_interval_ms: u64,

    /// JSON file backing the cooldown records. In-memory when unset.
    pub store_path: Option<String>,
}

impl Default for CooldownConfig {
    fn default() -> Self {
        Self {
            duration_ms: 24 * 60 * 60 * 1000,
            recheck_interval_ms: 60_000,
            store_path: Some("gm-cooldowns.json".to_string()),
        }
    }
}

/// Read-state refresh configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RefreshConfig {
    /// Polling period for total/recent queries, in milliseconds.
    pub interval_ms: u64,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self { interval_ms: 30_000 }
    }
}

/// Timeout configuration for wallet and chain interactions.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Account access prompt.
    pub prompt_secs: u64,

    /// Chain switch / add request.
    pub chain_secs: u64,

    /// Transaction submission (includes the signing prompt).
    pub submit_secs: u64,

    /// Waiting for on-chain inclusion.
    pub confirmation_secs: u64,

    /// Each contract read.
    pub query_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            prompt_secs: 120,
            chain_secs: 120,
            submit_secs: 180,
            confirmation_secs: 300,
            query_secs: 15,
        }
    }
}

/// Wallet provider selection.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct WalletConfig {
    /// JSON-RPC endpoint of an EIP-1193 wallet bridge (e.g. a desktop wallet).
    /// When unset, a local key from the environment is used instead.
    pub endpoint: Option<String>,

    /// Connect once at startup.
    pub auto_connect: bool,
}

/// HTTP API listener.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "127.0.0.1:8787").
    pub bind_address: String,

    /// Request timeout in seconds. Must cover the slowest wallet interaction.
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8787".to_string(),
            request_timeout_secs: 600,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
