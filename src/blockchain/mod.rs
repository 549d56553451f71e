//! Blockchain integration subsystem.
//!
//! # Data Flow
//! ```text
//! wallet bridge endpoint or private key (environment)
//!     → wallet.rs / provider.rs (accounts, chain switch/add)
//!     → contract.rs (GMContract binding: send + reads)
//!     → transaction.rs (receipt polling, confirmations)
//! ```
//!
//! # Security Constraints
//! - Private keys ONLY from environment variables
//! - Never log private keys or sensitive data
//! - Deadlines are applied by the caller (see `resilience::timeouts`)

pub mod contract;
pub mod provider;
pub mod transaction;
pub mod types;
pub mod wallet;

pub use contract::{ContractBinding, GreetingContract};
pub use provider::Eip1193Wallet;
pub use types::{ChainId, ChainParams, ContractError, GreetingEntry, WalletError};
pub use wallet::{detect_wallet, LocalKeyWallet, WalletProvider};
