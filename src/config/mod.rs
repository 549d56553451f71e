//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → AppConfig (validated, immutable)
//!     → handed to the controller and the HTTP server at startup
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use schema::AppConfig;
pub use schema::ChainConfig;
pub use schema::ContractConfig;
pub use schema::CooldownConfig;
pub use schema::NativeCurrencyConfig;
pub use schema::ObservabilityConfig;
pub use schema::RefreshConfig;
pub use schema::ServerConfig;
pub use schema::TimeoutConfig;
pub use schema::WalletConfig;
