//! GM dashboard library: wallet session controller, cooldown gate and
//! HTTP presentation for the `sendGM` greeting contract.

pub mod blockchain;
pub mod config;
pub mod cooldown;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod resilience;
pub mod session;

pub use config::AppConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use session::SessionController;
