//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (main.rs):
//!     Load config → Validate → Init logging/metrics → Detect wallet
//!     → Build controller → (auto-connect) → Bind HTTP listener
//!
//! Session scope (shutdown.rs):
//!     connect → per-session Shutdown → cooldown ticker + refresh poller
//!     disconnect → trigger → pollers exit
//!
//! Process scope (signals.rs):
//!     SIGTERM/SIGINT → disconnect session → stop HTTP server → exit
//! ```

pub mod shutdown;
pub mod signals;

pub use shutdown::{Shutdown, ShutdownSignal};
