//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Wallet / chain interaction:
//!     → timeouts.rs (deadline per suspension point, cancellation per session)
//!     → On failure: surfaced to the caller once, never retried
//! ```
//!
//! # Design Decisions
//! - Every wallet prompt and RPC call has a deadline
//! - No automatic retries: sends are not idempotent and prompts need a human

pub mod timeouts;

pub use timeouts::{with_deadline, with_timeout, DeadlineError};
