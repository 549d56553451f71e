//! Send cooldown subsystem.
//!
//! # Data Flow
//! ```text
//! successful send confirmation
//!     → store.rs (record `lastSend_<address>` = now in ms)
//! status query / ticker
//!     → store.rs (read record) + clock.rs (now)
//!     → status.rs (Active | Locked { remaining })
//! ```
//!
//! Records are address-scoped and outlive wallet sessions.

pub mod clock;
pub mod status;
pub mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use status::{cooldown_status, evaluate, format_remaining, CooldownStatus};
pub use store::{cooldown_key, CooldownStore, FileStore, MemoryStore, StoreError};
