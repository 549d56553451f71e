//! Wallet session subsystem.
//!
//! # Data Flow
//! ```text
//! HTTP / startup
//!     → controller.rs (connect, send, disconnect, cooldown, refresh)
//!     → state.rs (pure transitions under the controller's lock)
//!     → tasks.rs (refresh poller, cooldown ticker; per-session signal)
//!     → dashboard.rs (snapshot served to the presentation layer)
//! ```

pub mod controller;
pub mod dashboard;
pub mod error;
pub mod state;
pub mod tasks;

pub use controller::{ControllerSettings, OperationTimeouts, SendReceipt, SessionController};
pub use dashboard::{Dashboard, DashboardHandle, Notice, NoticeLevel, Phase};
pub use error::SessionError;
pub use state::{Session, SessionState};
