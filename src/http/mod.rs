//! HTTP presentation subsystem.
//!
//! # Data Flow
//! ```text
//! CLI / browser request
//!     → server.rs (Axum router, trace/timeout/request-id layers)
//!     → handlers.rs (one handler per controller operation)
//!     → response.rs (SessionError → status code + JSON body)
//! ```

pub mod handlers;
pub mod request;
pub mod response;
pub mod server;

pub use request::X_REQUEST_ID;
pub use response::ApiError;
pub use server::{AppState, HttpServer};
