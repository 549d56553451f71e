//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! controller, pollers, HTTP layer:
//!     → logging.rs (structured tracing events)
//!     → metrics.rs (counters, gauges)
//!
//! Consumers:
//!     → stdout
//!     → Prometheus scrape (optional)
//! ```

pub mod logging;
pub mod metrics;
