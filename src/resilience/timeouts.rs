//! Timeout and cancellation enforcement.
//!
//! # Responsibilities
//! - Wrap wallet prompts, submissions, confirmations and reads with a deadline
//! - Abort early when the owning session or attempt is cancelled
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities
//! - Timeout and cancellation are distinct from the wrapped operation's errors

use std::future::Future;
use std::time::Duration;
use thiserror::Error;

use crate::lifecycle::ShutdownSignal;

/// Why a guarded operation did not complete.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeadlineError {
    #[error("{operation} timed out after {}s", .after.as_secs())]
    Elapsed { operation: &'static str, after: Duration },

    #[error("{operation} cancelled")]
    Cancelled { operation: &'static str },
}

/// Run `fut` with a deadline.
pub async fn with_timeout<F, T>(operation: &'static str, limit: Duration, fut: F) -> Result<T, DeadlineError>
where
    F: Future<Output = T>,
{
    tokio::time::timeout(limit, fut)
        .await
        .map_err(|_| DeadlineError::Elapsed { operation, after: limit })
}

/// Run `fut` with a deadline, giving up early if `cancel` fires.
pub async fn with_deadline<F, T>(
    operation: &'static str,
    limit: Duration,
    cancel: &mut ShutdownSignal,
    fut: F,
) -> Result<T, DeadlineError>
where
    F: Future<Output = T>,
{
    tokio::select! {
        result = with_timeout(operation, limit, fut) => result,
        _ = cancel.recv() => Err(DeadlineError::Cancelled { operation }),
    }
}
