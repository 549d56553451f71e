//! Cooldown evaluation and display text.

use alloy::primitives::Address;
use serde::Serialize;
use std::time::Duration;

use crate::cooldown::clock::Clock;
use crate::cooldown::store::{CooldownStore, StoreError};

/// Whether an address may send right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum CooldownStatus {
    /// Sending allowed.
    Active,
    /// Sending blocked for `remaining`.
    Locked {
        #[serde(rename = "remaining_ms", serialize_with = "serialize_millis")]
        remaining: Duration,
    },
}

fn serialize_millis<S: serde::Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(u64::try_from(value.as_millis()).unwrap_or(u64::MAX))
}

impl CooldownStatus {
    pub fn is_locked(&self) -> bool {
        matches!(self, CooldownStatus::Locked { .. })
    }

    /// Dashboard text: `Active` or `Disabled - Remaining: 3h 5m`.
    pub fn describe(&self) -> String {
        match self {
            CooldownStatus::Active => "Active".to_string(),
            CooldownStatus::Locked { remaining } => {
                format!("Disabled - Remaining: {}", format_remaining(*remaining))
            }
        }
    }
}

/// Evaluate a record against the current time.
///
/// Locked while `now - last < duration`. A record from the future (clock
/// moved backwards) counts as zero elapsed.
pub fn evaluate(last_send_millis: Option<u64>, now_millis: u64, duration: Duration) -> CooldownStatus {
    let Some(last) = last_send_millis else {
        return CooldownStatus::Active;
    };

    let duration_ms = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
    let elapsed = now_millis.saturating_sub(last);

    if elapsed < duration_ms {
        CooldownStatus::Locked {
            remaining: Duration::from_millis(duration_ms - elapsed),
        }
    } else {
        CooldownStatus::Active
    }
}

/// Read the persisted record for `address` and evaluate it.
pub fn cooldown_status(
    store: &dyn CooldownStore,
    clock: &dyn Clock,
    address: &Address,
    duration: Duration,
) -> Result<CooldownStatus, StoreError> {
    let last = store.last_send(address)?;
    Ok(evaluate(last, clock.now_millis(), duration))
}

/// Whole hours and leftover minutes, rounded down: `0h 30m`.
pub fn format_remaining(remaining: Duration) -> String {
    let total_minutes = remaining.as_secs() / 60;
    format!("{}h {}m", total_minutes / 60, total_minutes % 60)
}
