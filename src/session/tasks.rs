//! Session-scoped background tasks.
//!
//! # Responsibilities
//! - Poll total and recent greetings on a fixed interval
//! - Re-evaluate a locked cooldown until it expires
//!
//! Both tasks exit when the owning session's signal fires. Results are only
//! published while the dashboard still shows the session's address.

use alloy::primitives::{Address, U256};
use std::sync::Arc;
use std::time::Duration;
use tokio::time;

use crate::blockchain::contract::GreetingContract;
use crate::blockchain::types::GreetingEntry;
use crate::cooldown::{cooldown_status, Clock, CooldownStatus, CooldownStore};
use crate::lifecycle::ShutdownSignal;
use crate::observability::metrics;
use crate::resilience::with_timeout;
use crate::session::dashboard::{render_entries, render_total, DashboardHandle, ERROR_LOADING};
use crate::session::error::SessionError;

/// Outcome of one read cycle. The two reads fail independently.
#[derive(Debug)]
pub struct ReadState {
    pub total: Result<U256, SessionError>,
    pub recent: Result<Vec<GreetingEntry>, SessionError>,
}

/// Query `totalGMs()` and `getLastGMs(count)` concurrently.
pub async fn refresh_read_state(contract: &dyn GreetingContract, count: u64, query_timeout: Duration) -> ReadState {
    let (total, recent) = tokio::join!(
        with_timeout("total query", query_timeout, contract.total_greetings()),
        with_timeout("recent query", query_timeout, contract.recent_greetings(count)),
    );

    let total = flatten(total);
    let recent = flatten(recent);
    metrics::record_query("total", total.is_ok());
    metrics::record_query("recent", recent.is_ok());

    ReadState { total, recent }
}

fn flatten<T, E>(result: Result<Result<T, E>, crate::resilience::DeadlineError>) -> Result<T, SessionError>
where
    SessionError: From<E>,
{
    match result {
        Ok(inner) => inner.map_err(SessionError::from),
        Err(e) => Err(e.into()),
    }
}

/// Publish a read cycle for `address`.
///
/// A failed total shows "Error loading"; a failed list shows a single
/// "Error loading" line. Returns false if the session moved on.
pub fn apply_read_state(dashboard: &DashboardHandle, address: Address, state: &ReadState, now_millis: u64) -> bool {
    if let Err(e) = &state.total {
        tracing::warn!(address = %address, error = %e, "Failed to load total greetings");
    }
    if let Err(e) = &state.recent {
        tracing::warn!(address = %address, error = %e, "Failed to load recent greetings");
    }

    let total = match &state.total {
        Ok(value) => render_total(value),
        Err(_) => ERROR_LOADING.to_string(),
    };
    let recent = match &state.recent {
        Ok(entries) => render_entries(entries),
        Err(_) => vec![ERROR_LOADING.to_string()],
    };

    if dashboard.snapshot().address != Some(address) {
        return false;
    }
    dashboard.update(|d| {
        if d.address == Some(address) {
            d.total = total.clone();
            d.recent = recent.clone();
            d.last_refresh_ms = Some(now_millis);
        }
    });
    true
}

/// Publish a cooldown evaluation for `address`.
pub fn apply_cooldown(dashboard: &DashboardHandle, address: Address, status: &CooldownStatus) {
    let text = status.describe();
    let locked = status.is_locked();
    dashboard.update(|d| {
        if d.address == Some(address) {
            d.cooldown = text.clone();
            d.send_enabled = !locked;
        }
    });
    metrics::record_cooldown_locked(locked);
}

/// Periodic read refresh for one session.
pub struct RefreshPoller {
    pub contract: Arc<dyn GreetingContract>,
    pub dashboard: DashboardHandle,
    pub clock: Arc<dyn Clock>,
    pub address: Address,
    pub recent_count: u64,
    pub query_timeout: Duration,
    pub interval: Duration,
}

impl RefreshPoller {
    /// Tick immediately, then every `interval`, until `shutdown` fires.
    pub async fn run(self, mut shutdown: ShutdownSignal) {
        tracing::debug!(
            address = %self.address,
            interval_ms = self.interval.as_millis() as u64,
            "Refresh poller starting"
        );

        let mut ticker = time::interval(self.interval);
        ticker.set_missed_tick_behavior(time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let state = tokio::select! {
                        state = refresh_read_state(self.contract.as_ref(), self.recent_count, self.query_timeout) => state,
                        _ = shutdown.recv() => break,
                    };
                    if !apply_read_state(&self.dashboard, self.address, &state, self.clock.now_millis()) {
                        break;
                    }
                }
                _ = shutdown.recv() => break,
            }
        }

        tracing::debug!(address = %self.address, "Refresh poller stopped");
    }
}

/// Re-evaluates a locked cooldown until it expires.
pub struct CooldownTicker {
    pub store: Arc<dyn CooldownStore>,
    pub clock: Arc<dyn Clock>,
    pub dashboard: DashboardHandle,
    pub address: Address,
    pub duration: Duration,
    pub recheck: Duration,
}

impl CooldownTicker {
    pub async fn run(self, mut shutdown: ShutdownSignal) {
        loop {
            let wait = match cooldown_status(self.store.as_ref(), self.clock.as_ref(), &self.address, self.duration) {
                Ok(status) => {
                    apply_cooldown(&self.dashboard, self.address, &status);
                    match status {
                        CooldownStatus::Active => break,
                        CooldownStatus::Locked { remaining } => remaining.min(self.recheck),
                    }
                }
                Err(e) => {
                    tracing::warn!(address = %self.address, error = %e, "Cooldown check failed");
                    self.recheck
                }
            };

            tokio::select! {
                _ = time::sleep(wait) => {}
                _ = shutdown.recv() => break,
            }
        }

        tracing::debug!(address = %self.address, "Cooldown ticker stopped");
    }
}
