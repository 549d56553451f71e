//! Dashboard view model and text rendering.
//!
//! The controller and its pollers write here; the HTTP layer serves
//! snapshots. Readers never block writers.

use alloy::primitives::{Address, U256};
use arc_swap::ArcSwap;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::Arc;

use crate::blockchain::types::GreetingEntry;
use crate::session::error::SessionError;

pub const STATUS_DISCONNECTED: &str = "Status: Disconnected";
pub const STATUS_CONNECTING: &str = "Status: Connecting...";
pub const STATUS_FAILED: &str = "Status: Connection failed";
pub const LOADING: &str = "Loading...";
pub const ERROR_LOADING: &str = "Error loading";

/// Notices kept on the dashboard.
pub const MAX_NOTICES: usize = 10;

/// Connection phase shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Disconnected,
    Connecting,
    Connected,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Info,
    Error,
}

/// A user-facing message (the page's alert box).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
    /// Stable error identifier when `level` is `Error`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<&'static str>,
}

/// Everything the presentation layer renders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dashboard {
    pub phase: Phase,
    pub wallet_status: String,
    pub address: Option<Address>,
    pub chain_id: Option<u64>,
    pub send_enabled: bool,
    pub cooldown: String,
    pub total: String,
    pub recent: Vec<String>,
    pub notices: VecDeque<Notice>,
    pub last_refresh_ms: Option<u64>,
}

impl Default for Dashboard {
    fn default() -> Self {
        Self {
            phase: Phase::Disconnected,
            wallet_status: STATUS_DISCONNECTED.to_string(),
            address: None,
            chain_id: None,
            send_enabled: false,
            cooldown: String::new(),
            total: LOADING.to_string(),
            recent: Vec::new(),
            notices: VecDeque::new(),
            last_refresh_ms: None,
        }
    }
}

impl Dashboard {
    /// Revert to disconnected affordances, keeping the notice history.
    pub fn reset(&mut self) {
        let notices = std::mem::take(&mut self.notices);
        *self = Self {
            notices,
            ..Self::default()
        };
    }

    pub fn push_notice(&mut self, notice: Notice) {
        if self.notices.len() == MAX_NOTICES {
            self.notices.pop_front();
        }
        self.notices.push_back(notice);
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.push_notice(Notice {
            level: NoticeLevel::Info,
            message: message.into(),
            kind: None,
        });
    }

    pub fn error(&mut self, err: &SessionError) {
        self.push_notice(Notice {
            level: NoticeLevel::Error,
            message: err.to_string(),
            kind: Some(err.kind()),
        });
    }
}

/// Shared, lock-free handle to the current dashboard.
#[derive(Debug, Clone, Default)]
pub struct DashboardHandle {
    inner: Arc<ArcSwap<Dashboard>>,
}

impl DashboardHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current snapshot.
    pub fn snapshot(&self) -> Arc<Dashboard> {
        self.inner.load_full()
    }

    /// Apply `f` to a copy and publish it. `f` may run more than once under
    /// contention, so it must not have side effects outside the dashboard.
    pub fn update<F>(&self, f: F)
    where
        F: Fn(&mut Dashboard),
    {
        self.inner.rcu(|current| {
            let mut next = Dashboard::clone(current);
            f(&mut next);
            next
        });
    }
}

/// `0xf39F...2266`
pub fn short_address(address: &Address) -> String {
    let full = address.to_string();
    match (full.get(..6), full.get(full.len().saturating_sub(4)..)) {
        (Some(head), Some(tail)) => format!("{}...{}", head, tail),
        _ => full,
    }
}

pub fn connected_status(address: &Address) -> String {
    format!("Status: Connected - {}", short_address(address))
}

/// Decimal text of the running total.
pub fn render_total(total: &U256) -> String {
    total.to_string()
}

/// `User: 0x... - Time: 2023-11-14 22:13:20 UTC`
pub fn render_entry(entry: &GreetingEntry) -> String {
    let time = i64::try_from(entry.timestamp)
        .ok()
        .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| entry.timestamp.to_string());
    format!("User: {} - Time: {}", entry.user, time)
}

pub fn render_entries(entries: &[GreetingEntry]) -> Vec<String> {
    entries.iter().map(render_entry).collect()
}
