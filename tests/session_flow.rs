//! End-to-end controller behaviour against fake wallet and contract.

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, timeout};

use gm_dashboard::blockchain::types::{ChainParams, GreetingEntry};
use gm_dashboard::config::ChainConfig;
use gm_dashboard::cooldown::{cooldown_key, CooldownStatus, CooldownStore, FileStore};
use gm_dashboard::session::dashboard::{ERROR_LOADING, LOADING, STATUS_DISCONNECTED, STATUS_FAILED};
use gm_dashboard::session::{NoticeLevel, Phase, SessionError};

mod common;

use common::{eventually, Harness, SubmitBehavior, SwitchBehavior, OTHER, T0, USER};

const HOUR: Duration = Duration::from_secs(3600);

/// Poller effectively idle after its first cycle.
fn quiet_config() -> gm_dashboard::AppConfig {
    let mut config = common::test_config();
    config.refresh.interval_ms = 60_000;
    config
}

#[tokio::test]
async fn test_connect_populates_session() {
    let h = Harness::new(|_| {});

    let address = h.controller.connect().await.unwrap();
    assert_eq!(address, USER);
    assert_eq!(h.controller.phase().await, Phase::Connected);
    assert_eq!(
        h.wallet.calls(),
        vec!["request_accounts", "switch_chain:8408", "bind_contract"]
    );

    let snap = h.controller.snapshot();
    assert_eq!(snap.wallet_status, "Status: Connected - 0xf39F...2266");
    assert_eq!(snap.address, Some(USER));
    assert_eq!(snap.chain_id, Some(8408));
    assert!(snap.send_enabled);
    assert_eq!(snap.cooldown, "Active");

    // The first refresh cycle runs right away.
    assert!(eventually(|| h.controller.snapshot().total == "42").await);
}

#[tokio::test]
async fn test_connect_twice_keeps_session() {
    let h = Harness::new(|_| {});
    h.controller.connect().await.unwrap();
    assert_eq!(h.controller.connect().await, Ok(USER));

    let requests = h.wallet.calls().iter().filter(|c| *c == "request_accounts").count();
    assert_eq!(requests, 1);
}

#[tokio::test]
async fn test_unrecognized_chain_is_added() {
    let h = Harness::new(|w| w.switch = SwitchBehavior::Unrecognized);

    h.controller.connect().await.unwrap();

    assert_eq!(
        h.wallet.calls(),
        vec!["request_accounts", "switch_chain:8408", "add_chain:0x20d8", "bind_contract"]
    );
    let added = h.wallet.added();
    assert_eq!(added.len(), 1);
    assert_eq!(added[0], ChainParams::from(&ChainConfig::default()));
    assert_eq!(added[0].chain_name, "ZenChain Testnet");
    assert_eq!(added[0].rpc_urls, vec!["https://zenchain-testnet.api.onfinality.io/public"]);
    assert_eq!(added[0].block_explorer_urls, vec!["https://zentrace.io"]);
    assert_eq!(added[0].native_currency.symbol, "ZTC");
    assert_eq!(added[0].native_currency.decimals, 18);
    assert_eq!(h.controller.snapshot().chain_id, Some(8408));
}

#[tokio::test]
async fn test_other_switch_errors_do_not_block_connect() {
    for code in [4001, -32603] {
        let h = Harness::new(|w| w.switch = SwitchBehavior::FailWith(code));

        assert_eq!(h.controller.connect().await, Ok(USER));
        assert!(h.wallet.added().is_empty());
        assert!(!h.wallet.calls().iter().any(|c| c.starts_with("add_chain")));

        let snap = h.controller.snapshot();
        assert_eq!(snap.phase, Phase::Connected);
        assert_eq!(snap.chain_id, None);
    }
}

#[tokio::test]
async fn test_failed_add_chain_does_not_block_connect() {
    let h = Harness::new(|w| {
        w.switch = SwitchBehavior::Unrecognized;
        w.add_error = Some(4001);
    });

    assert_eq!(h.controller.connect().await, Ok(USER));
    assert_eq!(h.controller.snapshot().chain_id, None);
}

#[tokio::test]
async fn test_rejected_account_request_fails_connect() {
    let h = Harness::new(|w| w.accounts_error = Some(4001));

    assert_eq!(h.controller.connect().await, Err(SessionError::UserRejected));
    assert_eq!(h.controller.phase().await, Phase::Failed);

    let snap = h.controller.snapshot();
    assert_eq!(snap.wallet_status, STATUS_FAILED);
    assert!(!snap.send_enabled);
    let notice = snap.notices.back().unwrap();
    assert_eq!(notice.level, NoticeLevel::Error);
    assert_eq!(notice.kind, Some("user_rejected"));

    // No chain switch or contract setup after the failure.
    assert_eq!(h.wallet.calls(), vec!["request_accounts"]);
}

#[tokio::test]
async fn test_empty_account_list_fails_connect() {
    let h = Harness::new(|w| w.accounts.clear());
    assert_eq!(h.controller.connect().await, Err(SessionError::NoAccounts));
    assert_eq!(h.controller.phase().await, Phase::Failed);
}

#[tokio::test(start_paused = true)]
async fn test_account_request_times_out() {
    let h = Harness::new(|w| w.hang_accounts = true);

    let err = h.controller.connect().await.unwrap_err();
    assert_eq!(
        err,
        SessionError::Timeout {
            operation: "account request",
            after: Duration::from_secs(2)
        }
    );
    assert_eq!(h.controller.phase().await, Phase::Failed);
}

#[tokio::test]
async fn test_disconnect_cancels_pending_connect() {
    let h = Harness::new(|w| w.hang_accounts = true);

    let controller = h.controller.clone();
    let pending = tokio::spawn(async move { controller.connect().await });

    assert!(eventually(|| !h.wallet.calls().is_empty()).await);
    assert_eq!(h.controller.phase().await, Phase::Connecting);
    assert!(h.controller.disconnect().await);

    let result = pending.await.unwrap();
    assert_eq!(result, Err(SessionError::Cancelled { operation: "connect" }));
    assert_eq!(h.controller.phase().await, Phase::Disconnected);
    assert_eq!(h.controller.snapshot().wallet_status, STATUS_DISCONNECTED);
}

#[tokio::test(start_paused = true)]
async fn test_connect_finishes_without_caller() {
    let h = Harness::with_config(quiet_config(), |w| w.accounts_delay = Duration::from_millis(300));

    assert!(timeout(Duration::from_millis(50), h.controller.connect()).await.is_err());
    assert_eq!(h.controller.phase().await, Phase::Connecting);

    sleep(Duration::from_millis(400)).await;
    assert_eq!(h.controller.phase().await, Phase::Connected);
    assert_eq!(h.controller.snapshot().phase, Phase::Connected);
    assert_eq!(h.controller.connect().await, Ok(USER));
}

#[tokio::test(start_paused = true)]
async fn test_abandoned_connect_expires() {
    let h = Harness::new(|w| w.hang_accounts = true);

    assert!(timeout(Duration::from_millis(50), h.controller.connect()).await.is_err());
    assert_eq!(h.controller.phase().await, Phase::Connecting);

    // Past the 2s prompt deadline.
    sleep(Duration::from_secs(3)).await;
    assert_eq!(h.controller.phase().await, Phase::Failed);
    assert_eq!(h.controller.snapshot().wallet_status, STATUS_FAILED);

    // A fresh attempt starts instead of being refused.
    assert!(timeout(Duration::from_millis(50), h.controller.connect()).await.is_err());
    let prompts = h.wallet.calls().iter().filter(|c| *c == "request_accounts").count();
    assert_eq!(prompts, 2);
}

#[tokio::test]
async fn test_connect_while_connecting_is_refused() {
    let h = Harness::new(|w| w.hang_accounts = true);

    let controller = h.controller.clone();
    let _pending = tokio::spawn(async move { controller.connect().await });
    assert!(eventually(|| !h.wallet.calls().is_empty()).await);

    assert_eq!(h.controller.connect().await, Err(SessionError::AlreadyConnecting));
}

#[tokio::test]
async fn test_successful_send_records_once_at_confirmation() {
    let h = Harness::new(|_| {});
    h.controller.connect().await.unwrap();

    let receipt = h.controller.send_greeting().await.unwrap();
    assert_eq!(receipt.block_number, 77);
    // The fake chain takes 12s to confirm; the record carries the later time.
    assert_eq!(receipt.recorded_at_ms, T0 + 12_000);

    assert_eq!(h.contract.submits.load(Ordering::SeqCst), 1);
    assert_eq!(h.store.len(), 1);
    assert_eq!(h.store.raw(&cooldown_key(&USER)), Some((T0 + 12_000).to_string()));

    let snap = h.controller.snapshot();
    assert!(!snap.send_enabled);
    assert_eq!(snap.cooldown, "Disabled - Remaining: 1h 0m");
    let notice = snap.notices.back().unwrap();
    assert_eq!(notice.level, NoticeLevel::Info);
    assert_eq!(notice.message, "Greeting sent successfully!");
}

#[tokio::test]
async fn test_failed_sends_record_nothing() {
    let cases = [
        (SubmitBehavior::Revert, "transaction_failed"),
        (SubmitBehavior::RejectInWallet, "user_rejected"),
    ];

    for (behavior, kind) in cases {
        let h = Harness::new(|_| {});
        h.controller.connect().await.unwrap();
        h.contract.set_submit(behavior);

        let err = h.controller.send_greeting().await.unwrap_err();
        assert_eq!(err.kind(), kind);
        assert!(h.store.is_empty());

        let snap = h.controller.snapshot();
        assert!(snap.send_enabled, "send re-enabled after {:?}", behavior);
        assert_eq!(snap.cooldown, "Active");
        assert_eq!(snap.notices.back().unwrap().kind, Some(kind));
    }
}

#[tokio::test(start_paused = true)]
async fn test_confirmation_timeout_records_nothing() {
    let h = Harness::new(|_| {});
    h.controller.connect().await.unwrap();
    h.contract.set_submit(SubmitBehavior::NeverConfirm);

    let err = h.controller.send_greeting().await.unwrap_err();
    assert_eq!(
        err,
        SessionError::Timeout {
            operation: "transaction confirmation",
            after: Duration::from_secs(2)
        }
    );
    assert!(h.store.is_empty());
}

#[tokio::test]
async fn test_send_requires_connection() {
    let h = Harness::new(|_| {});
    assert_eq!(h.controller.send_greeting().await, Err(SessionError::NotConnected));
    assert_eq!(h.contract.submits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_send_refused_while_locked() {
    let h = Harness::new(|_| {});
    h.store.record_send(&USER, T0 - 60_000).unwrap();
    h.controller.connect().await.unwrap();

    let snap = h.controller.snapshot();
    assert!(!snap.send_enabled);
    assert_eq!(snap.cooldown, "Disabled - Remaining: 0h 59m");

    let err = h.controller.send_greeting().await.unwrap_err();
    assert_eq!(
        err,
        SessionError::CooldownActive {
            remaining: Duration::from_secs(59 * 60)
        }
    );
    assert_eq!(h.contract.submits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_concurrent_send_is_refused() {
    let h = Harness::new(|_| {});
    h.controller.connect().await.unwrap();
    h.contract.set_submit(SubmitBehavior::NeverConfirm);

    let controller = h.controller.clone();
    let _first = tokio::spawn(async move { controller.send_greeting().await });
    assert!(eventually(|| h.contract.submits.load(Ordering::SeqCst) == 1).await);

    assert_eq!(h.controller.send_greeting().await, Err(SessionError::SendInProgress));
    assert_eq!(h.contract.submits.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn test_send_finishes_without_caller() {
    let h = Harness::with_config(quiet_config(), |_| {});
    h.controller.connect().await.unwrap();
    h.contract.set_confirm_wait(Duration::from_millis(300));

    assert!(timeout(Duration::from_millis(50), h.controller.send_greeting()).await.is_err());
    assert_eq!(h.store.last_send(&USER).unwrap(), None);
    assert_eq!(h.controller.send_greeting().await, Err(SessionError::SendInProgress));

    sleep(Duration::from_millis(400)).await;
    assert_eq!(h.store.last_send(&USER).unwrap(), Some(T0 + 12_000));
    assert!(!h.controller.snapshot().send_enabled);

    let err = h.controller.send_greeting().await.unwrap_err();
    assert!(matches!(err, SessionError::CooldownActive { .. }));
    assert_eq!(h.contract.submits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_unwritable_record_leaves_send_enabled() {
    let path = std::env::temp_dir()
        .join(format!("gm-missing-{}", uuid::Uuid::new_v4()))
        .join("cooldowns.json");
    let records = Arc::new(FileStore::open(&path).unwrap());
    let h = Harness::with_store(quiet_config(), records.clone(), |_| {});
    h.controller.connect().await.unwrap();

    let err = h.controller.send_greeting().await.unwrap_err();
    assert!(matches!(err, SessionError::Storage(_)));
    assert_eq!(records.last_send(&USER).unwrap(), None);

    let snap = h.controller.snapshot();
    assert!(snap.send_enabled);
    assert_eq!(snap.cooldown, "Active");
    assert_eq!(snap.notices.back().and_then(|n| n.kind), Some("storage"));
}

#[tokio::test]
async fn test_disconnect_resets_dashboard() {
    let h = Harness::new(|_| {});
    h.controller.connect().await.unwrap();
    assert!(eventually(|| h.controller.snapshot().total == "42").await);

    assert!(h.controller.disconnect().await);
    let snap = h.controller.snapshot();
    assert_eq!(snap.phase, Phase::Disconnected);
    assert_eq!(snap.wallet_status, STATUS_DISCONNECTED);
    assert!(!snap.send_enabled);
    assert_eq!(snap.total, LOADING);
    assert!(snap.recent.is_empty());
    assert_eq!(snap.address, None);

    // Idempotent.
    assert!(!h.controller.disconnect().await);
    assert_eq!(h.controller.phase().await, Phase::Disconnected);
}

#[tokio::test]
async fn test_polling_continues_after_failed_cycle() {
    let h = Harness::new(|_| {});
    h.contract.set_total(None);
    h.controller.connect().await.unwrap();
    assert!(eventually(|| h.controller.snapshot().total == ERROR_LOADING).await);

    let calls = h.contract.total_calls.load(Ordering::SeqCst);
    assert!(eventually(|| h.contract.total_calls.load(Ordering::SeqCst) >= calls + 3).await);

    h.contract.set_total(Some(43));
    assert!(eventually(|| h.controller.snapshot().total == "43").await);
}

#[tokio::test]
async fn test_disconnect_stops_polling() {
    let h = Harness::new(|_| {});
    h.controller.connect().await.unwrap();
    assert!(eventually(|| h.contract.read_calls() >= 4).await);

    h.controller.disconnect().await;
    tokio::time::sleep(Duration::from_millis(20)).await;
    let calls = h.contract.read_calls();

    // Several refresh intervals.
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(h.contract.read_calls(), calls);
    assert_eq!(h.controller.snapshot().total, LOADING);
}

#[tokio::test]
async fn test_cooldown_survives_disconnect() {
    let h = Harness::new(|_| {});
    h.controller.connect().await.unwrap();
    h.controller.send_greeting().await.unwrap();

    let before = h.controller.cooldown_status(&USER).unwrap();
    h.controller.disconnect().await;
    assert_eq!(h.controller.cooldown_status(&USER).unwrap(), before);
    assert!(before.is_locked());

    // Reconnecting picks the lock back up.
    h.controller.connect().await.unwrap();
    assert!(!h.controller.snapshot().send_enabled);
}

#[tokio::test]
async fn test_cooldown_status_scenario() {
    let h = Harness::new(|_| {});
    h.store.record_send(&OTHER, T0).unwrap();
    h.clock.set(T0 + 1_800_000);

    let status = h.controller.cooldown_status(&OTHER).unwrap();
    assert_eq!(
        status,
        CooldownStatus::Locked {
            remaining: Duration::from_millis(1_800_000)
        }
    );
    assert_eq!(status.describe(), "Disabled - Remaining: 0h 30m");

    h.clock.set(T0 + HOUR.as_millis() as u64);
    assert_eq!(h.controller.cooldown_status(&OTHER).unwrap(), CooldownStatus::Active);
    assert_eq!(h.controller.cooldown_status(&USER).unwrap(), CooldownStatus::Active);
}

#[tokio::test]
async fn test_refresh_renders_total_and_entries() {
    let h = Harness::with_config(quiet_config(), |_| {});
    h.controller.connect().await.unwrap();

    let snap = h.controller.refresh_now().await.unwrap();
    assert_eq!(snap.total, "42");
    assert!(snap.recent.is_empty());
    assert!(snap.last_refresh_ms.is_some());

    h.contract.set_recent(Some(vec![GreetingEntry {
        user: USER,
        timestamp: 1_700_000_000,
    }]));
    let snap = h.controller.refresh_now().await.unwrap();
    assert_eq!(
        snap.recent,
        vec!["User: 0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266 - Time: 2023-11-14 22:13:20 UTC"]
    );
}

#[tokio::test]
async fn test_refresh_tolerates_partial_failure() {
    let h = Harness::with_config(quiet_config(), |_| {});
    h.controller.connect().await.unwrap();
    h.contract.set_total(None);

    let snap = h.controller.refresh_now().await.unwrap();
    assert_eq!(snap.total, ERROR_LOADING);
    assert!(snap.recent.is_empty());

    h.contract.set_total(Some(43));
    h.contract.set_recent(None);
    let snap = h.controller.refresh_now().await.unwrap();
    assert_eq!(snap.total, "43");
    assert_eq!(snap.recent, vec![ERROR_LOADING]);
}
