#![allow(clippy::unwrap_used)]
// Scan confirmation flow: admin gating, single dispatch, notifications,
// and the unconditional return to idle.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio_test::{assert_err, assert_ok};

use emsbus_core::{
    CoreError, DeviceScanner, Identity, NotificationLevel, SCAN_FAILED_MESSAGE,
    SCAN_STARTED_MESSAGE, ScanController, ScanOutcome, ScanState,
};

// ── Helpers ─────────────────────────────────────────────────────────

enum Reply {
    Accept,
    Reject(Option<String>),
    Hang,
}

struct FakeScanner {
    reply: Reply,
    calls: AtomicUsize,
}

impl FakeScanner {
    fn new(reply: Reply) -> Arc<Self> {
        Arc::new(Self {
            reply,
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl DeviceScanner for FakeScanner {
    async fn scan_devices(&self) -> Result<(), CoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.reply {
            Reply::Accept => Ok(()),
            Reply::Reject(message) => Err(CoreError::Api {
                status: 500,
                message: message.clone(),
            }),
            Reply::Hang => std::future::pending().await,
        }
    }
}

fn admin() -> Identity {
    Identity {
        username: "admin".into(),
        admin: true,
    }
}

// ── Tests ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_confirmed_scan_notifies_and_returns_to_idle() {
    let scanner = FakeScanner::new(Reply::Accept);
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut scan = ScanController::new(Arc::clone(&scanner), tx);

    assert_ok!(scan.request(&admin()));
    assert_eq!(scan.state(), ScanState::Confirming);

    let outcome = assert_ok!(scan.confirm().await);
    assert_eq!(outcome, ScanOutcome::Dispatched);
    assert_eq!(scan.state(), ScanState::Idle);
    assert_eq!(scanner.calls(), 1);

    let note = rx.try_recv().unwrap();
    assert_eq!(note.level, NotificationLevel::Info);
    assert_eq!(note.message, SCAN_STARTED_MESSAGE);
    assert!(rx.try_recv().is_err(), "exactly one notification");
}

#[tokio::test]
async fn test_failed_scan_reports_gateway_message() {
    let scanner = FakeScanner::new(Reply::Reject(Some("Bus is busy".into())));
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut scan = ScanController::new(Arc::clone(&scanner), tx);

    scan.request(&admin()).unwrap();
    let outcome = scan.confirm().await.unwrap();

    assert_eq!(
        outcome,
        ScanOutcome::Failed {
            message: "Bus is busy".into()
        }
    );
    assert_eq!(scan.state(), ScanState::Idle);
    let note = rx.try_recv().unwrap();
    assert_eq!(note.level, NotificationLevel::Error);
    assert_eq!(note.message, "Bus is busy");
}

#[tokio::test]
async fn test_failed_scan_without_message_uses_fallback() {
    let scanner = FakeScanner::new(Reply::Reject(None));
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut scan = ScanController::new(scanner, tx);

    scan.request(&admin()).unwrap();
    scan.confirm().await.unwrap();

    assert_eq!(rx.try_recv().unwrap().message, SCAN_FAILED_MESSAGE);
}

#[tokio::test]
async fn test_non_admin_never_dispatches() {
    let scanner = FakeScanner::new(Reply::Accept);
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut scan = ScanController::new(Arc::clone(&scanner), tx);

    let err = assert_err!(scan.request(&Identity::anonymous()));
    assert!(matches!(err, CoreError::PermissionDenied { .. }));
    assert_err!(scan.confirm().await);

    assert_eq!(scanner.calls(), 0);
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn test_cancel_sends_no_request() {
    let scanner = FakeScanner::new(Reply::Accept);
    let (tx, _rx) = mpsc::unbounded_channel();
    let mut scan = ScanController::new(Arc::clone(&scanner), tx);

    scan.request(&admin()).unwrap();
    scan.cancel();
    assert_eq!(scan.state(), ScanState::Idle);
    assert_err!(scan.confirm().await);
    assert_eq!(scanner.calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_abandoned_dispatch_returns_to_idle() {
    let scanner = FakeScanner::new(Reply::Hang);
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut scan = ScanController::new(Arc::clone(&scanner), tx);

    scan.request(&admin()).unwrap();
    let timed_out = tokio::time::timeout(Duration::from_secs(5), scan.confirm()).await;

    assert!(timed_out.is_err());
    assert_eq!(scan.state(), ScanState::Idle);
    assert_eq!(scanner.calls(), 1);
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn test_closed_notification_channel_is_tolerated() {
    let scanner = FakeScanner::new(Reply::Accept);
    let (tx, rx) = mpsc::unbounded_channel();
    drop(rx);
    let mut scan = ScanController::new(scanner, tx);

    scan.request(&admin()).unwrap();
    assert_eq!(scan.confirm().await.unwrap(), ScanOutcome::Dispatched);
}
