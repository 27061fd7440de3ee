// ── Device scan lifecycle ──
//
// Idle → Confirming → Dispatching → Idle. Only administrators may open
// the confirmation step; confirming fires one scan request and always
// returns to Idle, reporting the outcome as a notification.

use serde::Serialize;
use strum::{AsRefStr, Display, IntoStaticStr};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::error::CoreError;
use crate::failure::extract_message;
use crate::model::Identity;
use crate::notify::Notification;
use crate::source::DeviceScanner;

/// Notification text after the gateway accepts a scan request.
pub const SCAN_STARTED_MESSAGE: &str = "Scanning for devices...";

/// Fallback text when a failed scan carries no better message.
pub const SCAN_FAILED_MESSAGE: &str = "Problem initiating scan";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, AsRefStr, IntoStaticStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ScanState {
    Idle,
    Confirming,
    Dispatching,
}

/// Result of a confirmed scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ScanOutcome {
    Dispatched,
    Failed { message: String },
}

/// Whether `identity` may start a device scan.
pub fn can_request_scan(identity: &Identity) -> bool {
    identity.admin
}

/// Drives one dashboard's scan confirmation flow.
pub struct ScanController<D> {
    scanner: D,
    state: ScanState,
    notifications: mpsc::UnboundedSender<Notification>,
}

impl<D: DeviceScanner> ScanController<D> {
    pub fn new(scanner: D, notifications: mpsc::UnboundedSender<Notification>) -> Self {
        Self {
            scanner,
            state: ScanState::Idle,
            notifications,
        }
    }

    pub fn state(&self) -> ScanState {
        self.state
    }

    /// The confirmation prompt is showing (or a dispatch is underway).
    pub fn is_dialog_open(&self) -> bool {
        self.state != ScanState::Idle
    }

    /// Open the confirmation step.
    ///
    /// Non-admins are refused. Re-requesting while already confirming is
    /// a no-op: there is only ever one prompt.
    pub fn request(&mut self, identity: &Identity) -> Result<(), CoreError> {
        if !can_request_scan(identity) {
            return Err(CoreError::PermissionDenied {
                message: "scanning for devices requires admin privileges".into(),
            });
        }
        match self.state {
            ScanState::Idle => {
                debug!(user = %identity.username, "scan confirmation requested");
                self.state = ScanState::Confirming;
                Ok(())
            }
            ScanState::Confirming => Ok(()),
            ScanState::Dispatching => Err(CoreError::InvalidScanTransition {
                action: "request",
                state: ScanState::Dispatching.into(),
            }),
        }
    }

    /// Dismiss the prompt without sending anything.
    pub fn cancel(&mut self) {
        if self.state == ScanState::Confirming {
            debug!("scan cancelled");
            self.state = ScanState::Idle;
        }
    }

    /// Send the scan request and report the outcome.
    ///
    /// The controller is back in [`ScanState::Idle`] when this returns,
    /// whatever happened, including if the future is dropped mid-flight.
    pub async fn confirm(&mut self) -> Result<ScanOutcome, CoreError> {
        if self.state != ScanState::Confirming {
            return Err(CoreError::InvalidScanTransition {
                action: "confirm",
                state: self.state.into(),
            });
        }

        let Self {
            scanner,
            state,
            notifications,
        } = self;
        *state = ScanState::Dispatching;
        let _idle = ReturnToIdle(state);

        let outcome = match scanner.scan_devices().await {
            Ok(()) => {
                info!("device scan started");
                let _ = notifications.send(Notification::info(SCAN_STARTED_MESSAGE));
                ScanOutcome::Dispatched
            }
            Err(e) => {
                warn!(error = %e, "device scan request failed");
                let message = extract_message(&e, SCAN_FAILED_MESSAGE);
                let _ = notifications.send(Notification::error(message.clone()));
                ScanOutcome::Failed { message }
            }
        };
        Ok(outcome)
    }
}

struct ReturnToIdle<'a>(&'a mut ScanState);

impl Drop for ReturnToIdle<'_> {
    fn drop(&mut self) {
        *self.0 = ScanState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Unreachable;

    impl DeviceScanner for Unreachable {
        async fn scan_devices(&self) -> Result<(), CoreError> {
            panic!("scan must not be dispatched");
        }
    }

    fn admin() -> Identity {
        Identity {
            username: "admin".into(),
            admin: true,
        }
    }

    #[test]
    fn non_admin_cannot_open_prompt() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut scan = ScanController::new(Unreachable, tx);
        let err = scan.request(&Identity::anonymous()).expect_err("non-admin refused");
        assert!(matches!(err, CoreError::PermissionDenied { .. }));
        assert_eq!(scan.state(), ScanState::Idle);
    }

    #[test]
    fn repeated_request_keeps_single_prompt() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut scan = ScanController::new(Unreachable, tx);
        scan.request(&admin()).expect("admin may request");
        scan.request(&admin()).expect("admin may request");
        assert_eq!(scan.state(), ScanState::Confirming);
        assert!(scan.is_dialog_open());
    }

    #[test]
    fn cancel_sends_nothing() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut scan = ScanController::new(Unreachable, tx);
        scan.request(&admin()).expect("admin may request");
        scan.cancel();
        assert_eq!(scan.state(), ScanState::Idle);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn confirm_without_prompt_is_rejected() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut scan = ScanController::new(Unreachable, tx);
        let err = scan.confirm().await.expect_err("no prompt open");
        assert!(matches!(
            err,
            CoreError::InvalidScanTransition {
                action: "confirm",
                state: "idle"
            }
        ));
    }

    #[test]
    fn state_names() {
        assert_eq!(ScanState::Confirming.to_string(), "confirming");
        assert_eq!(ScanState::Dispatching.as_ref(), "dispatching");
    }
}
