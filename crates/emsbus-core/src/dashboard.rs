// ── Dashboard facade ──
//
// Ties one poller, one scan controller, and the caller's identity to a
// single view lifecycle: `activate` when the view becomes visible,
// `deactivate` (or drop) when it goes away.

use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use crate::config::DashboardConfig;
use crate::error::CoreError;
use crate::model::Identity;
use crate::notify::Notification;
use crate::poller::{PollState, PollerHandle, StatusPoller};
use crate::scan::{ScanController, ScanOutcome, ScanState};
use crate::source::{DeviceScanner, GatewaySource, StatusSource};
use crate::view::DashboardView;

pub struct Dashboard<S: StatusSource + DeviceScanner + Clone> {
    source: S,
    poller: StatusPoller<S>,
    handle: Option<PollerHandle<S>>,
    scan: ScanController<S>,
    identity: Identity,
}

impl Dashboard<GatewaySource> {
    /// Build a dashboard for a real gateway, resolving the caller's
    /// identity first.
    ///
    /// Without a token the caller is anonymous. A gateway that can't
    /// answer the identity check also leaves the caller anonymous: the
    /// dashboard still comes up and its polls report the outage.
    /// [`verify_identity`](Self::verify_identity) retries the check.
    pub async fn connect(
        config: &DashboardConfig,
        notifications: mpsc::UnboundedSender<Notification>,
    ) -> Result<Self, CoreError> {
        let source = GatewaySource::new(config)?;
        let identity = if config.access_token.is_some() {
            match source.identity().await {
                Ok(identity) => identity,
                Err(e) => {
                    warn!(error = %e, "identity check failed, continuing anonymously");
                    Identity::anonymous()
                }
            }
        } else {
            Identity::anonymous()
        };
        info!(
            url = %config.url,
            user = %identity.username,
            admin = identity.admin,
            "dashboard connected"
        );
        Ok(Self::new(source, identity, config, notifications))
    }

    /// Ask the gateway again who the token belongs to. Unlike
    /// [`connect`](Self::connect), a failed check is returned as an error.
    pub async fn verify_identity(&mut self) -> Result<&Identity, CoreError> {
        self.identity = self.source.identity().await?;
        Ok(&self.identity)
    }
}

impl<S: StatusSource + DeviceScanner + Clone> Dashboard<S> {
    pub fn new(
        source: S,
        identity: Identity,
        config: &DashboardConfig,
        notifications: mpsc::UnboundedSender<Notification>,
    ) -> Self {
        Self {
            poller: StatusPoller::new(source.clone(), config.poll_interval),
            handle: None,
            scan: ScanController::new(source.clone(), notifications),
            source,
            identity,
        }
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn poller(&self) -> &StatusPoller<S> {
        &self.poller
    }

    pub fn is_active(&self) -> bool {
        self.handle.is_some()
    }

    /// Start polling. Calling this on an active dashboard is an error.
    pub fn activate(&mut self) -> Result<(), CoreError> {
        if self.handle.is_some() {
            return Err(CoreError::PollerAlreadyActive);
        }
        self.handle = Some(self.poller.activate()?);
        Ok(())
    }

    /// Stop polling and wait for the timer task to finish.
    pub async fn deactivate(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.deactivate().await;
        }
    }

    /// Manual refresh. `None` while inactive: nothing is sent.
    pub fn refresh(&self) -> Option<u64> {
        let seq = self.handle.as_ref().and_then(PollerHandle::refresh);
        if seq.is_none() {
            debug!("refresh ignored, dashboard inactive");
        }
        seq
    }

    pub fn subscribe(&self) -> watch::Receiver<PollState> {
        self.poller.subscribe()
    }

    pub fn view(&self) -> DashboardView {
        DashboardView::build(&self.poller.state(), &self.identity, self.scan.state())
    }

    pub fn scan_state(&self) -> ScanState {
        self.scan.state()
    }

    pub fn request_scan(&mut self) -> Result<(), CoreError> {
        self.scan.request(&self.identity)
    }

    pub fn cancel_scan(&mut self) {
        self.scan.cancel();
    }

    pub async fn confirm_scan(&mut self) -> Result<ScanOutcome, CoreError> {
        self.scan.confirm().await
    }
}
