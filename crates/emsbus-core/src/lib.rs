//! Dashboard logic between `emsbus-api` and UI consumers.
//!
//! This crate turns raw gateway responses into what an EMS bus status
//! view shows, and owns the view's background behaviour:
//!
//! - **[`StatusPoller`]** refreshes bus status on a fixed period while a
//!   [`PollerHandle`] is alive. Responses carry sequence numbers, so a
//!   slow, superseded request never overwrites newer data. Subscribers
//!   observe a [`PollState`] through a `tokio::sync::watch` channel.
//!
//! - **[`ScanController`]** runs the admin-only device scan flow
//!   (idle, confirming, dispatching) and reports outcomes as
//!   [`Notification`]s over an `mpsc` channel.
//!
//! - **Interpretation** is pure: [`classify`] maps a [`ConnectionState`]
//!   to a label and [`Severity`], [`score`] turns per-entity counters into
//!   a [`Quality`] tier, and [`DashboardView::build`] assembles the
//!   render-ready view.
//!
//! - **[`Dashboard`]** is the facade binding all of it to one gateway.
//!
//! The gateway is reached only through the [`StatusSource`] and
//! [`DeviceScanner`] traits; [`GatewaySource`] is the HTTP implementation.

pub mod config;
pub mod connectivity;
pub mod convert;
pub mod dashboard;
pub mod error;
pub mod failure;
pub mod format;
pub mod model;
pub mod notify;
pub mod poller;
pub mod quality;
pub mod scan;
pub mod source;
pub mod view;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{DEFAULT_POLL_INTERVAL, DEFAULT_TIMEOUT, DashboardConfig, TlsVerification};
pub use connectivity::{Connectivity, Severity, classify};
pub use dashboard::Dashboard;
pub use error::CoreError;
pub use failure::{DEFAULT_POLL_MESSAGE, Failure, FailureKind, classify_failure, extract_message};
pub use model::{BusStatus, ConnectionState, Identity, Stat};
pub use notify::{Notification, NotificationLevel};
pub use poller::{PollState, PollerHandle, StatusPoller};
pub use quality::{DEGRADED_THRESHOLD, Quality, QualityTier, score, score_stat};
pub use scan::{
    SCAN_FAILED_MESSAGE, SCAN_STARTED_MESSAGE, ScanController, ScanOutcome, ScanState,
    can_request_scan,
};
pub use source::{DeviceScanner, GatewaySource, StatusSource};
pub use view::{DashboardView, StatRow, StatusView};
