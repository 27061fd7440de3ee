// ── Runtime dashboard configuration ──
//
// Describes *how* to reach a gateway and how often to poll it. Carries
// credential data but never touches disk: the CLI (via emsbus-config)
// builds a `DashboardConfig` and hands it in.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use url::Url;

use emsbus_api::{TlsMode, TransportConfig};

/// How often an active dashboard refreshes bus status.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(PathBuf),
    /// Skip verification (self-signed certs).
    DangerAcceptInvalid,
}

/// Configuration for one dashboard bound to a single gateway.
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    /// Gateway URL (e.g., `http://ems-esp.local`).
    pub url: Url,
    /// Bearer token; `None` for anonymous, read-only access.
    pub access_token: Option<SecretString>,
    /// TLS verification strategy.
    pub tls: TlsVerification,
    /// Request timeout.
    pub timeout: Duration,
    /// Automatic refresh period while the dashboard is active.
    pub poll_interval: Duration,
}

impl DashboardConfig {
    /// Anonymous config with default timeout and poll interval.
    pub fn new(url: Url) -> Self {
        Self {
            url,
            access_token: None,
            tls: TlsVerification::default(),
            timeout: DEFAULT_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Build the api-level [`TransportConfig`] for this dashboard.
    pub fn transport(&self) -> TransportConfig {
        TransportConfig {
            tls: match &self.tls {
                TlsVerification::SystemDefaults => TlsMode::System,
                TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
                TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
            },
            timeout: self.timeout,
            access_token: self.access_token.clone(),
        }
    }
}
