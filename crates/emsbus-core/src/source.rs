// ── Gateway seams ──
//
// The poller and scan controller talk to the gateway only through these
// traits, so tests can substitute scripted fakes for the HTTP client.

use std::future::Future;
use std::sync::Arc;

use tracing::debug;

use emsbus_api::GatewayClient;

use crate::config::DashboardConfig;
use crate::error::CoreError;
use crate::model::{BusStatus, Identity};

/// Anything that can produce a fresh [`BusStatus`] snapshot.
pub trait StatusSource: Send + Sync + 'static {
    fn read_status(&self) -> impl Future<Output = Result<BusStatus, CoreError>> + Send;
}

/// Anything that can trigger a server-side device scan.
pub trait DeviceScanner: Send + Sync {
    fn scan_devices(&self) -> impl Future<Output = Result<(), CoreError>> + Send;
}

impl<T: StatusSource> StatusSource for Arc<T> {
    fn read_status(&self) -> impl Future<Output = Result<BusStatus, CoreError>> + Send {
        (**self).read_status()
    }
}

impl<T: DeviceScanner> DeviceScanner for Arc<T> {
    fn scan_devices(&self) -> impl Future<Output = Result<(), CoreError>> + Send {
        (**self).scan_devices()
    }
}

/// The real gateway, reached over HTTP.
#[derive(Debug, Clone)]
pub struct GatewaySource {
    client: GatewayClient,
}

impl GatewaySource {
    pub fn new(config: &DashboardConfig) -> Result<Self, CoreError> {
        let client = GatewayClient::new(config.url.clone(), &config.transport())?;
        Ok(Self { client })
    }

    pub fn from_client(client: GatewayClient) -> Self {
        Self { client }
    }

    /// Resolve who the configured token belongs to.
    ///
    /// A gateway that rejects the token yields [`Identity::anonymous`]
    /// rather than an error, so read-only dashboards keep working.
    pub async fn identity(&self) -> Result<Identity, CoreError> {
        match self.client.verify_authorization().await {
            Ok(raw) => Ok(Identity::from(raw)),
            Err(e) if e.is_unauthorized() => {
                debug!(error = %e, "token not accepted, continuing anonymously");
                Ok(Identity::anonymous())
            }
            Err(e) => Err(e.into()),
        }
    }
}

impl StatusSource for GatewaySource {
    async fn read_status(&self) -> Result<BusStatus, CoreError> {
        Ok(self.client.read_status().await?.into())
    }
}

impl DeviceScanner for GatewaySource {
    async fn scan_devices(&self) -> Result<(), CoreError> {
        Ok(self.client.scan_devices().await?)
    }
}
