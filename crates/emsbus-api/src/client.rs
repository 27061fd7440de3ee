// Gateway REST client
//
// Wraps `reqwest::Client` with gateway URL construction and status
// mapping. Every endpoint lives under `{base}/rest/`.

use serde::de::DeserializeOwned;
use tracing::{debug, trace};
use url::Url;

use crate::error::Error;
use crate::models::{ErrorBody, IdentityResponse, StatusResponse};
use crate::transport::TransportConfig;

/// Raw HTTP client for a bus gateway.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct GatewayClient {
    http: reqwest::Client,
    base_url: Url,
}

impl GatewayClient {
    /// Create a new client from a `TransportConfig`.
    ///
    /// `base_url` is the gateway root (e.g. `http://ems-esp.local`).
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self { http, base_url })
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self { http, base_url }
    }

    /// The gateway base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── Endpoints ────────────────────────────────────────────────────

    /// Fetch the current bus status snapshot.
    pub async fn read_status(&self) -> Result<StatusResponse, Error> {
        let url = self.rest_url("status")?;
        self.get_json(url).await
    }

    /// Ask the gateway to start a full device scan of the bus.
    ///
    /// Fire-and-forget: the gateway acknowledges the request and runs the
    /// scan on its own; progress is not reported back.
    pub async fn scan_devices(&self) -> Result<(), Error> {
        let url = self.rest_url("scanDevices")?;
        debug!("POST {}", url);

        let resp = self.http.post(url).send().await?;
        check_status(resp).await?;
        Ok(())
    }

    /// Resolve the identity behind the configured access token.
    pub async fn verify_authorization(&self) -> Result<IdentityResponse, Error> {
        let url = self.rest_url("verifyAuthorization")?;
        self.get_json(url).await
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Build `{base}/rest/{path}`.
    pub(crate) fn rest_url(&self, path: &str) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        Ok(Url::parse(&format!("{base}/rest/{path}"))?)
    }

    // ── Request helpers ──────────────────────────────────────────────

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        debug!("GET {}", url);

        let resp = self.http.get(url).send().await?;
        let resp = check_status(resp).await?;
        let body = resp.text().await?;
        trace!(len = body.len(), "response body received");

        serde_json::from_str(&body).map_err(|e| {
            let preview = preview(&body);
            Error::Deserialization {
                message: format!("{e} (body preview: {preview:?})"),
                body: body.clone(),
            }
        })
    }
}

/// Map non-success statuses onto typed errors, passing successful
/// responses through untouched.
async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, Error> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let body = resp.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&body)
        .ok()
        .and_then(|b| b.message)
        .filter(|m| !m.trim().is_empty());

    match status {
        reqwest::StatusCode::UNAUTHORIZED => Err(Error::Authentication {
            message: message.unwrap_or_else(|| "missing or invalid access token".into()),
        }),
        reqwest::StatusCode::FORBIDDEN => Err(Error::Forbidden {
            message: message.unwrap_or_else(|| "admin privileges required".into()),
        }),
        _ => Err(Error::Http {
            status: status.as_u16(),
            message,
        }),
    }
}

fn preview(body: &str) -> &str {
    let mut end = body.len().min(200);
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    &body[..end]
}
