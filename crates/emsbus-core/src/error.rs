// ── Core error types ──
//
// User-facing errors from emsbus-core. Consumers never see reqwest
// errors or JSON parse failures directly; the `From<emsbus_api::Error>`
// impl translates transport-layer errors into domain variants.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot connect to gateway at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Gateway request timed out")]
    Timeout,

    // ── Authorization errors ─────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Permission denied: {message}")]
    PermissionDenied { message: String },

    // ── Gateway errors ───────────────────────────────────────────────
    #[error("Gateway returned HTTP {status}{}", detail(.message.as_deref()))]
    Api {
        status: u16,
        /// Message the gateway attached to the response, if any.
        message: Option<String>,
    },

    #[error("Unexpected response from gateway: {message}")]
    InvalidResponse { message: String },

    // ── Lifecycle errors ─────────────────────────────────────────────
    #[error("Status poller is already active for this view")]
    PollerAlreadyActive,

    #[error("Cannot {action} while the scan dialog is {state}")]
    InvalidScanTransition {
        action: &'static str,
        state: &'static str,
    },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },
}

fn detail(message: Option<&str>) -> String {
    message.map(|m| format!(": {m}")).unwrap_or_default()
}

impl CoreError {
    /// The gateway's own description of the failure, when it sent one.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Api { message, .. } => message.as_deref(),
            Self::AuthenticationFailed { message } | Self::PermissionDenied { message } => {
                Some(message)
            }
            _ => None,
        }
    }

    /// Returns `true` for failures of the request itself (network, timeout,
    /// gateway status) as opposed to local misuse or configuration.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::ConnectionFailed { .. }
                | Self::Timeout
                | Self::Api { .. }
                | Self::InvalidResponse { .. }
        )
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<emsbus_api::Error> for CoreError {
    fn from(err: emsbus_api::Error) -> Self {
        match err {
            emsbus_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            emsbus_api::Error::Forbidden { message } => CoreError::PermissionDenied { message },
            emsbus_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map_or_else(|| "<unknown>".into(), ToString::to_string),
                        reason: e.to_string(),
                    }
                } else if let Some(status) = e.status() {
                    CoreError::Api {
                        status: status.as_u16(),
                        message: None,
                    }
                } else {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map_or_else(|| "<unknown>".into(), ToString::to_string),
                        reason: e.to_string(),
                    }
                }
            }
            emsbus_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            emsbus_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            emsbus_api::Error::Http { status, message } => CoreError::Api { status, message },
            emsbus_api::Error::Deserialization { message, body: _ } => {
                CoreError::InvalidResponse { message }
            }
        }
    }
}
