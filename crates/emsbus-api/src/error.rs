use thiserror::Error;

/// Top-level error type for the `emsbus-api` crate.
///
/// Covers every failure mode of the gateway REST surface: transport,
/// authorization, HTTP status errors, and payload decoding.
/// `emsbus-core` maps these into user-facing diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authorization ───────────────────────────────────────────────
    /// The gateway rejected the access token (HTTP 401).
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// The token is valid but lacks the admin capability (HTTP 403).
    #[error("Insufficient permissions: {message}")]
    Forbidden { message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS handshake or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── HTTP ────────────────────────────────────────────────────────
    /// Non-success status from the gateway. `message` is the `message`
    /// field of a JSON error body, when the gateway sent one.
    #[error("HTTP {status}{}", .message.as_deref().map(|m| format!(": {m}")).unwrap_or_default())]
    Http { status: u16, message: Option<String> },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if this is a transient error worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Http { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Returns `true` if the access token was rejected or lacks privileges.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Authentication { .. } | Self::Forbidden { .. })
    }

    /// The message the gateway itself attached to the failure, if any.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Http { message, .. } => message.as_deref(),
            Self::Authentication { message } | Self::Forbidden { message } => Some(message),
            _ => None,
        }
    }

    /// HTTP status code, if the failure carried one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            Self::Http { status, .. } => Some(*status),
            Self::Authentication { .. } => Some(401),
            Self::Forbidden { .. } => Some(403),
            _ => None,
        }
    }
}
