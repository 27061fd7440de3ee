//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors
//! with actionable help text and stable exit codes.

use miette::Diagnostic;
use thiserror::Error;

use emsbus_config::ConfigError;
use emsbus_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const PERMISSION: i32 = 5;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to gateway at {url}")]
    #[diagnostic(
        code(emsbus::connection_failed),
        help(
            "Check that the gateway is powered and reachable.\n\
             Try: emsbus status --gateway <host> --insecure"
        )
    )]
    ConnectionFailed {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Gateway request timed out")]
    #[diagnostic(
        code(emsbus::timeout),
        help("Increase the timeout with --timeout or check the gateway's load.")
    )]
    Timeout,

    // ── Authorization ────────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(emsbus::auth_failed),
        help(
            "Check the access token for this profile.\n\
             Store a new one with: emsbus config init"
        )
    )]
    AuthFailed { message: String },

    #[error("Permission denied: {message}")]
    #[diagnostic(
        code(emsbus::permission_denied),
        help("This action needs a token belonging to an admin user (--token or profile token).")
    )]
    PermissionDenied { message: String },

    // ── Gateway ──────────────────────────────────────────────────────
    #[error("{message} (HTTP {status})")]
    #[diagnostic(code(emsbus::gateway_error))]
    Gateway { status: u16, message: String },

    #[error("Unexpected response from gateway: {message}")]
    #[diagnostic(
        code(emsbus::invalid_response),
        help("The gateway firmware may be incompatible. Re-run with -vv for details.")
    )]
    InvalidResponse { message: String },

    #[error("Device scan failed: {message}")]
    #[diagnostic(code(emsbus::scan_failed))]
    ScanFailed { message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(emsbus::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(emsbus::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: emsbus config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No gateway configured")]
    #[diagnostic(
        code(emsbus::no_config),
        help(
            "Pass --gateway <host>, set EMSBUS_GATEWAY, or create a profile with: emsbus config init\n\
             Config file expected at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(emsbus::config))]
    Config(Box<ConfigError>),

    // ── Interactive ──────────────────────────────────────────────────
    #[error("'{action}' requires confirmation")]
    #[diagnostic(
        code(emsbus::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    #[error("{message}")]
    #[diagnostic(code(emsbus::internal))]
    Internal { message: String },

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Cannot render JSON output: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Cannot render YAML output: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout => exit_code::TIMEOUT,
            Self::AuthFailed { .. } => exit_code::AUTH,
            Self::PermissionDenied { .. } => exit_code::PERMISSION,
            Self::Validation { .. } | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => CliError::ConnectionFailed {
                url,
                source: reason.into(),
            },
            CoreError::Timeout => CliError::Timeout,
            CoreError::AuthenticationFailed { message } => CliError::AuthFailed { message },
            CoreError::PermissionDenied { message } => CliError::PermissionDenied { message },
            CoreError::Api { status, message } => {
                let message = emsbus_core::extract_message(
                    &CoreError::Api { status, message },
                    emsbus_core::DEFAULT_POLL_MESSAGE,
                );
                CliError::Gateway { status, message }
            }
            CoreError::InvalidResponse { message } => CliError::InvalidResponse { message },
            CoreError::Config { message } => CliError::Validation {
                field: "config".into(),
                reason: message,
            },
            other @ (CoreError::PollerAlreadyActive | CoreError::InvalidScanTransition { .. }) => {
                CliError::Internal {
                    message: other.to_string(),
                }
            }
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::Io(e) => CliError::Io(e),
            other => CliError::Config(Box::new(other)),
        }
    }
}
