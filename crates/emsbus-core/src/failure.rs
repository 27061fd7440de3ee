//! Failure classification: any [`CoreError`] → a kind plus one
//! human-readable message, independent of the transport representation.

use serde::Serialize;

use crate::error::CoreError;

/// Message used when a poll fails without a more specific description.
pub const DEFAULT_POLL_MESSAGE: &str = "Problem loading bus status";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The request could not complete: network, timeout, gateway status,
    /// or an undecodable response.
    Transport,
    /// The gateway rejected the caller's token or privileges.
    Unauthorized,
    /// Local misuse or configuration; the request was never sent.
    Local,
}

/// A classified failure, ready to display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Failure {
    pub kind: FailureKind,
    pub message: String,
}

/// Classify `err`, falling back to `default_message` when the error
/// carries nothing more specific than a bare status code.
pub fn classify_failure(err: &CoreError, default_message: &str) -> Failure {
    let kind = match err {
        CoreError::AuthenticationFailed { .. } | CoreError::PermissionDenied { .. } => {
            FailureKind::Unauthorized
        }
        CoreError::ConnectionFailed { .. }
        | CoreError::Timeout
        | CoreError::Api { .. }
        | CoreError::InvalidResponse { .. } => FailureKind::Transport,
        CoreError::PollerAlreadyActive
        | CoreError::InvalidScanTransition { .. }
        | CoreError::Config { .. } => FailureKind::Local,
    };
    Failure {
        kind,
        message: extract_message(err, default_message),
    }
}

/// The most specific human message available for `err`.
///
/// Gateway-supplied messages win; a gateway error without one yields
/// `default_message`; every other error uses its own description.
pub fn extract_message(err: &CoreError, default_message: &str) -> String {
    if let Some(message) = err.server_message().filter(|m| !m.trim().is_empty()) {
        return message.to_owned();
    }
    match err {
        CoreError::Api { message: None, .. } => default_message.to_owned(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_message_wins() {
        let err = CoreError::Api {
            status: 500,
            message: Some("scan already running".into()),
        };
        let failure = classify_failure(&err, "Problem initiating scan");
        assert_eq!(failure.kind, FailureKind::Transport);
        assert_eq!(failure.message, "scan already running");
    }

    #[test]
    fn bare_status_falls_back_to_default() {
        let err = CoreError::Api {
            status: 500,
            message: None,
        };
        assert_eq!(
            extract_message(&err, "Problem initiating scan"),
            "Problem initiating scan"
        );
    }

    #[test]
    fn blank_server_message_falls_back_to_default() {
        let err = CoreError::Api {
            status: 502,
            message: Some("  ".into()),
        };
        assert_eq!(extract_message(&err, "fallback"), "fallback");
    }

    #[test]
    fn connection_failure_describes_itself() {
        let err = CoreError::ConnectionFailed {
            url: "http://ems-esp.local/rest/status".into(),
            reason: "connection refused".into(),
        };
        let failure = classify_failure(&err, DEFAULT_POLL_MESSAGE);
        assert_eq!(failure.kind, FailureKind::Transport);
        assert!(failure.message.contains("connection refused"));
    }

    #[test]
    fn permission_denied_is_unauthorized() {
        let err = CoreError::PermissionDenied {
            message: "admin privileges required".into(),
        };
        let failure = classify_failure(&err, "Problem initiating scan");
        assert_eq!(failure.kind, FailureKind::Unauthorized);
        assert_eq!(failure.message, "admin privileges required");
    }
}
