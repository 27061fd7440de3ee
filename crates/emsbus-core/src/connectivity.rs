//! Bus connectivity classification: state → display label + severity.

use serde::Serialize;
use strum::{AsRefStr, Display};

use crate::model::ConnectionState;

/// Visual emphasis tier for a classified state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, AsRefStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Severity {
    Success,
    Warning,
    Error,
}

/// Display classification of a [`ConnectionState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Connectivity {
    pub label: &'static str,
    pub severity: Severity,
}

/// Classify a connection state. Total: unrecognized codes fall back to
/// `"Unknown"` at warning severity.
pub fn classify(state: ConnectionState) -> Connectivity {
    let (label, severity) = match state {
        ConnectionState::Connected => ("Connected", Severity::Success),
        ConnectionState::TxErrors => ("Tx issues - try a different Tx Mode", Severity::Warning),
        ConnectionState::Offline => ("Disconnected", Severity::Error),
        ConnectionState::Unknown(_) => ("Unknown", Severity::Warning),
    };
    Connectivity { label, severity }
}
