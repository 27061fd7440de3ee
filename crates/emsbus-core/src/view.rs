//! Render-ready dashboard view, derived purely from poll state, the
//! caller's identity, and the scan controller's state.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::connectivity::{Connectivity, classify};
use crate::failure::Failure;
use crate::format::{device_summary, format_count, format_duration_sec};
use crate::model::{ConnectionState, Identity, Stat};
use crate::poller::PollState;
use crate::quality::{Quality, score_stat};
use crate::scan::{ScanState, can_request_scan};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum DashboardView {
    /// Nothing loaded yet. `error` is set once a poll has failed, which
    /// is when a retry is worth offering.
    Loading { error: Option<Failure> },
    Ready(StatusView),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusView {
    pub connection_state: ConnectionState,
    pub connectivity: Connectivity,
    pub connected: bool,
    /// Connectivity label with uptime, e.g. "Connected (2 hours 5 minutes)".
    pub status_line: String,
    pub uptime: String,
    pub summary: String,
    pub rows: Vec<StatRow>,
    /// Failure of the latest poll, shown over the retained snapshot.
    pub error: Option<Failure>,
    pub updated_at: Option<DateTime<Utc>>,
    pub scan_dialog_open: bool,
    pub can_scan: bool,
}

/// One row of the bus statistics table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatRow {
    pub id: String,
    pub success: String,
    pub fail: String,
    /// `None` when the row has no data at all; rendered blank.
    pub quality: Option<Quality>,
}

impl From<&Stat> for StatRow {
    fn from(stat: &Stat) -> Self {
        Self {
            id: stat.id.clone(),
            success: format_count(stat.success_count),
            fail: format_count(stat.fail_count),
            quality: score_stat(stat),
        }
    }
}

impl DashboardView {
    pub fn build(state: &PollState, identity: &Identity, scan: ScanState) -> Self {
        let Some(status) = state.snapshot.as_deref() else {
            return Self::Loading {
                error: state.error.clone(),
            };
        };

        let connectivity = classify(status.connection_state);
        let uptime = format_duration_sec(status.uptime_seconds);
        let status_line = if uptime.is_empty() {
            connectivity.label.to_owned()
        } else {
            format!("{} ({uptime})", connectivity.label)
        };

        Self::Ready(StatusView {
            connection_state: status.connection_state,
            connectivity,
            connected: status.connection_state.is_connected(),
            status_line,
            uptime,
            summary: device_summary(
                status.device_count,
                status.sensor_count,
                status.analog_sensor_count,
            ),
            rows: status.stats.iter().map(StatRow::from).collect(),
            error: state.error.clone(),
            updated_at: state.updated_at,
            scan_dialog_open: scan != ScanState::Idle,
            can_scan: can_request_scan(identity),
        })
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading { .. })
    }

    pub fn error(&self) -> Option<&Failure> {
        match self {
            Self::Loading { error } => error.as_ref(),
            Self::Ready(view) => view.error.as_ref(),
        }
    }
}
