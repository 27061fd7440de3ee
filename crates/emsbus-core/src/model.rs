// ── Bus domain types ──
//
// Canonical, immutable status snapshot. Built from the gateway's wire
// payload by `convert`, never mutated afterwards: every successful poll
// replaces the whole value.

use serde::{Deserialize, Serialize};

/// Bus connection state.
///
/// `Unknown` carries the raw code so unexpected firmware values stay
/// visible instead of being silently folded into a known state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    Connected,
    TxErrors,
    Offline,
    Unknown(i64),
}

impl ConnectionState {
    /// Everything except `Offline` counts as connected; `TxErrors` and
    /// `Unknown` are connected but degraded.
    pub fn is_connected(self) -> bool {
        !matches!(self, Self::Offline)
    }
}

/// Per-entity communication counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stat {
    /// Unique within a snapshot, stable across polls for the same entity.
    pub id: String,
    pub success_count: u64,
    pub fail_count: u64,
    /// 0-100. Only meaningful when `total_attempts() > 0`.
    pub quality_percent: u8,
}

impl Stat {
    pub fn total_attempts(&self) -> u64 {
        self.success_count.saturating_add(self.fail_count)
    }
}

/// One complete status snapshot as of a single poll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusStatus {
    pub connection_state: ConnectionState,
    pub uptime_seconds: u64,
    pub device_count: u32,
    pub sensor_count: u32,
    pub analog_sensor_count: u32,
    pub stats: Vec<Stat>,
}

/// The caller behind the configured access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub username: String,
    pub admin: bool,
}

impl Identity {
    /// A caller with no verified token: may read, may not scan.
    pub fn anonymous() -> Self {
        Self {
            username: String::new(),
            admin: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_offline_is_disconnected() {
        assert!(ConnectionState::Connected.is_connected());
        assert!(ConnectionState::TxErrors.is_connected());
        assert!(ConnectionState::Unknown(42).is_connected());
        assert!(!ConnectionState::Offline.is_connected());
    }

    #[test]
    fn total_attempts_saturates() {
        let stat = Stat {
            id: "x".into(),
            success_count: u64::MAX,
            fail_count: 1,
            quality_percent: 100,
        };
        assert_eq!(stat.total_attempts(), u64::MAX);
    }
}
