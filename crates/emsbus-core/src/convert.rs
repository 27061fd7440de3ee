// ── Wire → domain conversions ──
//
// Translates `emsbus_api` payloads into canonical domain types. Out of
// range values are clamped here so the rest of the crate can rely on the
// model's invariants.

use emsbus_api::models::bus_code;
use emsbus_api::{IdentityResponse, StatEntry, StatusResponse};

use crate::model::{BusStatus, ConnectionState, Identity, Stat};

impl From<i64> for ConnectionState {
    fn from(code: i64) -> Self {
        match code {
            bus_code::CONNECTED => Self::Connected,
            bus_code::TX_ERRORS => Self::TxErrors,
            bus_code::OFFLINE => Self::Offline,
            other => Self::Unknown(other),
        }
    }
}

impl From<StatEntry> for Stat {
    fn from(entry: StatEntry) -> Self {
        Self {
            id: entry.id,
            success_count: entry.success,
            fail_count: entry.fail,
            quality_percent: u8::try_from(entry.quality.clamp(0, 100)).unwrap_or(0),
        }
    }
}

impl From<StatusResponse> for BusStatus {
    fn from(raw: StatusResponse) -> Self {
        Self {
            connection_state: ConnectionState::from(raw.status),
            uptime_seconds: raw.uptime,
            device_count: raw.num_devices,
            sensor_count: raw.num_sensors,
            analog_sensor_count: raw.num_analogs,
            stats: raw.stats.into_iter().map(Stat::from).collect(),
        }
    }
}

impl From<IdentityResponse> for Identity {
    fn from(raw: IdentityResponse) -> Self {
        Self {
            username: raw.username,
            admin: raw.admin,
        }
    }
}
