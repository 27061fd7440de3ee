// Wire types for the gateway REST API.
//
// Field names follow the gateway's JSON exactly; conversion into the
// canonical domain model happens in `emsbus-core`.

use serde::{Deserialize, Serialize};

/// Raw bus status code as reported by `GET /rest/status`.
pub mod bus_code {
    pub const CONNECTED: i64 = 0;
    pub const TX_ERRORS: i64 = 1;
    pub const OFFLINE: i64 = 2;
}

/// Payload of `GET /rest/status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusResponse {
    /// Bus connection state code; see [`bus_code`]. Anything else is unknown.
    pub status: i64,
    /// Bus uptime in seconds.
    #[serde(default)]
    pub uptime: u64,
    #[serde(default)]
    pub num_devices: u32,
    #[serde(default)]
    pub num_sensors: u32,
    #[serde(default)]
    pub num_analogs: u32,
    #[serde(default)]
    pub stats: Vec<StatEntry>,
}

/// One row of per-entity telegram statistics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatEntry {
    pub id: String,
    /// Successful telegrams.
    #[serde(rename = "s", default)]
    pub success: u64,
    /// Failed telegrams.
    #[serde(rename = "f", default)]
    pub fail: u64,
    /// Quality percentage. Nominally 0-100; firmware glitches outside
    /// that range are clamped by consumers.
    #[serde(rename = "q", default)]
    pub quality: i64,
}

/// Payload of `GET /rest/verifyAuthorization`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityResponse {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub admin: bool,
}

/// Error body some gateway endpoints return alongside a non-2xx status.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_decodes_short_stat_keys() {
        let raw = r#"{
            "status": 1,
            "uptime": 3661,
            "num_devices": 5,
            "num_sensors": 2,
            "num_analogs": 0,
            "stats": [{ "id": "Boiler", "s": 998, "f": 2, "q": 99 }]
        }"#;
        let status: StatusResponse = serde_json::from_str(raw).expect("valid payload");
        assert_eq!(status.status, bus_code::TX_ERRORS);
        assert_eq!(status.stats.len(), 1);
        assert_eq!(status.stats[0].success, 998);
        assert_eq!(status.stats[0].fail, 2);
        assert_eq!(status.stats[0].quality, 99);
    }

    #[test]
    fn out_of_range_quality_still_decodes() {
        let raw = r#"{ "status": 0, "stats": [{ "id": "Mixer", "s": 1, "f": 0, "q": 300 }] }"#;
        let status: StatusResponse = serde_json::from_str(raw).expect("payload decodes");
        assert_eq!(status.stats[0].quality, 300);
    }

    #[test]
    fn missing_counters_default_to_zero() {
        let status: StatusResponse =
            serde_json::from_str(r#"{ "status": 2 }"#).expect("minimal payload");
        assert_eq!(status.uptime, 0);
        assert_eq!(status.num_devices, 0);
        assert!(status.stats.is_empty());
    }
}
