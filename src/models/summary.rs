use serde::{Deserialize, Serialize};

/// Threshold-day count for one station in one year
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearlySummary {
    #[serde(rename = "Stations_id")]
    pub station_id: String,

    pub year: i32,

    #[serde(default)]
    pub n_days: u32,

    /// GeoJSON geometry serialized as a string
    pub geometry: String,

    pub name: String,

    pub state: String,
}
