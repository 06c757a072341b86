pub mod client;
pub mod fetcher;
pub mod listing;

pub use client::DwdClient;
pub use fetcher::{FetchSummary, Fetcher};
pub use listing::{parse_archive_listing, StationArchive};

use serde::{Deserialize, Serialize};

/// Temperature parameters of the daily climate summary (`kl`) product
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClimateParameter {
    TemperatureAirMax2m,
    TemperatureAirMean2m,
    TemperatureAirMin2m,
    TemperatureAirMin005m,
}

impl ClimateParameter {
    pub const ALL: [ClimateParameter; 4] = [
        ClimateParameter::TemperatureAirMax2m,
        ClimateParameter::TemperatureAirMean2m,
        ClimateParameter::TemperatureAirMin2m,
        ClimateParameter::TemperatureAirMin005m,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.name() == name)
    }

    pub fn from_column(column: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.column() == column)
    }

    /// Name used in the raw document
    pub fn name(&self) -> &'static str {
        match self {
            ClimateParameter::TemperatureAirMax2m => "temperature_air_max_2m",
            ClimateParameter::TemperatureAirMean2m => "temperature_air_mean_2m",
            ClimateParameter::TemperatureAirMin2m => "temperature_air_min_2m",
            ClimateParameter::TemperatureAirMin005m => "temperature_air_min_0_05m",
        }
    }

    /// Column in the DWD product file
    pub fn column(&self) -> &'static str {
        match self {
            ClimateParameter::TemperatureAirMax2m => "TXK",
            ClimateParameter::TemperatureAirMean2m => "TMK",
            ClimateParameter::TemperatureAirMin2m => "TNK",
            ClimateParameter::TemperatureAirMin005m => "TGK",
        }
    }

    /// Quality column covering this parameter
    pub fn quality_column(&self) -> &'static str {
        "QN_4"
    }
}

impl std::fmt::Display for ClimateParameter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
