use crate::error::{ProcessingError, Result};
use crate::models::StationMetadata;
use chrono::NaiveDate;
use encoding_rs::WINDOWS_1252;

/// Reader for the DWD station description file (`KL_Tageswerte_Beschreibung_Stationen.txt`)
pub struct StationReader {
    skip_headers: bool,
}

impl StationReader {
    pub fn new() -> Self {
        Self { skip_headers: true }
    }

    /// Parse the Latin-1 encoded file body as served by the provider
    pub fn parse_bytes(&self, bytes: &[u8]) -> Result<Vec<StationMetadata>> {
        let (text, _, had_errors) = WINDOWS_1252.decode(bytes);
        if had_errors {
            tracing::warn!("Station description contained undecodable bytes");
        }
        self.parse_str(&text)
    }

    pub fn parse_str(&self, text: &str) -> Result<Vec<StationMetadata>> {
        let mut stations = Vec::new();

        for line in text.lines() {
            // Skip empty lines
            if line.trim().is_empty() {
                continue;
            }

            // Header and dashed separator lines do not start with a station id
            if self.skip_headers
                && !line
                    .trim_start()
                    .chars()
                    .next()
                    .unwrap_or(' ')
                    .is_ascii_digit()
            {
                continue;
            }

            if let Some(station) = self.parse_station_line(line)? {
                stations.push(station);
            }
        }

        Ok(stations)
    }

    /// Parse a single line from the station description file
    fn parse_station_line(&self, line: &str) -> Result<Option<StationMetadata>> {
        // Expected format: Stations_id von_datum bis_datum Stationshoehe geoBreite geoLaenge Stationsname Bundesland [Abgabe]
        let mut parts: Vec<&str> = line.split_whitespace().collect();

        if parts.len() < 8 {
            return Ok(None); // Skip malformed lines
        }

        // Newer files carry a trailing data-release column
        if parts.len() >= 9 && matches!(*parts.last().unwrap_or(&""), "Frei" | "Nein") {
            parts.pop();
        }

        let id = parts[0].to_string();
        let start_date = parse_compact_date(parts[1])?;
        let end_date = parse_compact_date(parts[2])?;
        let height = parse_number(parts[3], "station height")?;
        let latitude = parse_number(parts[4], "latitude")?;
        let longitude = parse_number(parts[5], "longitude")?;

        let state = parts[parts.len() - 1].to_string();
        let name = parts[6..parts.len() - 1].join(" ");

        Ok(Some(StationMetadata {
            id,
            start_date,
            end_date,
            height,
            latitude,
            longitude,
            name,
            state,
        }))
    }
}

impl Default for StationReader {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse `YYYYMMDD`
pub fn parse_compact_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y%m%d")
        .map_err(|_| ProcessingError::InvalidFormat(format!("Invalid date: '{}'", value)))
}

fn parse_number(value: &str, field: &str) -> Result<f64> {
    value
        .trim()
        .parse::<f64>()
        .map_err(|_| ProcessingError::InvalidFormat(format!("Invalid {}: '{}'", field, value)))
}
