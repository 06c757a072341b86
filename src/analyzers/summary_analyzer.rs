use crate::error::{ProcessingError, Result};
use crate::models::YearlySummary;
use crate::utils::constants::{RAW_DOCUMENT_EXTENSION, STATION_ID_COLUMN};
use crate::writers::JsonLinesWriter;
use serde_json::Value;
use std::collections::HashSet;
use std::path::Path;

#[derive(Debug)]
pub struct SummaryStatistics {
    pub total_rows: usize,
    pub unique_stations: usize,
    pub year_range: Option<(i32, i32)>,
    pub total_days: u64,
    pub rows_with_days: usize,
    pub hottest: Option<YearlySummary>,
    pub sample: Vec<YearlySummary>,
}

/// Descriptive statistics over a yearly summary or the projected GeoJSON layer
pub struct SummaryAnalyzer;

impl SummaryAnalyzer {
    pub fn new() -> Self {
        Self
    }

    pub fn analyze_file(&self, path: &Path, sample: usize) -> Result<SummaryStatistics> {
        let is_geojson = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e == RAW_DOCUMENT_EXTENSION);

        let rows = if is_geojson {
            read_geojson_rows(path)?
        } else {
            JsonLinesWriter::new().read_records(path)?
        };

        Ok(self.analyze(&rows, sample))
    }

    pub fn analyze(&self, rows: &[YearlySummary], sample: usize) -> SummaryStatistics {
        let stations: HashSet<&str> = rows.iter().map(|r| r.station_id.as_str()).collect();

        let year_range = rows.iter().map(|r| r.year).min().zip(rows.iter().map(|r| r.year).max());

        // First row wins ties so the result is stable across runs
        let hottest = rows
            .iter()
            .filter(|r| r.n_days > 0)
            .fold(None::<&YearlySummary>, |best, row| match best {
                Some(b) if b.n_days >= row.n_days => Some(b),
                _ => Some(row),
            })
            .cloned();

        SummaryStatistics {
            total_rows: rows.len(),
            unique_stations: stations.len(),
            year_range,
            total_days: rows.iter().map(|r| u64::from(r.n_days)).sum(),
            rows_with_days: rows.iter().filter(|r| r.n_days > 0).count(),
            hottest,
            sample: rows.iter().take(sample).cloned().collect(),
        }
    }
}

impl Default for SummaryAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

fn read_geojson_rows(path: &Path) -> Result<Vec<YearlySummary>> {
    let collection: Value = serde_json::from_str(&std::fs::read_to_string(path)?)?;
    let features = collection["features"].as_array().ok_or_else(|| {
        ProcessingError::InvalidFormat(format!("{} has no features array", path.display()))
    })?;

    features
        .iter()
        .map(|feature| {
            let properties = &feature["properties"];
            let text = |key: &str| -> Result<String> {
                match &properties[key] {
                    Value::String(s) => Ok(s.clone()),
                    Value::Number(n) => Ok(n.to_string()),
                    _ => Err(ProcessingError::InvalidFormat(format!(
                        "feature without '{}' property",
                        key
                    ))),
                }
            };

            Ok(YearlySummary {
                station_id: text(STATION_ID_COLUMN)?,
                year: properties["year"].as_i64().unwrap_or_default() as i32,
                n_days: properties["n_days"].as_u64().unwrap_or_default() as u32,
                geometry: feature["geometry"].to_string(),
                name: text("name")?,
                state: text("state")?,
            })
        })
        .collect()
}

impl SummaryStatistics {
    pub fn summary(&self) -> String {
        let years = match self.year_range {
            Some((first, last)) => format!("{} to {}", first, last),
            None => "none".to_string(),
        };

        let hottest = match &self.hottest {
            Some(row) => format!(
                "{} ({}, {}) in {}: {} days",
                row.name, row.station_id, row.state, row.year, row.n_days
            ),
            None => "No threshold days recorded".to_string(),
        };

        format!(
            "Station-years: {}\n\
            Stations: {}\n\
            Years: {}\n\
            Threshold days: {} total, in {} station-years\n\
            Most threshold days: {}",
            self.total_rows,
            self.unique_stations,
            years,
            self.total_days,
            self.rows_with_days,
            hottest
        )
    }

    pub fn sample_table(&self) -> String {
        let mut table = format!(
            "{:<12} {:>6} {:>7}  {:<30} {}\n",
            STATION_ID_COLUMN, "year", "n_days", "name", "state"
        );
        for row in &self.sample {
            table.push_str(&format!(
                "{:<12} {:>6} {:>7}  {:<30} {}\n",
                row.station_id, row.year, row.n_days, row.name, row.state
            ));
        }
        table
    }
}
