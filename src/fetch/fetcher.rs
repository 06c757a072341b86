use crate::config::FetchConfig;
use crate::error::{ProcessingError, Result};
use crate::fetch::listing::StationArchive;
use crate::fetch::{ClimateParameter, DwdClient};
use crate::models::reading::celsius_to_kelvin;
use crate::models::station::format_midnight_utc;
use crate::models::{
    DocumentMetadata, RawDocument, RawReading, RequestInfo, StationFeature, StationMetadata,
};
use crate::readers::{ProductReader, ProductRecord};
use crate::utils::constants::{DATASET, PERIOD, RESOLUTION};
use crate::utils::ProgressReporter;
use crate::writers::write_atomic;
use chrono::NaiveDate;
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Outcome of one fetch run
#[derive(Debug, Clone, PartialEq)]
pub struct FetchSummary {
    pub stations_listed: usize,
    pub stations_selected: usize,
    pub stations_written: usize,
    pub readings: usize,
    pub output: PathBuf,
}

impl FetchSummary {
    pub fn report(&self) -> String {
        format!(
            "Fetch complete: {} stations written ({} selected of {} listed), {} readings -> {}",
            self.stations_written,
            self.stations_selected,
            self.stations_listed,
            self.readings,
            self.output.display()
        )
    }
}

/// Downloads daily climate data for all stations and writes the raw document
pub struct Fetcher {
    client: DwdClient,
    parameters: Vec<ClimateParameter>,
    start: NaiveDate,
    end: NaiveDate,
    max_stations: Option<usize>,
    threshold: f64,
}

impl Fetcher {
    pub fn new(config: &FetchConfig, threshold: f64) -> Result<Self> {
        let (start, end) = config.date_range()?;
        Ok(Self {
            client: DwdClient::new(&config.base_url, &config.user_agent)?,
            parameters: config.climate_parameters()?,
            start,
            end,
            max_stations: config.max_stations,
            threshold,
        })
    }

    /// Fetch every station with data in the requested period into `output`
    pub async fn run(&self, output: &Path) -> Result<FetchSummary> {
        info!(
            "Requesting {} from {} ({} to {})",
            self.parameter_names().join(", "),
            self.client.base_url(),
            self.start,
            self.end
        );

        let spinner = ProgressReporter::new_spinner("Fetching station index", false);
        let stations = self.client.fetch_stations().await?;
        let archives = self.client.fetch_archive_index().await?;
        spinner.finish_with_message("Station index loaded");
        let stations_listed = stations.len();
        info!(
            "{} stations described, {} archives listed",
            stations_listed,
            archives.len()
        );

        let selected = select_stations(stations, archives, self.start, self.end, self.max_stations);
        let reader = ProductReader::new(self.parameters.clone());
        let progress = ProgressReporter::new(selected.len() as u64, "Downloading stations", false);

        let mut features = Vec::with_capacity(selected.len());

        for (station, archive) in &selected {
            progress.set_message(&format!("{} {}", station.id, station.name));

            let bytes = self.client.fetch_archive(archive).await?;
            let records = reader.read_archive(&bytes).map_err(|e| {
                ProcessingError::Provider(format!("{}: {}", archive.file_name, e))
            })?;
            debug!("{}: {} product rows", archive.file_name, records.len());

            features.push(build_feature(
                station,
                &records,
                &self.parameters,
                self.start,
                self.end,
            ));
            progress.increment(1);
        }

        let document = RawDocument::new(Some(DocumentMetadata::dwd(self.request_info())), features)?;
        let readings = document.reading_count();

        write_atomic(output, |writer| {
            serde_json::to_writer(&mut *writer, &document)?;
            Ok(())
        })?;

        progress.finish_with_message("Download complete");

        let summary = FetchSummary {
            stations_listed,
            stations_selected: selected.len(),
            stations_written: document.data.features.len(),
            readings,
            output: output.to_path_buf(),
        };
        info!("{}", summary.report());

        Ok(summary)
    }

    fn parameter_names(&self) -> Vec<String> {
        self.parameters.iter().map(|p| p.name().to_string()).collect()
    }

    fn request_info(&self) -> RequestInfo {
        RequestInfo {
            dataset: DATASET.to_string(),
            resolution: RESOLUTION.to_string(),
            period: PERIOD.to_string(),
            parameters: self.parameter_names(),
            start_date: self.start.format("%Y-%m-%d").to_string(),
            end_date: self.end.format("%Y-%m-%d").to_string(),
            temperature_threshold: self.threshold,
        }
    }
}

/// Pair described stations with their archive, keeping those active in `[start, end]`.
///
/// Output follows station id order; `max_stations` caps the result.
pub fn select_stations(
    stations: Vec<StationMetadata>,
    archives: Vec<StationArchive>,
    start: NaiveDate,
    end: NaiveDate,
    max_stations: Option<usize>,
) -> Vec<(StationMetadata, StationArchive)> {
    let mut by_id: HashMap<String, StationArchive> = HashMap::new();
    for archive in archives {
        by_id.entry(archive.station_id.clone()).or_insert(archive);
    }

    let mut selected: Vec<_> = stations
        .into_iter()
        .filter(|s| s.overlaps(start, end))
        .filter_map(|s| by_id.remove(&s.id).map(|a| (s, a)))
        .collect();

    selected.sort_by(|a, b| a.0.id.cmp(&b.0.id));
    if let Some(limit) = max_stations {
        selected.truncate(limit);
    }

    selected
}

/// Build a station feature from its parsed product rows.
///
/// Rows outside `[start, end]` are dropped. Values are stored in Kelvin;
/// missing values become `null`.
pub fn build_feature(
    station: &StationMetadata,
    records: &[ProductRecord],
    parameters: &[ClimateParameter],
    start: NaiveDate,
    end: NaiveDate,
) -> StationFeature {
    let mut values = Vec::new();

    for record in records.iter().filter(|r| r.date >= start && r.date <= end) {
        let date = format_midnight_utc(record.date);

        for (parameter, celsius) in &record.values {
            if !parameters.contains(parameter) {
                continue;
            }

            values.push(RawReading {
                station_id: Some(station.id.clone()),
                dataset: Some(DATASET.to_string()),
                parameter: Some(parameter.name().to_string()),
                date: date.clone(),
                value: kelvin_value(*celsius),
                quality: record.quality,
            });
        }
    }

    StationFeature::new(station.to_properties(), station.geometry(), values)
}

fn kelvin_value(celsius: Option<f64>) -> Value {
    celsius
        .map(|c| (celsius_to_kelvin(c) * 100.0).round() / 100.0)
        .and_then(serde_json::Number::from_f64)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}
