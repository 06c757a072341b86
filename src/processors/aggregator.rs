use crate::error::{ProcessingError, Result};
use crate::models::{NormalizedReading, YearlySummary};
use crate::processors::normalizer::{CheckpointStatus, Normalizer};
use crate::processors::report::{AggregationFailure, AggregationReport};
use crate::processors::temp_manager::TempFileManager;
use crate::utils::constants::PREVIEW_LINES;
use crate::utils::{DataLayout, ProgressReporter};
use crate::writers::{preview, JsonLinesWriter};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Per-station-year counts of one checkpoint
pub type PartialSummary = Vec<YearlySummary>;

/// Second pipeline stage: raw documents to the yearly summary table
pub struct Aggregator {
    layout: DataLayout,
    threshold: f64,
    keep_temp: bool,
    silent: bool,
}

impl Aggregator {
    pub fn new(layout: DataLayout, threshold: f64) -> Self {
        Self {
            layout,
            threshold,
            keep_temp: false,
            silent: false,
        }
    }

    pub fn with_keep_temp(mut self, keep_temp: bool) -> Self {
        self.keep_temp = keep_temp;
        self
    }

    pub fn with_silent(mut self, silent: bool) -> Self {
        self.silent = silent;
        self
    }

    /// Raw documents in the data directory, sorted by name
    pub fn discover_documents(&self) -> Result<Vec<PathBuf>> {
        let root = self.layout.root();
        if !root.is_dir() {
            return Err(ProcessingError::MissingData(format!(
                "Data directory {} does not exist",
                root.display()
            )));
        }

        let mut documents = Vec::new();
        for entry in fs::read_dir(root)? {
            let path = entry?.path();
            if self.layout.is_raw_document(&path) {
                documents.push(path);
            }
        }
        documents.sort();

        Ok(documents)
    }

    pub fn run(&self) -> Result<AggregationReport> {
        let documents = self.discover_documents()?;
        if documents.is_empty() {
            return Err(ProcessingError::MissingData(format!(
                "No raw documents found in {}",
                self.layout.root().display()
            )));
        }

        let mut report = AggregationReport {
            documents: documents.len(),
            ..Default::default()
        };

        let temp = TempFileManager::new(&self.layout);
        temp.ensure_dir()?;

        let normalizer = Normalizer::new();
        let progress =
            ProgressReporter::new(documents.len() as u64, "Normalizing documents", self.silent);
        let mut checkpoints = Vec::with_capacity(documents.len());

        for document in &documents {
            let checkpoint = temp.checkpoint_for(document);
            match normalizer.checkpoint(document, &checkpoint)? {
                CheckpointStatus::Written { kept, dropped } => {
                    report.checkpoints_written += 1;
                    report.readings_kept += kept;
                    report.readings_dropped += dropped;
                }
                CheckpointStatus::Reused => {
                    info!("Resuming from existing checkpoint {}", checkpoint.display());
                    report.checkpoints_reused += 1;
                }
            }
            checkpoints.push(checkpoint);
            progress.increment(1);
        }
        progress.finish_with_message("Normalization complete");

        let progress =
            ProgressReporter::new(checkpoints.len() as u64, "Counting threshold days", self.silent);
        let (summaries, failures) = fold_checkpoints(&checkpoints, self.threshold, &progress);
        progress.finish_with_message("Aggregation complete");
        for failure in &failures {
            warn!(
                "Skipping {}: {}\nFirst lines:\n{}",
                failure.path.display(),
                failure.reason,
                failure.preview
            );
        }

        report.rows_written = summaries.len();
        report.threshold_days = summaries.iter().map(|s| u64::from(s.n_days)).sum();
        report.failures = failures;

        JsonLinesWriter::new().write_records(&summaries, &self.layout.summary())?;
        info!(
            "Wrote {} station-years to {}",
            summaries.len(),
            self.layout.summary().display()
        );

        if self.keep_temp {
            debug!("Keeping checkpoints in {}", temp.temp_dir_path().display());
        } else {
            report.temp_files_removed = temp.cleanup()?;
        }

        Ok(report)
    }
}

/// Aggregate checkpoints in order, collecting failures instead of stopping.
///
/// Partial results are concatenated as-is: a station-year present in two
/// checkpoints yields two rows.
pub fn fold_checkpoints(
    checkpoints: &[PathBuf],
    threshold: f64,
    progress: &ProgressReporter,
) -> (Vec<YearlySummary>, Vec<AggregationFailure>) {
    checkpoints.iter().fold(
        (Vec::new(), Vec::new()),
        |(mut summaries, mut failures), path| {
            match aggregate_checkpoint(path, threshold) {
                Ok(partial) => summaries.extend(partial),
                Err(failure) => failures.push(failure),
            }
            progress.increment(1);
            (summaries, failures)
        },
    )
}

/// Count threshold days per (station, year) in one checkpoint file
pub fn aggregate_checkpoint(
    path: &Path,
    threshold: f64,
) -> std::result::Result<PartialSummary, AggregationFailure> {
    let fail = |reason: String| AggregationFailure {
        path: path.to_path_buf(),
        reason,
        preview: preview(path, PREVIEW_LINES),
    };

    let readings = read_checkpoint(path).map_err(|e| fail(e.to_string()))?;
    Ok(group_by_station_year(&readings, threshold))
}

fn read_checkpoint(path: &Path) -> Result<Vec<NormalizedReading>> {
    let reader = BufReader::new(File::open(path)?);
    let mut columns = BTreeSet::new();
    let mut readings = Vec::new();

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let row: Value = serde_json::from_str(&line).map_err(|e| {
            ProcessingError::InvalidFormat(format!("line {}: {}", index + 1, e))
        })?;
        if let Value::Object(fields) = &row {
            columns.extend(fields.keys().cloned());
        }

        let reading = serde_json::from_value(row).map_err(|e| {
            ProcessingError::InvalidFormat(format!("line {}: {}", index + 1, e))
        })?;
        readings.push(reading);
    }

    info!(
        "{} columns: {}",
        path.display(),
        columns.into_iter().collect::<Vec<_>>().join(", ")
    );

    Ok(readings)
}

/// Group readings by (station id, year) in key order.
///
/// Geometry, name and state come from the first reading of each group.
pub fn group_by_station_year(readings: &[NormalizedReading], threshold: f64) -> PartialSummary {
    let mut groups: BTreeMap<(&str, i32), YearlySummary> = BTreeMap::new();

    for reading in readings {
        let entry = groups
            .entry((reading.id.as_str(), reading.year))
            .or_insert_with(|| YearlySummary {
                station_id: reading.id.clone(),
                year: reading.year,
                n_days: 0,
                geometry: reading.geometry.clone(),
                name: reading.name.clone(),
                state: reading.state.clone(),
            });

        if reading.value >= threshold {
            entry.n_days += 1;
        }
    }

    groups.into_values().collect()
}
