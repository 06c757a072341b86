use crate::error::Result;
use crate::models::{FlatReading, NormalizedReading};
use crate::readers::DocumentReader;
use crate::writers::JsonLinesWriter;
use std::path::Path;
use tracing::debug;

/// What happened to one raw document during normalization
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckpointStatus {
    /// A fresh checkpoint was written
    Written { kept: usize, dropped: usize },
    /// A checkpoint from an earlier run was found and reused as-is
    Reused,
}

/// Turns raw documents into sorted, Celsius-valued checkpoint files
pub struct Normalizer {
    reader: DocumentReader,
    writer: JsonLinesWriter,
}

impl Normalizer {
    pub fn new() -> Self {
        Self {
            reader: DocumentReader::new(),
            writer: JsonLinesWriter::new(),
        }
    }

    /// Normalize `raw_document` into `checkpoint` unless the checkpoint already exists
    pub fn checkpoint(&self, raw_document: &Path, checkpoint: &Path) -> Result<CheckpointStatus> {
        if checkpoint.is_file() {
            debug!(
                "Checkpoint {} exists, skipping {}",
                checkpoint.display(),
                raw_document.display()
            );
            return Ok(CheckpointStatus::Reused);
        }

        let flat = self.reader.read_flat(raw_document)?;
        let total = flat.len();
        let readings = normalize_readings(flat)?;
        let kept = readings.len();

        self.writer.write_records(&readings, checkpoint)?;
        debug!(
            "{}: kept {} of {} readings -> {}",
            raw_document.display(),
            kept,
            total,
            checkpoint.display()
        );

        Ok(CheckpointStatus::Written {
            kept,
            dropped: total - kept,
        })
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Normalize flat readings, drop unusable values, and order by (date, station id).
///
/// The sort is stable so equal keys keep document order.
pub fn normalize_readings(flat: Vec<FlatReading>) -> Result<Vec<NormalizedReading>> {
    let mut readings = Vec::with_capacity(flat.len());
    for record in flat {
        if let Some(reading) = record.normalize()? {
            readings.push(reading);
        }
    }

    readings.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.id.cmp(&b.id)));
    Ok(readings)
}
