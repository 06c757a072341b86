use crate::error::Result;
use crate::models::{FlatReading, RawDocument};
use crate::utils::constants::DEFAULT_BUFFER_SIZE;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::debug;

/// Reader that flattens a raw station document into one record per reading
pub struct DocumentReader;

impl DocumentReader {
    pub fn new() -> Self {
        Self
    }

    pub fn read_document(&self, path: &Path) -> Result<RawDocument> {
        let file = File::open(path)?;
        let reader = BufReader::with_capacity(DEFAULT_BUFFER_SIZE, file);
        Ok(serde_json::from_reader(reader)?)
    }

    /// Read a document and flatten it
    pub fn read_flat(&self, path: &Path) -> Result<Vec<FlatReading>> {
        let document = self.read_document(path)?;
        debug!(
            "{}: {} stations, {} readings",
            path.display(),
            document.data.features.len(),
            document.reading_count()
        );
        self.flatten(document)
    }

    /// Join every reading with its station's properties and serialized geometry
    pub fn flatten(&self, document: RawDocument) -> Result<Vec<FlatReading>> {
        let mut records = Vec::with_capacity(document.reading_count());

        for feature in document.data.features {
            let geometry = serde_json::to_string(&feature.geometry)?;
            let properties = feature.properties;

            for reading in feature.values {
                records.push(FlatReading {
                    id: properties.id.clone(),
                    geometry: geometry.clone(),
                    name: properties.name.clone(),
                    state: properties.state.clone(),
                    start_date: properties.start_date.clone(),
                    end_date: properties.end_date.clone(),
                    date: reading.date,
                    value: reading.value,
                });
            }
        }

        Ok(records)
    }
}

impl Default for DocumentReader {
    fn default() -> Self {
        Self::new()
    }
}
