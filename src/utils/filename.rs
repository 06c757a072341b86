use crate::utils::constants::{
    CHECKPOINT_PREFIX, GEO_OUTPUT_FILE, RAW_DOCUMENT_EXTENSION, RAW_DOCUMENT_FILE, SUMMARY_FILE,
    TEMP_DIR,
};
use std::path::{Path, PathBuf};

/// Paths of every artifact the pipeline reads or writes under the data directory
#[derive(Debug, Clone)]
pub struct DataLayout {
    root: PathBuf,
}

impl DataLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn raw_document(&self) -> PathBuf {
        self.root.join(RAW_DOCUMENT_FILE)
    }

    pub fn temp_dir(&self) -> PathBuf {
        self.root.join(TEMP_DIR)
    }

    pub fn summary(&self) -> PathBuf {
        self.root.join(SUMMARY_FILE)
    }

    pub fn geo_output(&self) -> PathBuf {
        self.root.join(GEO_OUTPUT_FILE)
    }

    /// Checkpoint for a raw document: `all_stations_data.geojson` -> `temp/temp_all_stations_data.json`
    pub fn checkpoint_for(&self, raw_document: &Path) -> PathBuf {
        self.temp_dir().join(checkpoint_file_name(raw_document))
    }

    /// Whether a directory entry is a raw document the aggregator should read
    pub fn is_raw_document(&self, path: &Path) -> bool {
        let has_extension = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e == RAW_DOCUMENT_EXTENSION);
        let is_geo_output = path.file_name().and_then(|f| f.to_str()) == Some(GEO_OUTPUT_FILE);

        path.is_file() && has_extension && !is_geo_output
    }
}

/// Derive the checkpoint file name from a raw document path
pub fn checkpoint_file_name(raw_document: &Path) -> String {
    let stem = raw_document
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("document");

    format!("{}{}.json", CHECKPOINT_PREFIX, stem)
}
