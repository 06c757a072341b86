use crate::error::Result;
use crate::utils::DataLayout;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Owns the checkpoint directory (`{data_dir}/temp`) between aggregation runs.
///
/// Unlike a scratch `TempDir`, the directory outlives the process so an
/// interrupted run can resume from the checkpoints already written.
pub struct TempFileManager {
    layout: DataLayout,
    temp_dir: PathBuf,
}

impl TempFileManager {
    pub fn new(layout: &DataLayout) -> Self {
        Self {
            temp_dir: layout.temp_dir(),
            layout: layout.clone(),
        }
    }

    pub fn temp_dir_path(&self) -> &Path {
        &self.temp_dir
    }

    pub fn ensure_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.temp_dir)?;
        Ok(())
    }

    pub fn checkpoint_for(&self, raw_document: &Path) -> PathBuf {
        self.layout.checkpoint_for(raw_document)
    }

    /// Checkpoint files currently on disk, sorted by name
    pub fn list_checkpoints(&self) -> Result<Vec<PathBuf>> {
        if !self.temp_dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut files = Vec::new();
        for entry in fs::read_dir(&self.temp_dir)? {
            let path = entry?.path();
            if path.is_file() {
                files.push(path);
            }
        }
        files.sort();

        Ok(files)
    }

    /// Remove every checkpoint and the directory itself
    pub fn cleanup(&self) -> Result<usize> {
        if !self.temp_dir.exists() {
            return Ok(0);
        }

        let removed = self.list_checkpoints()?.len();
        fs::remove_dir_all(&self.temp_dir)?;
        debug!(
            "Removed {} checkpoint files and {}",
            removed,
            self.temp_dir.display()
        );

        Ok(removed)
    }
}
