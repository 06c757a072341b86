use std::path::PathBuf;

/// A checkpoint that could not be aggregated; recorded and skipped
#[derive(Debug, Clone, PartialEq)]
pub struct AggregationFailure {
    pub path: PathBuf,
    pub reason: String,
    /// Leading lines of the file, for diagnosis
    pub preview: String,
}

impl std::fmt::Display for AggregationFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path.display(), self.reason)
    }
}

/// Counters collected over one aggregation run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregationReport {
    pub documents: usize,
    pub checkpoints_written: usize,
    pub checkpoints_reused: usize,
    pub readings_kept: usize,
    pub readings_dropped: usize,
    pub rows_written: usize,
    pub threshold_days: u64,
    pub failures: Vec<AggregationFailure>,
    pub temp_files_removed: usize,
}

impl AggregationReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn summary(&self) -> String {
        let mut summary = String::new();

        summary.push_str("Aggregation Report\n");
        summary.push_str("==================\n");
        summary.push_str(&format!("Raw documents: {}\n", self.documents));
        summary.push_str(&format!(
            "Checkpoints: {} written, {} reused\n",
            self.checkpoints_written, self.checkpoints_reused
        ));
        summary.push_str(&format!(
            "Readings: {} kept, {} dropped\n",
            self.readings_kept, self.readings_dropped
        ));
        summary.push_str(&format!("Station-years written: {}\n", self.rows_written));
        summary.push_str(&format!("Threshold days: {}\n", self.threshold_days));
        summary.push_str(&format!("Temp files removed: {}\n", self.temp_files_removed));

        if self.failures.is_empty() {
            summary.push_str("Failures: none\n");
        } else {
            summary.push_str(&format!("Failures: {}\n", self.failures.len()));
            for failure in &self.failures {
                summary.push_str(&format!("  - {}\n", failure));
            }
        }

        summary
    }
}
