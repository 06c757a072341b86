pub mod aggregator;
pub mod geo_joiner;
pub mod normalizer;
pub mod report;
pub mod temp_manager;

pub use aggregator::{fold_checkpoints, group_by_station_year, Aggregator};
pub use geo_joiner::{GeoJoinSummary, GeoJoiner};
pub use normalizer::{normalize_readings, CheckpointStatus, Normalizer};
pub use report::{AggregationFailure, AggregationReport};
pub use temp_manager::TempFileManager;
