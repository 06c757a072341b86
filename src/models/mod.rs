pub mod document;
pub mod reading;
pub mod station;
pub mod summary;

pub use document::{DocumentMetadata, RawDocument, RequestInfo, StationCollection, StationFeature};
pub use reading::{FlatReading, NormalizedReading, RawReading};
pub use station::{StationMetadata, StationProperties};
pub use summary::YearlySummary;
