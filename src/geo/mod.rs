//! Coordinate reference systems and geometry reprojection.

pub mod crs;
pub mod reproject;
pub mod table;

pub use crs::Crs;
pub use reproject::Reprojector;
pub use table::{parse_geometry, GeoRecord, GeoTable};
