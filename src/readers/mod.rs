pub mod document_reader;
pub mod product_reader;
pub mod station_reader;

pub use document_reader::DocumentReader;
pub use product_reader::{ProductReader, ProductRecord};
pub use station_reader::StationReader;
