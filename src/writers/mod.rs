pub mod geojson_writer;
pub mod jsonl_writer;

pub use geojson_writer::GeoJsonWriter;
pub use jsonl_writer::{preview, write_atomic, JsonLinesWriter};
