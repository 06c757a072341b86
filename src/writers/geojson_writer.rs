use crate::error::{ProcessingError, Result};
use crate::geo::{GeoRecord, GeoTable};
use crate::utils::constants::STATION_ID_COLUMN;
use crate::writers::jsonl_writer::write_atomic;
use geojson::{Feature, FeatureCollection, JsonObject, JsonValue};
use serde_json::json;
use std::path::Path;
use tracing::info;

/// Writer for the final per-station-year GeoJSON layer
pub struct GeoJsonWriter {
    layer_name: Option<String>,
}

impl GeoJsonWriter {
    pub fn new() -> Self {
        Self { layer_name: None }
    }

    pub fn with_layer_name(mut self, name: impl Into<String>) -> Self {
        self.layer_name = Some(name.into());
        self
    }

    pub fn write_table(&self, table: &GeoTable, path: &Path) -> Result<()> {
        let collection = self.to_collection(table)?;

        write_atomic(path, |writer| {
            serde_json::to_writer(&mut *writer, &collection)?;
            Ok(())
        })?;

        info!("Wrote {} features to {}", table.len(), path.display());
        Ok(())
    }

    pub fn to_collection(&self, table: &GeoTable) -> Result<FeatureCollection> {
        let crs = table.crs().ok_or(ProcessingError::MissingCrs)?;

        let mut foreign = JsonObject::new();
        if let Some(name) = &self.layer_name {
            foreign.insert("name".to_string(), JsonValue::from(name.clone()));
        }
        foreign.insert(
            "crs".to_string(),
            json!({"type": "name", "properties": {"name": crs.urn()}}),
        );

        Ok(FeatureCollection {
            bbox: None,
            features: table.records().iter().map(to_feature).collect(),
            foreign_members: Some(foreign),
        })
    }
}

impl Default for GeoJsonWriter {
    fn default() -> Self {
        Self::new()
    }
}

fn to_feature(record: &GeoRecord) -> Feature {
    let mut properties = JsonObject::new();
    properties.insert(STATION_ID_COLUMN.to_string(), json!(record.station_id));
    properties.insert("year".to_string(), json!(record.year));
    properties.insert("n_days".to_string(), json!(record.n_days));
    properties.insert("name".to_string(), json!(record.name));
    properties.insert("state".to_string(), json!(record.state));

    Feature {
        bbox: None,
        geometry: Some(record.geometry.clone()),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}
