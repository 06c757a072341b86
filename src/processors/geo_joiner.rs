use crate::error::{ProcessingError, Result};
use crate::geo::{Crs, GeoTable};
use crate::models::YearlySummary;
use crate::utils::constants::{SOURCE_EPSG, TARGET_EPSG};
use crate::utils::DataLayout;
use crate::writers::{GeoJsonWriter, JsonLinesWriter};
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Clone, PartialEq)]
pub struct GeoJoinSummary {
    pub features: usize,
    pub stations: usize,
    pub crs: Crs,
    pub output: PathBuf,
}

/// Third pipeline stage: yearly summary to a projected GeoJSON layer
pub struct GeoJoiner {
    layout: DataLayout,
    source: u16,
    target: u16,
}

impl GeoJoiner {
    pub fn new(layout: DataLayout) -> Self {
        Self {
            layout,
            source: SOURCE_EPSG,
            target: TARGET_EPSG,
        }
    }

    pub fn run(&self) -> Result<GeoJoinSummary> {
        let input = self.layout.summary();
        if !input.is_file() {
            return Err(ProcessingError::MissingData(format!(
                "Summary {} not found; run the aggregate stage first",
                input.display()
            )));
        }

        let summaries: Vec<YearlySummary> = JsonLinesWriter::new().read_records(&input)?;
        info!("Read {} station-years from {}", summaries.len(), input.display());

        let table = self.join(summaries)?;
        let output = self.layout.geo_output();
        let layer_name = output
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_string();

        GeoJsonWriter::new()
            .with_layer_name(layer_name)
            .write_table(&table, &output)?;

        let mut stations: Vec<&str> = table
            .records()
            .iter()
            .map(|r| r.station_id.as_str())
            .collect();
        stations.dedup();

        Ok(GeoJoinSummary {
            features: table.len(),
            stations: stations.len(),
            crs: table.crs().ok_or(ProcessingError::MissingCrs)?,
            output,
        })
    }

    /// Parse geometries, reproject and order the rows
    pub fn join(&self, summaries: Vec<YearlySummary>) -> Result<GeoTable> {
        let mut table = GeoTable::from_summaries(summaries)?
            .set_crs(Crs::from_epsg(self.source)?)
            .to_crs(Crs::from_epsg(self.target)?)?;

        table.sort_by_station_year();
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geojson::Value;
    use tempfile::TempDir;

    fn summary(id: &str, year: i32, n_days: u32) -> YearlySummary {
        YearlySummary {
            station_id: id.to_string(),
            year,
            n_days,
            geometry: r#"{"type":"Point","coordinates":[8.8493,47.8413,478.0]}"#.to_string(),
            name: "Aach".to_string(),
            state: "Baden-Württemberg".to_string(),
        }
    }

    #[test]
    fn test_join_sorts_and_projects() {
        let dir = TempDir::new().unwrap();
        let table = GeoJoiner::new(DataLayout::new(dir.path()))
            .join(vec![summary("00003", 1990, 0), summary("00001", 1991, 2)])
            .unwrap();

        assert_eq!(table.crs().map(|c| c.epsg()), Some(31467));
        assert_eq!(table.records()[0].station_id, "00001");

        let Value::Point(position) = &table.records()[0].geometry.value else {
            panic!("expected a point");
        };
        // Aach lies just west of the 9°E central meridian
        assert!(position[0] > 3_480_000.0 && position[0] < 3_500_000.0);
        assert!(position[1] > 5_290_000.0 && position[1] < 5_310_000.0);
    }

    #[test]
    fn test_missing_summary_is_reported() {
        let dir = TempDir::new().unwrap();
        let result = GeoJoiner::new(DataLayout::new(dir.path())).run();
        assert!(matches!(result, Err(ProcessingError::MissingData(_))));
    }

    #[test]
    fn test_run_writes_layer() -> Result<()> {
        let dir = TempDir::new()?;
        let layout = DataLayout::new(dir.path());
        JsonLinesWriter::new().write_records(
            &[summary("00001", 1990, 1), summary("00001", 1991, 0)],
            &layout.summary(),
        )?;

        let result = GeoJoiner::new(layout.clone()).run()?;

        assert_eq!(result.features, 2);
        assert_eq!(result.stations, 1);
        assert_eq!(result.output, layout.geo_output());
        assert!(layout.geo_output().is_file());
        Ok(())
    }
}
