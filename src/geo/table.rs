use crate::error::{ProcessingError, Result};
use crate::geo::{Crs, Reprojector};
use crate::models::YearlySummary;
use geojson::Geometry;

/// One summary row with its geometry parsed
#[derive(Debug, Clone, PartialEq)]
pub struct GeoRecord {
    pub station_id: String,
    pub year: i32,
    pub n_days: u32,
    pub name: String,
    pub state: String,
    pub geometry: Geometry,
}

impl GeoRecord {
    pub fn from_summary(summary: YearlySummary) -> Result<Self> {
        let geometry = parse_geometry(&summary.geometry)?;
        Ok(Self {
            station_id: summary.station_id,
            year: summary.year,
            n_days: summary.n_days,
            name: summary.name,
            state: summary.state,
            geometry,
        })
    }
}

/// Parse a serialized GeoJSON geometry object
pub fn parse_geometry(text: &str) -> Result<Geometry> {
    serde_json::from_str(text).map_err(|e| {
        let shown: String = text.chars().take(80).collect();
        ProcessingError::InvalidGeometry(format!("{}: {}", shown, e))
    })
}

/// Rows with geometries plus the CRS those geometries are expressed in
#[derive(Debug, Clone, Default)]
pub struct GeoTable {
    records: Vec<GeoRecord>,
    crs: Option<Crs>,
}

impl GeoTable {
    pub fn from_summaries(summaries: Vec<YearlySummary>) -> Result<Self> {
        let records = summaries
            .into_iter()
            .map(GeoRecord::from_summary)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { records, crs: None })
    }

    /// Declare the CRS of the coordinates without touching them
    pub fn set_crs(mut self, crs: Crs) -> Self {
        self.crs = Some(crs);
        self
    }

    /// Reproject every geometry into `target`
    pub fn to_crs(mut self, target: Crs) -> Result<Self> {
        let source = self.crs.ok_or(ProcessingError::MissingCrs)?;
        if source == target {
            return Ok(self);
        }

        let reprojector = Reprojector::new(source, target)?;
        for record in &mut self.records {
            reprojector.transform_geometry(&mut record.geometry).map_err(|e| match e {
                ProcessingError::Projection(msg) => ProcessingError::Projection(format!(
                    "station {} year {}: {}",
                    record.station_id, record.year, msg
                )),
                other => other,
            })?;
        }

        self.crs = Some(target);
        Ok(self)
    }

    /// Order rows by station id, then year; ties keep their input order
    pub fn sort_by_station_year(&mut self) {
        self.records
            .sort_by(|a, b| (&a.station_id, a.year).cmp(&(&b.station_id, b.year)));
    }

    pub fn crs(&self) -> Option<Crs> {
        self.crs
    }

    pub fn records(&self) -> &[GeoRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
