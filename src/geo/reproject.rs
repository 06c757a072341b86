use crate::error::{ProcessingError, Result};
use crate::geo::Crs;
use geojson::{Geometry, Value};
use proj4rs::proj::Proj;

/// Transforms GeoJSON geometries between two coordinate reference systems
pub struct Reprojector {
    source: Crs,
    target: Crs,
    source_proj: Proj,
    target_proj: Proj,
}

impl Reprojector {
    pub fn new(source: Crs, target: Crs) -> Result<Self> {
        Ok(Self {
            source_proj: source.projection()?,
            target_proj: target.projection()?,
            source,
            target,
        })
    }

    /// Transform one position in place; ordinates past x/y are left untouched
    pub fn transform_position(&self, position: &mut [f64]) -> Result<()> {
        if position.len() < 2 {
            return Err(ProcessingError::InvalidGeometry(format!(
                "position needs at least two ordinates, got {}",
                position.len()
            )));
        }

        let (x, y) = (position[0], position[1]);
        let mut point = if self.source.is_geographic() {
            (x.to_radians(), y.to_radians(), 0.0)
        } else {
            (x, y, 0.0)
        };

        proj4rs::transform::transform(&self.source_proj, &self.target_proj, &mut point)
            .map_err(|e| {
                ProcessingError::Projection(format!(
                    "({}, {}) from {} to {}: {}",
                    x, y, self.source, self.target, e
                ))
            })?;

        let (tx, ty) = if self.target.is_geographic() {
            (point.0.to_degrees(), point.1.to_degrees())
        } else {
            (point.0, point.1)
        };

        if !tx.is_finite() || !ty.is_finite() {
            return Err(ProcessingError::Projection(format!(
                "({}, {}) has no finite image in {}",
                x, y, self.target
            )));
        }

        position[0] = tx;
        position[1] = ty;
        Ok(())
    }

    pub fn transform_geometry(&self, geometry: &mut Geometry) -> Result<()> {
        geometry.bbox = None;
        self.transform_value(&mut geometry.value)
    }

    fn transform_value(&self, value: &mut Value) -> Result<()> {
        match value {
            Value::Point(position) => self.transform_position(position),
            Value::MultiPoint(positions) | Value::LineString(positions) => {
                self.transform_positions(positions)
            }
            Value::MultiLineString(lines) | Value::Polygon(lines) => {
                for line in lines {
                    self.transform_positions(line)?;
                }
                Ok(())
            }
            Value::MultiPolygon(polygons) => {
                for polygon in polygons {
                    for ring in polygon {
                        self.transform_positions(ring)?;
                    }
                }
                Ok(())
            }
            Value::GeometryCollection(geometries) => {
                for geometry in geometries {
                    self.transform_geometry(geometry)?;
                }
                Ok(())
            }
        }
    }

    fn transform_positions(&self, positions: &mut [Vec<f64>]) -> Result<()> {
        for position in positions {
            self.transform_position(position)?;
        }
        Ok(())
    }
}
