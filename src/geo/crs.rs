use crate::error::{ProcessingError, Result};
use proj4rs::proj::Proj;

/// PROJ definitions for the EPSG codes the pipeline understands
const DEFINITIONS: &[(u16, &str, bool)] = &[
    (4326, "+proj=longlat +datum=WGS84 +no_defs", true),
    (
        31467,
        "+proj=tmerc +lat_0=0 +lon_0=9 +k=1 +x_0=3500000 +y_0=0 +ellps=bessel \
         +towgs84=598.1,73.7,418.2,0.202,0.045,-2.455,6.7 +units=m +no_defs",
        false,
    ),
];

/// A coordinate reference system identified by its EPSG code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Crs {
    epsg: u16,
    definition: &'static str,
    geographic: bool,
}

impl Crs {
    pub fn from_epsg(epsg: u16) -> Result<Self> {
        DEFINITIONS
            .iter()
            .find(|(code, _, _)| *code == epsg)
            .map(|&(code, definition, geographic)| Self {
                epsg: code,
                definition,
                geographic,
            })
            .ok_or(ProcessingError::UnsupportedCrs(epsg))
    }

    pub fn epsg(&self) -> u16 {
        self.epsg
    }

    /// Coordinates are longitude/latitude in degrees rather than projected metres
    pub fn is_geographic(&self) -> bool {
        self.geographic
    }

    /// OGC URN as written into the GeoJSON `crs` member
    pub fn urn(&self) -> String {
        format!("urn:ogc:def:crs:EPSG::{}", self.epsg)
    }

    pub(crate) fn projection(&self) -> Result<Proj> {
        Proj::from_proj_string(self.definition).map_err(|e| {
            ProcessingError::Projection(format!("EPSG:{} definition rejected: {}", self.epsg, e))
        })
    }
}

impl std::fmt::Display for Crs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "EPSG:{}", self.epsg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_codes() {
        let wgs84 = Crs::from_epsg(4326).unwrap();
        assert!(wgs84.is_geographic());
        assert_eq!(wgs84.to_string(), "EPSG:4326");

        let gauss_krueger = Crs::from_epsg(31467).unwrap();
        assert!(!gauss_krueger.is_geographic());
        assert_eq!(gauss_krueger.urn(), "urn:ogc:def:crs:EPSG::31467");
    }

    #[test]
    fn test_unknown_code_is_rejected() {
        assert!(matches!(
            Crs::from_epsg(9999),
            Err(ProcessingError::UnsupportedCrs(9999))
        ));
    }

    #[test]
    fn test_definitions_are_accepted_by_proj() {
        for (code, _, _) in DEFINITIONS {
            assert!(Crs::from_epsg(*code).unwrap().projection().is_ok());
        }
    }
}
