use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;
use crate::models::{RawReading, StationProperties};

/// The fetcher's output: station features with their full time series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawDocument {
    /// Untyped on read: only `data.features` is consumed downstream
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,

    pub data: StationCollection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationCollection {
    #[serde(rename = "type", default = "feature_collection_type")]
    pub kind: String,

    pub features: Vec<StationFeature>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationFeature {
    #[serde(rename = "type", default = "feature_type")]
    pub kind: String,

    pub properties: StationProperties,

    /// Kept as raw JSON so it can be re-serialized verbatim downstream
    pub geometry: Value,

    #[serde(default)]
    pub values: Vec<RawReading>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub provider: ProviderInfo,
    pub producer: ProducerInfo,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request: Option<RequestInfo>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderInfo {
    pub name_local: String,
    pub name_english: String,
    pub country: String,
    pub copyright: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProducerInfo {
    pub name: String,
    pub version: String,
    pub repository: String,
}

/// The fixed request the document was produced from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestInfo {
    pub dataset: String,
    pub resolution: String,
    pub period: String,
    pub parameters: Vec<String>,
    pub start_date: String,
    pub end_date: String,
    /// Recorded for reference only; not applied when fetching
    pub temperature_threshold: f64,
}

impl RawDocument {
    pub fn new(metadata: Option<DocumentMetadata>, features: Vec<StationFeature>) -> Result<Self> {
        Ok(Self {
            metadata: metadata.map(serde_json::to_value).transpose()?,
            data: StationCollection {
                kind: feature_collection_type(),
                features,
            },
        })
    }

    pub fn reading_count(&self) -> usize {
        self.data.features.iter().map(|f| f.values.len()).sum()
    }
}

impl StationFeature {
    pub fn new(properties: StationProperties, geometry: Value, values: Vec<RawReading>) -> Self {
        Self {
            kind: feature_type(),
            properties,
            geometry,
            values,
        }
    }
}

impl DocumentMetadata {
    pub fn dwd(request: RequestInfo) -> Self {
        Self {
            provider: ProviderInfo {
                name_local: "Deutscher Wetterdienst".to_string(),
                name_english: "German Weather Service".to_string(),
                country: "Germany".to_string(),
                copyright: "© Deutscher Wetterdienst (DWD), Climate Data Center (CDC)".to_string(),
                url: "https://opendata.dwd.de/climate_environment/CDC/".to_string(),
            },
            producer: ProducerInfo {
                name: env!("CARGO_PKG_NAME").to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                repository: option_env!("CARGO_PKG_REPOSITORY")
                    .unwrap_or_default()
                    .to_string(),
            },
            request: Some(request),
        }
    }
}

fn feature_collection_type() -> String {
    "FeatureCollection".to_string()
}

fn feature_type() -> String {
    "Feature".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_document() {
        let json = r#"{
            "data": {
                "features": [{
                    "properties": {"id": "00001", "name": "Aach", "state": "Baden-Württemberg",
                                   "start_date": "1937-01-01T00:00:00+00:00", "end_date": null},
                    "geometry": {"type": "Point", "coordinates": [8.8493, 47.8413, 478.0]},
                    "values": [
                        {"date": "1990-06-01", "value": 308.2},
                        {"date": "1990-06-02", "value": "-999"}
                    ]
                }]
            }
        }"#;

        let document: RawDocument = serde_json::from_str(json).unwrap();
        assert_eq!(document.data.kind, "FeatureCollection");
        assert_eq!(document.data.features.len(), 1);
        assert_eq!(document.data.features[0].kind, "Feature");
        assert_eq!(document.reading_count(), 2);
        assert!(document.metadata.is_none());
    }

    #[test]
    fn test_foreign_metadata_is_tolerated() {
        let json = r#"{
            "metadata": {"source": "dwd", "generated": 2024},
            "data": {
                "features": [{
                    "properties": {"id": 1, "name": "Aach", "state": "Baden-Württemberg",
                                   "start_date": null, "end_date": null},
                    "geometry": {"type": "Point", "coordinates": [8.8493, 47.8413]},
                    "values": [{"date": "1990-06-01", "value": 308.2}]
                }]
            }
        }"#;

        let document: RawDocument = serde_json::from_str(json).unwrap();
        assert_eq!(document.data.features[0].properties.id, "1");
        assert_eq!(document.reading_count(), 1);
        assert_eq!(document.metadata.unwrap()["source"], "dwd");
    }

    #[test]
    fn test_written_metadata_keeps_provider_block() {
        let request = RequestInfo {
            dataset: "climate_summary".to_string(),
            resolution: "daily".to_string(),
            period: "historical".to_string(),
            parameters: vec!["temperature_air_max_2m".to_string()],
            start_date: "1963-12-31".to_string(),
            end_date: "2023-12-31".to_string(),
            temperature_threshold: 35.0,
        };
        let document = RawDocument::new(Some(DocumentMetadata::dwd(request)), Vec::new()).unwrap();

        let metadata = document.metadata.unwrap();
        assert_eq!(metadata["provider"]["name_local"], "Deutscher Wetterdienst");
        assert_eq!(metadata["request"]["temperature_threshold"], 35.0);
    }

    #[test]
    fn test_document_without_data_is_rejected() {
        let result = serde_json::from_str::<RawDocument>(r#"{"type": "FeatureCollection"}"#);
        assert!(result.is_err());
    }
}
