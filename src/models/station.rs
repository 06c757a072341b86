use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

/// Station properties as they appear on each feature of the raw document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationProperties {
    #[serde(deserialize_with = "deserialize_station_id")]
    pub id: String,

    pub name: String,

    pub state: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,

    pub start_date: Option<String>,

    pub end_date: Option<String>,
}

/// A row of the DWD station description file
#[derive(Debug, Clone, PartialEq)]
pub struct StationMetadata {
    pub id: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub height: f64,
    pub latitude: f64,
    pub longitude: f64,
    pub name: String,
    pub state: String,
}

impl StationMetadata {
    /// Whether the station reported at any point inside `[start, end]`
    pub fn overlaps(&self, start: NaiveDate, end: NaiveDate) -> bool {
        self.start_date <= end && self.end_date >= start
    }

    pub fn to_properties(&self) -> StationProperties {
        StationProperties {
            id: self.id.clone(),
            name: self.name.clone(),
            state: self.state.clone(),
            height: Some(self.height),
            latitude: Some(self.latitude),
            longitude: Some(self.longitude),
            start_date: Some(format_midnight_utc(self.start_date)),
            end_date: Some(format_midnight_utc(self.end_date)),
        }
    }

    /// GeoJSON point in `[lon, lat, height]` order
    pub fn geometry(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "Point",
            "coordinates": [self.longitude, self.latitude, self.height],
        })
    }
}

/// Render a date the way the provider stamps daily values
pub fn format_midnight_utc(date: NaiveDate) -> String {
    format!("{}T00:00:00+00:00", date.format("%Y-%m-%d"))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StationIdRepr {
    Text(String),
    Integer(i64),
}

/// Station identifiers arrive as strings ("00001") or as bare integers
fn deserialize_station_id<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match StationIdRepr::deserialize(deserializer)? {
        StationIdRepr::Text(id) => id,
        StationIdRepr::Integer(id) => id.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn aach() -> StationMetadata {
        StationMetadata {
            id: "00001".to_string(),
            start_date: NaiveDate::from_ymd_opt(1937, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(1986, 6, 30).unwrap(),
            height: 478.0,
            latitude: 47.8413,
            longitude: 8.8493,
            name: "Aach".to_string(),
            state: "Baden-Württemberg".to_string(),
        }
    }

    #[test]
    fn test_station_id_accepts_text_and_integer() {
        let text: StationProperties = serde_json::from_str(
            r#"{"id": "00001", "name": "Aach", "state": "BW", "start_date": null, "end_date": null}"#,
        )
        .unwrap();
        let integer: StationProperties = serde_json::from_str(
            r#"{"id": 44, "name": "Großenkneten", "state": "NI", "start_date": null, "end_date": null}"#,
        )
        .unwrap();

        assert_eq!(text.id, "00001");
        assert_eq!(integer.id, "44");
    }

    #[test]
    fn test_station_overlap() {
        let station = aach();
        let date = |y, m, d| NaiveDate::from_ymd_opt(y, m, d).unwrap();

        assert!(station.overlaps(date(1963, 12, 31), date(2023, 12, 31)));
        assert!(station.overlaps(date(1986, 6, 30), date(1990, 1, 1)));
        assert!(!station.overlaps(date(1986, 7, 1), date(2023, 12, 31)));
        assert!(!station.overlaps(date(1900, 1, 1), date(1936, 12, 31)));
    }

    #[test]
    fn test_station_geometry_is_lon_lat_height() {
        let geometry = aach().geometry();
        assert_eq!(geometry["type"], "Point");
        assert_eq!(geometry["coordinates"][0], 8.8493);
        assert_eq!(geometry["coordinates"][1], 47.8413);
        assert_eq!(geometry["coordinates"][2], 478.0);
    }

    #[test]
    fn test_to_properties_stamps_dates() {
        let properties = aach().to_properties();
        assert_eq!(
            properties.start_date.as_deref(),
            Some("1937-01-01T00:00:00+00:00")
        );
        assert_eq!(properties.end_date.as_deref(), Some("1986-06-30T00:00:00+00:00"));
    }
}
