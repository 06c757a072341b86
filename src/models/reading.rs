use chrono::{
    DateTime, Datelike, FixedOffset, NaiveDate, NaiveDateTime, SecondsFormat, TimeZone, Utc,
};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

use crate::error::{ProcessingError, Result};
use crate::utils::constants::{KELVIN_OFFSET, MISSING_VALUE_SENTINEL};

/// A single value of a station's time series in the raw document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawReading {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub station_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dataset: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameter: Option<String>,

    pub date: String,

    /// Kept untyped: the provider emits numbers, numeric strings or null
    #[serde(default)]
    pub value: Value,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality: Option<f64>,
}

/// One reading joined with its station, before unit and type normalization
#[derive(Debug, Clone, PartialEq)]
pub struct FlatReading {
    pub id: String,
    pub geometry: String,
    pub name: String,
    pub state: String,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub date: String,
    pub value: Value,
}

/// A reading in Celsius with a parsed timestamp; one line of a checkpoint file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedReading {
    pub id: String,
    pub geometry: String,
    pub name: String,
    pub state: String,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    #[serde(serialize_with = "serialize_offset_date")]
    pub date: DateTime<FixedOffset>,
    pub year: i32,
    pub value: f64,
}

impl FlatReading {
    /// Coerce, convert and date-stamp the reading.
    ///
    /// Returns `Ok(None)` when the value is not a usable number; the reading
    /// is then dropped rather than counted as zero.
    pub fn normalize(self) -> Result<Option<NormalizedReading>> {
        let Some(kelvin) = coerce_value(&self.value) else {
            return Ok(None);
        };

        let date = parse_observation_date(&self.date)?;

        Ok(Some(NormalizedReading {
            id: self.id,
            geometry: self.geometry,
            name: self.name,
            state: self.state,
            start_date: self.start_date,
            end_date: self.end_date,
            year: date.year(),
            date,
            value: kelvin_to_celsius(kelvin),
        }))
    }
}

/// Numeric coercion of a raw value.
///
/// Numbers and numeric strings pass; null, empty or non-numeric strings, NaN
/// and the provider's missing-data sentinel do not.
pub fn coerce_value(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;

    if number.is_nan() || number == MISSING_VALUE_SENTINEL {
        return None;
    }

    Some(number)
}

pub fn kelvin_to_celsius(kelvin: f64) -> f64 {
    kelvin - KELVIN_OFFSET
}

pub fn celsius_to_kelvin(celsius: f64) -> f64 {
    celsius + KELVIN_OFFSET
}

/// Checkpoint dates keep an explicit offset (`+00:00`, never `Z`), matching raw documents
fn serialize_offset_date<S>(
    date: &DateTime<FixedOffset>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&date.to_rfc3339_opts(SecondsFormat::Secs, false))
}

/// Parse an observation date; timestamps without an offset are taken as UTC
pub fn parse_observation_date(raw: &str) -> Result<DateTime<FixedOffset>> {
    let raw = raw.trim();

    if let Ok(date) = DateTime::parse_from_rfc3339(raw) {
        return Ok(date);
    }

    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(Utc.from_utc_datetime(&naive).into());
    }

    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f") {
        return Ok(Utc.from_utc_datetime(&naive).into());
    }

    let day = NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|e| {
        ProcessingError::InvalidFormat(format!("Unrecognised observation date '{}': {}", raw, e))
    })?;

    let midnight = day
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| ProcessingError::InvalidFormat(format!("Invalid date '{}'", raw)))?;

    Ok(Utc.from_utc_datetime(&midnight).into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn flat(value: Value) -> FlatReading {
        FlatReading {
            id: "00001".to_string(),
            geometry: r#"{"coordinates":[8.8493,47.8413,478.0],"type":"Point"}"#.to_string(),
            name: "Aach".to_string(),
            state: "Baden-Württemberg".to_string(),
            start_date: None,
            end_date: None,
            date: "1990-06-01T00:00:00+00:00".to_string(),
            value,
        }
    }

    #[test]
    fn test_coerce_numbers_and_numeric_strings() {
        assert_eq!(coerce_value(&json!(308.2)), Some(308.2));
        assert_eq!(coerce_value(&json!(300)), Some(300.0));
        assert_eq!(coerce_value(&json!(" 291.5 ")), Some(291.5));
    }

    #[test]
    fn test_coerce_rejects_missing_values() {
        assert_eq!(coerce_value(&json!(null)), None);
        assert_eq!(coerce_value(&json!("")), None);
        assert_eq!(coerce_value(&json!("n/a")), None);
        assert_eq!(coerce_value(&json!("NaN")), None);
        assert_eq!(coerce_value(&json!("-999")), None);
        assert_eq!(coerce_value(&json!(-999)), None);
        assert_eq!(coerce_value(&json!([1.0])), None);
    }

    #[test]
    fn test_celsius_conversion_is_exact_subtraction() {
        for kelvin in [0.0, 273.15, 300.0, 308.2, 250.45] {
            assert_eq!(kelvin_to_celsius(kelvin), kelvin - 273.15);
        }
        assert!((kelvin_to_celsius(308.2) - 35.05).abs() < 1e-9);
        assert!(kelvin_to_celsius(308.2) >= 35.0);
        assert!(kelvin_to_celsius(300.0) < 35.0);
    }

    #[test]
    fn test_parse_observation_date_formats() {
        let rfc = parse_observation_date("1990-06-01T00:00:00+00:00").unwrap();
        let naive = parse_observation_date("1990-06-01T00:00:00").unwrap();
        let day = parse_observation_date("1990-06-01").unwrap();
        let zulu = parse_observation_date("1990-06-01T00:00:00.000Z").unwrap();

        assert_eq!(rfc, naive);
        assert_eq!(rfc, day);
        assert_eq!(rfc, zulu);
        assert_eq!(rfc.year(), 1990);
        assert!(parse_observation_date("01.06.1990").is_err());
    }

    #[test]
    fn test_year_follows_local_offset() {
        let date = parse_observation_date("1990-01-01T00:30:00+01:00").unwrap();
        assert_eq!(date.year(), 1990);
    }

    #[test]
    fn test_normalize_keeps_numeric_and_drops_sentinel() {
        let kept = flat(json!(308.2)).normalize().unwrap().unwrap();
        assert_eq!(kept.year, 1990);
        assert_eq!(kept.value, 308.2 - 273.15);

        assert!(flat(json!("-999")).normalize().unwrap().is_none());
        assert!(flat(json!(null)).normalize().unwrap().is_none());
    }

    #[test]
    fn test_normalized_reading_round_trips_through_json_line() {
        let reading = flat(json!(300.0)).normalize().unwrap().unwrap();
        let line = serde_json::to_string(&reading).unwrap();
        assert!(line.contains(r#""date":"1990-06-01T00:00:00+00:00""#));
        assert!(!line.contains("00:00Z"));

        let parsed: NormalizedReading = serde_json::from_str(&line).unwrap();
        assert_eq!(parsed, reading);
    }

    #[test]
    fn test_checkpoint_date_keeps_local_offset() {
        let mut reading = flat(json!(300.0)).normalize().unwrap().unwrap();
        reading.date = parse_observation_date("1990-06-01T00:30:00+01:00").unwrap();
        let line = serde_json::to_string(&reading).unwrap();
        assert!(line.contains(r#""date":"1990-06-01T00:30:00+01:00""#));
    }
}
