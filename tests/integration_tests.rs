use dwd_heat_days::models::YearlySummary;
use dwd_heat_days::processors::{Aggregator, GeoJoiner};
use dwd_heat_days::utils::DataLayout;
use dwd_heat_days::writers::JsonLinesWriter;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn feature(id: &str, name: &str, lon: f64, lat: f64, values: Value) -> Value {
    json!({
        "type": "Feature",
        "properties": {
            "id": id,
            "name": name,
            "state": "Baden-Württemberg",
            "start_date": "1937-01-01T00:00:00+00:00",
            "end_date": "2023-12-31T00:00:00+00:00"
        },
        "geometry": {"type": "Point", "coordinates": [lon, lat, 478.0]},
        "values": values
    })
}

fn write_document(path: &Path, features: Vec<Value>) {
    let document = json!({
        "data": {"type": "FeatureCollection", "features": features}
    });
    fs::write(path, document.to_string()).unwrap();
}

fn read_summary(layout: &DataLayout) -> Vec<YearlySummary> {
    JsonLinesWriter::new().read_records(&layout.summary()).unwrap()
}

#[test]
fn test_single_station_year_is_counted() {
    let dir = TempDir::new().unwrap();
    let layout = DataLayout::new(dir.path());
    write_document(
        &layout.raw_document(),
        vec![feature(
            "00001",
            "Aach",
            8.8493,
            47.8413,
            json!([
                {"date": "1990-07-01T00:00:00+00:00", "value": 308.2},
                {"date": "1990-07-02T00:00:00+00:00", "value": 300.0}
            ]),
        )],
    );

    let report = Aggregator::new(layout.clone(), 35.0)
        .with_silent(true)
        .run()
        .unwrap();

    assert_eq!(report.documents, 1);
    assert_eq!(report.readings_kept, 2);
    assert!(report.is_clean());

    let summary = read_summary(&layout);
    assert_eq!(summary.len(), 1);
    assert_eq!(summary[0].station_id, "00001");
    assert_eq!(summary[0].year, 1990);
    assert_eq!(summary[0].n_days, 1);
    assert_eq!(summary[0].name, "Aach");

    let line = fs::read_to_string(layout.summary()).unwrap();
    assert!(line.starts_with("{\"Stations_id\":\"00001\",\"year\":1990,\"n_days\":1,"));

    // Checkpoints are removed after a successful run
    assert!(!layout.temp_dir().exists());
}

#[test]
fn test_missing_values_are_not_counted() {
    let dir = TempDir::new().unwrap();
    let layout = DataLayout::new(dir.path());
    write_document(
        &layout.raw_document(),
        vec![feature(
            "00001",
            "Aach",
            8.8493,
            47.8413,
            json!([
                {"date": "1990-07-01T00:00:00+00:00", "value": -999},
                {"date": "1990-07-02T00:00:00+00:00", "value": null},
                {"date": "1990-07-03T00:00:00+00:00", "value": "not a number"},
                {"date": "1990-07-04T00:00:00+00:00", "value": "309.0"}
            ]),
        )],
    );

    let report = Aggregator::new(layout.clone(), 35.0)
        .with_silent(true)
        .run()
        .unwrap();

    assert_eq!(report.readings_kept, 1);
    assert_eq!(report.readings_dropped, 3);
    assert_eq!(read_summary(&layout)[0].n_days, 1);
}

#[test]
fn test_station_year_split_across_documents_stays_split() {
    let dir = TempDir::new().unwrap();
    let layout = DataLayout::new(dir.path());
    let values = |date: &str| json!([{"date": date, "value": 310.0}]);

    write_document(
        &dir.path().join("part_a.geojson"),
        vec![feature("00001", "Aach", 8.8493, 47.8413, values("1990-07-01"))],
    );
    write_document(
        &dir.path().join("part_b.geojson"),
        vec![feature("00001", "Aach", 8.8493, 47.8413, values("1990-07-02"))],
    );

    Aggregator::new(layout.clone(), 35.0)
        .with_silent(true)
        .run()
        .unwrap();

    let summary = read_summary(&layout);
    assert_eq!(summary.len(), 2);
    assert!(summary
        .iter()
        .all(|row| row.station_id == "00001" && row.year == 1990 && row.n_days == 1));
}

#[test]
fn test_rerun_reuses_checkpoint_unchanged() {
    let dir = TempDir::new().unwrap();
    let layout = DataLayout::new(dir.path());
    write_document(
        &layout.raw_document(),
        vec![
            feature(
                "00003",
                "Aachen",
                6.0941,
                50.7827,
                json!([{"date": "1990-07-01", "value": 309.0}]),
            ),
            feature(
                "00001",
                "Aach",
                8.8493,
                47.8413,
                json!([{"date": "1990-07-01", "value": 301.0}]),
            ),
        ],
    );

    let aggregator = Aggregator::new(layout.clone(), 35.0)
        .with_keep_temp(true)
        .with_silent(true);

    let first = aggregator.run().unwrap();
    let checkpoint = layout.checkpoint_for(&layout.raw_document());
    let first_bytes = fs::read(&checkpoint).unwrap();

    let second = aggregator.run().unwrap();
    let second_bytes = fs::read(&checkpoint).unwrap();

    assert_eq!(first.checkpoints_written, 1);
    assert_eq!(second.checkpoints_written, 0);
    assert_eq!(second.checkpoints_reused, 1);
    assert_eq!(first_bytes, second_bytes);

    // Within a date, readings are ordered by station id
    let text = String::from_utf8(first_bytes).unwrap();
    let first_line: Value = serde_json::from_str(text.lines().next().unwrap()).unwrap();
    assert_eq!(first_line["id"], "00001");
    assert_eq!(first_line["year"], 1990);
}

#[test]
fn test_full_aggregate_and_geojoin() {
    let dir = TempDir::new().unwrap();
    let layout = DataLayout::new(dir.path());
    write_document(
        &layout.raw_document(),
        vec![
            feature(
                "00003",
                "Aachen",
                6.0941,
                50.7827,
                json!([
                    {"date": "2003-08-08T00:00:00+00:00", "value": 309.15},
                    {"date": "1990-07-01T00:00:00+00:00", "value": 290.0}
                ]),
            ),
            feature(
                "00001",
                "Aach",
                8.8493,
                47.8413,
                json!([{"date": "2003-08-08T00:00:00+00:00", "value": 311.0}]),
            ),
        ],
    );

    Aggregator::new(layout.clone(), 35.0)
        .with_silent(true)
        .run()
        .unwrap();
    let result = GeoJoiner::new(layout.clone()).run().unwrap();

    assert_eq!(result.features, 3);
    assert_eq!(result.stations, 2);

    let written: Value =
        serde_json::from_str(&fs::read_to_string(layout.geo_output()).unwrap()).unwrap();
    assert_eq!(
        written["crs"]["properties"]["name"],
        "urn:ogc:def:crs:EPSG::31467"
    );

    let keys: Vec<(String, i64, u64)> = written["features"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| {
            let p = &f["properties"];
            (
                p["Stations_id"].as_str().unwrap().to_string(),
                p["year"].as_i64().unwrap(),
                p["n_days"].as_u64().unwrap(),
            )
        })
        .collect();
    assert_eq!(
        keys,
        vec![
            ("00001".to_string(), 2003, 1),
            ("00003".to_string(), 1990, 0),
            ("00003".to_string(), 2003, 1),
        ]
    );

    let easting = written["features"][0]["geometry"]["coordinates"][0]
        .as_f64()
        .unwrap();
    assert!(easting > 3_400_000.0 && easting < 3_600_000.0);

    // The geo output is never read back as a raw document
    let rerun = Aggregator::new(layout.clone(), 35.0)
        .with_silent(true)
        .run()
        .unwrap();
    assert_eq!(rerun.documents, 1);
}
