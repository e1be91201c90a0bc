mod common;

use std::fs;
use std::path::Path;

use rusqlite::Connection;
use routesync_lib::{load_dataset, Error, TransportMode};
use tempfile::tempdir;

use common::fixture_network_dir;

fn create_sqlite_fixture(path: &Path, with_policies: bool) {
    let connection = Connection::open(path).expect("create database");
    connection
        .execute_batch(
            "CREATE TABLE locations (name TEXT, country_code TEXT, latitude REAL, longitude REAL);
             CREATE TABLE segments (
                 from_location TEXT, to_location TEXT, mode TEXT, time_hours REAL,
                 price REAL, distance_km REAL, co2_kg REAL, bidirectional INTEGER
             );
             INSERT INTO locations VALUES ('Rotterdam', 'NL', 51.9244, 4.4777);
             INSERT INTO locations VALUES ('Hamburg', 'DE', 53.5511, 9.9937);
             INSERT INTO locations VALUES ('Warsaw', 'PL', 52.2297, 21.0122);
             INSERT INTO segments VALUES ('Rotterdam', 'Hamburg', 'land', 8, 600, 410, NULL, 1);
             INSERT INTO segments VALUES ('Hamburg', 'Warsaw', 'land', 12, 700, NULL, NULL, 0);",
        )
        .expect("seed schema");

    if with_policies {
        connection
            .execute_batch(
                "CREATE TABLE cargo_policies (
                     cargo_type TEXT, keywords TEXT, prohibited_in TEXT, restricted_in TEXT
                 );
                 INSERT INTO cargo_policies VALUES ('hazardous', 'explosives, flammable', 'PL', 'de,nl');",
            )
            .expect("seed policies");
    }
}

#[test]
fn loads_fixture_directory() {
    let dataset = load_dataset(fixture_network_dir()).expect("fixture loads");
    let network = &dataset.network;

    assert_eq!(network.location_count(), 13);
    // Every fixture row is bidirectional.
    assert_eq!(network.segment_count(), 52);
    assert!(network.location_id_by_name("New York").is_some());
    assert_eq!(dataset.policies.rules().len(), 4);

    let explicit = network
        .segments()
        .iter()
        .find(|s| {
            network.location_name(s.from) == Some("Dubai")
                && network.location_name(s.to) == Some("Rotterdam")
        })
        .expect("Dubai -> Rotterdam segment");
    assert_eq!(explicit.distance_km, 11_500.0);
    assert_eq!(explicit.co2_kg, 115.0);
}

#[test]
fn derives_co2_from_mode_emission_factor() {
    let dataset = load_dataset(fixture_network_dir()).expect("fixture loads");
    for segment in dataset.network.segments() {
        if segment.distance_km > 0.0 && segment.co2_kg > 0.0 {
            let factor = segment.co2_kg / segment.distance_km;
            let expected = match segment.mode {
                TransportMode::Sea => 0.01,
                TransportMode::Land => 0.1,
                TransportMode::Air => 0.7,
            };
            assert!((factor - expected).abs() < 1e-9, "segment {:?}", segment);
        }
    }
}

#[test]
fn loads_sqlite_dataset_with_policies() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("network.db");
    create_sqlite_fixture(&path, true);

    let dataset = load_dataset(&path).expect("sqlite dataset loads");
    let network = &dataset.network;
    assert_eq!(network.location_count(), 3);
    assert_eq!(network.segment_count(), 3);

    let derived = network
        .segments()
        .iter()
        .find(|s| network.location_name(s.to) == Some("Warsaw"))
        .unwrap();
    assert!(derived.distance_km > 700.0 && derived.distance_km < 850.0);
    assert!((derived.co2_kg - derived.distance_km * 0.1).abs() < 1e-9);

    let classification = dataset.policies.classify("general", "crates of flammable paint");
    let prohibited: Vec<_> = classification
        .prohibited_in
        .iter()
        .map(|c| c.to_string())
        .collect();
    let restricted: Vec<_> = classification
        .restricted_in
        .iter()
        .map(|c| c.to_string())
        .collect();
    assert_eq!(prohibited, vec!["PL"]);
    assert_eq!(restricted, vec!["DE", "NL"]);
}

#[test]
fn sqlite_without_policy_table_has_empty_catalog() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("network.sqlite");
    create_sqlite_fixture(&path, false);

    let dataset = load_dataset(&path).expect("sqlite dataset loads");
    assert!(dataset.policies.is_empty());
}

#[test]
fn unsupported_sqlite_schema_is_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("other.db");
    let connection = Connection::open(&path).unwrap();
    connection
        .execute_batch("CREATE TABLE SolarSystems (solarSystemId INTEGER, name TEXT);")
        .unwrap();
    drop(connection);

    let err = load_dataset(&path).unwrap_err();
    assert!(matches!(err, Error::UnsupportedSchema));
}

#[test]
fn missing_dataset_is_reported() {
    let dir = tempdir().unwrap();
    let err = load_dataset(dir.path().join("absent")).unwrap_err();
    assert!(matches!(err, Error::DatasetNotFound { .. }));

    let err = load_dataset(dir.path()).unwrap_err();
    assert!(matches!(err, Error::DatasetNotFound { ref path } if path.ends_with("locations.csv")));
}

#[test]
fn invalid_rows_are_dataset_errors() {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join("locations.csv"),
        "name,country_code,latitude,longitude\nA,US,0,0\nB,XYZ,1,1\n",
    )
    .unwrap();
    fs::write(dir.path().join("segments.csv"), "from,to,mode,time,price\n").unwrap();
    let err = load_dataset(dir.path()).unwrap_err();
    assert!(matches!(err, Error::InvalidDataset { .. }));

    fs::write(
        dir.path().join("locations.csv"),
        "name,country_code,latitude,longitude\nA,US,0,0\nB,DE,1,1\n",
    )
    .unwrap();
    fs::write(
        dir.path().join("segments.csv"),
        "from,to,mode,time,price\nA,B,land,-3,10\n",
    )
    .unwrap();
    let err = load_dataset(dir.path()).unwrap_err();
    assert!(matches!(err, Error::InvalidDataset { .. }));
}

#[test]
fn malformed_policy_catalog_is_a_json_error() {
    let dir = tempdir().unwrap();
    for file in ["locations.csv", "segments.csv"] {
        fs::copy(fixture_network_dir().join(file), dir.path().join(file)).unwrap();
    }
    fs::write(dir.path().join("cargo_policies.json"), "{\"rules\": [ {").unwrap();

    let err = load_dataset(dir.path()).unwrap_err();
    assert!(matches!(err, Error::Json(_)));
}
