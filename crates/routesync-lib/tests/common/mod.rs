#![allow(dead_code)]

use std::path::PathBuf;

use routesync_lib::{load_dataset, Dataset, Network, NetworkBuilder, SegmentSpec, TransportMode};

pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../docs/fixtures")
}

pub fn fixture_network_dir() -> PathBuf {
    fixtures_dir().join("network")
}

pub fn fixture_dataset() -> Dataset {
    load_dataset(fixture_network_dir()).expect("fixture dataset loads")
}

/// Three locations: A (US), B (DE), C (CN) with A-B land, B-C sea and a direct A-C air link.
pub fn scenario_network() -> Network {
    let mut builder = NetworkBuilder::new();
    builder.add_location("A", "US", 40.7, -74.0).unwrap();
    builder.add_location("B", "DE", 53.5, 10.0).unwrap();
    builder.add_location("C", "CN", 31.2, 121.5).unwrap();
    builder
        .add_segment(SegmentSpec::new("A", "B", TransportMode::Land, 10.0, 100.0).bidirectional())
        .unwrap();
    builder
        .add_segment(SegmentSpec::new("B", "C", TransportMode::Sea, 200.0, 300.0).bidirectional())
        .unwrap();
    builder
        .add_segment(SegmentSpec::new("A", "C", TransportMode::Air, 15.0, 900.0).bidirectional())
        .unwrap();
    builder.build()
}
