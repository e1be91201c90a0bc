use std::env;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, Trim};
use directories::ProjectDirs;
use serde::Deserialize;
use tracing::{debug, info};

use crate::db::load_sqlite_dataset;
use crate::error::{Error, Result};
use crate::network::{Network, NetworkBuilder, SegmentSpec, TransportMode};
use crate::policy::CargoPolicyCatalog;

/// Environment variable overriding the dataset location.
pub const DATA_PATH_ENV: &str = "ROUTESYNC_DATA_PATH";

/// Directory name of the dataset under the platform data directory.
const DATASET_DIRNAME: &str = "network";

const LOCATIONS_FILE: &str = "locations.csv";
const SEGMENTS_FILE: &str = "segments.csv";
const POLICIES_FILE: &str = "cargo_policies.json";

/// Reference data loaded once per process.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub network: Network,
    pub policies: CargoPolicyCatalog,
}

/// Resolve the default dataset location using platform-specific project directories.
pub fn default_dataset_path() -> Result<PathBuf> {
    let dirs = ProjectDirs::from("com", "routesync", "routesync")
        .ok_or(Error::ProjectDirsUnavailable)?;
    Ok(dirs.data_dir().join(DATASET_DIRNAME))
}

/// Resolve the dataset path.
///
/// Order of precedence:
/// 1. Explicit `target` argument.
/// 2. `ROUTESYNC_DATA_PATH` environment variable.
/// 3. Platform-specific project data directory.
pub fn resolve_dataset_path(target: Option<&Path>) -> Result<PathBuf> {
    if let Some(explicit) = target {
        return Ok(explicit.to_path_buf());
    }
    if let Some(env_path) = env::var_os(DATA_PATH_ENV) {
        return Ok(PathBuf::from(env_path));
    }
    default_dataset_path()
}

/// Load a dataset from a CSV directory or a SQLite file.
pub fn load_dataset(path: impl AsRef<Path>) -> Result<Dataset> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(Error::DatasetNotFound {
            path: path.to_path_buf(),
        });
    }

    let dataset = if path.is_dir() {
        load_csv_dataset(path)?
    } else {
        load_sqlite_dataset(path)?
    };

    info!(
        path = %path.display(),
        locations = dataset.network.location_count(),
        segments = dataset.network.segment_count(),
        policies = dataset.policies.rules().len(),
        "dataset loaded"
    );
    Ok(dataset)
}

/// Load `locations.csv`, `segments.csv` and optional `cargo_policies.json` from `dir`.
pub fn load_csv_dataset(dir: &Path) -> Result<Dataset> {
    let locations = dir.join(LOCATIONS_FILE);
    let segments = dir.join(SEGMENTS_FILE);
    for required in [&locations, &segments] {
        if !required.is_file() {
            return Err(Error::DatasetNotFound {
                path: required.clone(),
            });
        }
    }

    let network = load_network_csv(fs::File::open(&locations)?, fs::File::open(&segments)?)?;

    let policies_path = dir.join(POLICIES_FILE);
    let policies = if policies_path.is_file() {
        CargoPolicyCatalog::from_path(&policies_path)?
    } else {
        debug!(path = %policies_path.display(), "no cargo policy catalog; using empty catalog");
        CargoPolicyCatalog::default()
    };

    Ok(Dataset { network, policies })
}

#[derive(Debug, Deserialize)]
struct LocationRecord {
    name: String,
    country_code: String,
    latitude: f64,
    longitude: f64,
}

#[derive(Debug, Deserialize)]
struct SegmentRecord {
    from: String,
    to: String,
    mode: String,
    time: f64,
    price: f64,
    #[serde(default)]
    distance: Option<f64>,
    #[serde(default)]
    co2: Option<f64>,
    #[serde(default)]
    bidirectional: Option<String>,
}

/// Build a network from CSV readers for locations and segments.
pub fn load_network_csv<L: Read, S: Read>(locations: L, segments: S) -> Result<Network> {
    let mut builder = NetworkBuilder::new();

    let mut reader = ReaderBuilder::new().trim(Trim::All).from_reader(locations);
    for record in reader.deserialize::<LocationRecord>() {
        let record = record?;
        builder.add_location(
            &record.name,
            &record.country_code,
            record.latitude,
            record.longitude,
        )?;
    }

    let mut reader = ReaderBuilder::new().trim(Trim::All).from_reader(segments);
    for record in reader.deserialize::<SegmentRecord>() {
        let record = record?;
        let mode = record.mode.parse::<TransportMode>().map_err(|_| {
            Error::invalid_dataset(format!(
                "segment {} -> {} has unknown mode '{}'",
                record.from, record.to, record.mode
            ))
        })?;
        let bidirectional = parse_flag(record.bidirectional.as_deref()).ok_or_else(|| {
            Error::invalid_dataset(format!(
                "segment {} -> {} has invalid bidirectional value '{}'",
                record.from,
                record.to,
                record.bidirectional.as_deref().unwrap_or_default()
            ))
        })?;

        builder.add_segment(SegmentSpec {
            from: record.from,
            to: record.to,
            mode,
            time_hours: record.time,
            price: record.price,
            distance_km: record.distance,
            co2_kg: record.co2,
            bidirectional,
        })?;
    }

    Ok(builder.build())
}

fn parse_flag(value: Option<&str>) -> Option<bool> {
    match value.map(str::trim).unwrap_or_default().to_ascii_lowercase().as_str() {
        "" | "0" | "false" | "no" => Some(false),
        "1" | "true" | "yes" => Some(true),
        _ => None,
    }
}
