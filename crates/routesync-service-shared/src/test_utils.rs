//! Test utilities for service handler testing.
//!
//! Provides a shared [`AppState`] loaded from the fixture network under
//! `docs/fixtures/network`.

use std::path::PathBuf;
use std::sync::OnceLock;

use routesync_lib::SearchOptions;

use crate::middleware::RequestId;
use crate::state::AppState;

/// Path to the fixture network directory.
pub const TEST_FIXTURE_PATH: &str =
    concat!(env!("CARGO_MANIFEST_DIR"), "/../../docs/fixtures/network");

static TEST_STATE: OnceLock<AppState> = OnceLock::new();

/// Get a shared test AppState loaded from the fixture network.
///
/// # Panics
///
/// Panics if the fixture cannot be loaded. This indicates a test
/// configuration issue.
pub fn test_state() -> AppState {
    TEST_STATE
        .get_or_init(|| {
            let path = fixture_path();
            AppState::load(&path, SearchOptions::default())
                .unwrap_or_else(|e| panic!("failed to load test fixture from {:?}: {}", path, e))
        })
        .clone()
}

pub fn fixture_path() -> PathBuf {
    PathBuf::from(TEST_FIXTURE_PATH)
}

/// Location names present in the fixture network.
pub mod fixture_locations {
    pub const SHANGHAI: &str = "Shanghai";
    pub const SHENZHEN: &str = "Shenzhen";
    pub const ROTTERDAM: &str = "Rotterdam";
    pub const HAMBURG: &str = "Hamburg";
    /// Prohibited for hazardous cargo in the fixture catalog.
    pub const MOSCOW: &str = "Moscow";
    pub const PARIS: &str = "Paris";
}

pub fn test_request_id() -> String {
    format!("test-{}", RequestId::generate())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_path_exists() {
        let path = fixture_path();
        assert!(path.is_dir(), "fixture network not found at {:?}", path);
    }

    #[test]
    fn test_state_contains_expected_locations() {
        let state = test_state();
        let network = state.network();

        for name in [
            fixture_locations::SHANGHAI,
            fixture_locations::ROTTERDAM,
            fixture_locations::MOSCOW,
        ] {
            assert!(network.location_id_by_name(name).is_some(), "{name} missing");
        }
        assert!(!state.policies().is_empty());
    }

    #[test]
    fn test_request_id_unique() {
        assert_ne!(test_request_id(), test_request_id());
    }
}
