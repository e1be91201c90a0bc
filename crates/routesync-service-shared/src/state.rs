//! Application state for HTTP services.
//!
//! This module provides the shared state structure that axum handlers use to
//! access the loaded network, cargo policy catalog and search settings.

use std::path::Path;
use std::sync::Arc;

use routesync_lib::{load_dataset, CargoPolicyCatalog, Dataset, Network, SearchOptions};
use routesync_lib::Error as LibError;

/// Error during application state initialization.
#[derive(Debug)]
pub enum AppStateError {
    /// Failed to load the dataset.
    DatasetLoad(LibError),

    /// Dataset path does not exist.
    DatasetNotFound(String),
}

impl std::fmt::Display for AppStateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DatasetLoad(e) => write!(f, "failed to load dataset: {}", e),
            Self::DatasetNotFound(path) => write!(f, "dataset not found: {}", path),
        }
    }
}

impl std::error::Error for AppStateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::DatasetLoad(e) => Some(e),
            Self::DatasetNotFound(_) => None,
        }
    }
}

impl From<LibError> for AppStateError {
    fn from(err: LibError) -> Self {
        Self::DatasetLoad(err)
    }
}

/// Shared application state for all axum handlers.
///
/// This struct is cheaply cloneable (using `Arc` internally) and should be
/// shared via axum's `State` extractor. Handlers only read from it.
///
/// # Example
///
/// ```ignore
/// use axum::{Router, routing::get, extract::State};
/// use routesync_service_shared::AppState;
///
/// async fn handler(State(state): State<AppState>) {
///     let network = state.network();
///     // ... use network
/// }
///
/// let state = AppState::load("/data/routesync", SearchOptions::default()).unwrap();
/// let app = Router::new()
///     .route("/locations", get(handler))
///     .with_state(state);
/// ```
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    dataset: Dataset,
    options: SearchOptions,
}

impl AppState {
    /// Load application state from a CSV directory or SQLite file.
    pub fn load(path: impl AsRef<Path>, options: SearchOptions) -> Result<Self, AppStateError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(AppStateError::DatasetNotFound(path.display().to_string()));
        }

        tracing::info!(path = %path.display(), "loading dataset");
        let dataset = load_dataset(path)?;

        Ok(Self::from_components(dataset, options))
    }

    /// Create application state from a pre-loaded dataset.
    pub fn from_components(dataset: Dataset, options: SearchOptions) -> Self {
        Self {
            inner: Arc::new(AppStateInner { dataset, options }),
        }
    }

    /// Access the loaded location network.
    pub fn network(&self) -> &Network {
        &self.inner.dataset.network
    }

    /// Access the cargo policy catalog.
    pub fn policies(&self) -> &CargoPolicyCatalog {
        &self.inner.dataset.policies
    }

    /// Search settings applied to every request.
    pub fn options(&self) -> &SearchOptions {
        &self.inner.options
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("location_count", &self.network().location_count())
            .field("segment_count", &self.network().segment_count())
            .field("policy_rules", &self.policies().rules().len())
            .finish()
    }
}
