use std::path::PathBuf;

use thiserror::Error;

/// Convenient result alias for the RouteSync library.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level library error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Dataset could not be located at the resolved path.
    #[error("dataset not found at {path}")]
    DatasetNotFound { path: PathBuf },

    /// No suitable project directories could be resolved for this platform.
    #[error("failed to resolve project directories for dataset location")]
    ProjectDirsUnavailable,

    /// Raised when attempting to load a SQLite schema that is not supported.
    #[error("unsupported dataset schema; expected locations and segments tables")]
    UnsupportedSchema,

    /// Raised when reference data fails validation while loading.
    #[error("invalid dataset: {message}")]
    InvalidDataset { message: String },

    /// Raised when a route request fails validation.
    #[error("invalid request field '{field}': {message}")]
    InvalidRequest { field: String, message: String },

    /// Raised when a location name could not be found in the network.
    #[error("unknown location name: {name}{}", format_suggestions(.suggestions))]
    UnknownLocation {
        name: String,
        suggestions: Vec<String>,
    },

    /// Raised when no path satisfies the request constraints.
    #[error("No paths found between {start} and {goal} with selected parameters.")]
    RouteNotFound { start: String, goal: String },

    /// Raised when the start or goal itself sits in an excluded country.
    #[error("No valid route: Start ({start}) or goal ({goal}) is in a banned country.")]
    UnreachableDueToPolicy { start: String, goal: String },

    /// Raised when the search exhausted its budget before finding any path.
    #[error("No paths found between {start} and {goal}: search budget exhausted after {explored} spur searches.")]
    SearchBudgetExceeded {
        start: String,
        goal: String,
        explored: usize,
    },

    /// Wrapper for SQLite errors.
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),

    /// Wrapper for CSV parsing errors.
    #[error(transparent)]
    Csv(#[from] csv::Error),

    /// Wrapper for JSON parsing errors.
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// Wrapper for IO errors.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether this error is a "no path" domain outcome rather than a failure.
    ///
    /// These are reported inside the normal response envelope instead of as
    /// request errors.
    pub fn is_no_path(&self) -> bool {
        matches!(
            self,
            Error::RouteNotFound { .. }
                | Error::UnreachableDueToPolicy { .. }
                | Error::SearchBudgetExceeded { .. }
        )
    }

    pub(crate) fn invalid_request(field: &str, message: impl Into<String>) -> Self {
        Error::InvalidRequest {
            field: field.to_string(),
            message: message.into(),
        }
    }

    pub(crate) fn invalid_dataset(message: impl Into<String>) -> Self {
        Error::InvalidDataset {
            message: message.into(),
        }
    }
}

fn format_suggestions(suggestions: &[String]) -> String {
    if suggestions.is_empty() {
        String::new()
    } else if suggestions.len() == 1 {
        format!(". Did you mean '{}'?", suggestions[0])
    } else {
        format!(
            ". Did you mean one of: {}?",
            suggestions
                .iter()
                .map(|s| format!("'{}'", s))
                .collect::<Vec<_>>()
                .join(", ")
        )
    }
}
