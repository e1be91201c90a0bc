//! Search settings for the route service.
//!
//! # Environment Variables
//!
//! - `ROUTESYNC_NORMALIZATION`: `min-max` (default) or `raw`
//! - `ROUTESYNC_MAX_SPUR_SEARCHES`: spur search cap per request (default: 10000)
//! - `ROUTESYNC_SEARCH_BUDGET_MS`: wall-clock budget per request (default: 2000)
//!
//! Unparseable values fall back to the default with a warning.

use std::time::Duration;

use routesync_lib::{Normalization, ScoringPolicy, SearchLimits, SearchOptions};
use tracing::warn;

/// Search configuration read once at startup.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SearchConfig {
    pub normalization: Normalization,
    pub limits: SearchLimits,
}

impl SearchConfig {
    /// Create configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = SearchLimits::default();

        let normalization = parse_or_default(
            "ROUTESYNC_NORMALIZATION",
            lookup("ROUTESYNC_NORMALIZATION"),
            Normalization::default(),
        );
        let max_spur_searches = parse_or_default(
            "ROUTESYNC_MAX_SPUR_SEARCHES",
            lookup("ROUTESYNC_MAX_SPUR_SEARCHES"),
            defaults.max_spur_searches,
        );
        let budget_ms = parse_or_default(
            "ROUTESYNC_SEARCH_BUDGET_MS",
            lookup("ROUTESYNC_SEARCH_BUDGET_MS"),
            defaults.time_budget.as_millis() as u64,
        );

        Self {
            normalization,
            limits: SearchLimits {
                max_spur_searches,
                time_budget: Duration::from_millis(budget_ms),
            },
        }
    }

    /// Options passed to the planner for every request.
    pub fn search_options(&self) -> SearchOptions {
        SearchOptions {
            scoring: ScoringPolicy::default().with_normalization(self.normalization),
            limits: self.limits,
        }
    }
}

fn parse_or_default<T>(key: &str, value: Option<String>, default: T) -> T
where
    T: std::str::FromStr,
{
    match value {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!(key, value = %raw, "ignoring invalid configuration value");
            default
        }),
        None => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(pairs: &[(&str, &str)]) -> SearchConfig {
        let values: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        SearchConfig::from_lookup(|key| values.get(key).cloned())
    }

    #[test]
    fn test_search_config_defaults() {
        let config = config(&[]);
        assert_eq!(config, SearchConfig::default());
        assert_eq!(config.limits.time_budget, Duration::from_secs(2));
    }

    #[test]
    fn test_search_config_overrides() {
        let config = config(&[
            ("ROUTESYNC_NORMALIZATION", "raw"),
            ("ROUTESYNC_MAX_SPUR_SEARCHES", "250"),
            ("ROUTESYNC_SEARCH_BUDGET_MS", "500"),
        ]);
        assert_eq!(config.normalization, Normalization::Raw);
        assert_eq!(config.limits.max_spur_searches, 250);
        assert_eq!(config.limits.time_budget, Duration::from_millis(500));
        assert_eq!(
            config.search_options().scoring.normalization,
            Normalization::Raw
        );
    }

    #[test]
    fn test_search_config_invalid_values_fall_back() {
        let config = config(&[
            ("ROUTESYNC_NORMALIZATION", "log"),
            ("ROUTESYNC_MAX_SPUR_SEARCHES", "-3"),
        ]);
        assert_eq!(config.normalization, Normalization::default());
        assert_eq!(
            config.limits.max_spur_searches,
            SearchLimits::default().max_spur_searches
        );
    }
}
