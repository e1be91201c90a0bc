//! Edge cost model used for ranking.
//!
//! Travel time and price are put on a comparable scale according to the
//! configured [`Normalization`], weighted by the request, and topped up with
//! country and border penalties.

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::network::{MetricRange, Network, Segment};
use crate::policy::PolicyDecision;

/// Scale applied by min-max normalisation when none is configured.
pub const DEFAULT_NORMALIZATION_SCALE: f64 = 100.0;

/// How raw segment metrics are mapped before weighting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Normalization {
    /// `(x - min) / (max - min) * scale`, with min/max taken over the whole network.
    MinMax { scale: f64 },
    /// Hours and price units are used as-is.
    Raw,
}

impl Default for Normalization {
    fn default() -> Self {
        Normalization::MinMax {
            scale: DEFAULT_NORMALIZATION_SCALE,
        }
    }
}

impl fmt::Display for Normalization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Normalization::MinMax { .. } => f.write_str("min-max"),
            Normalization::Raw => f.write_str("raw"),
        }
    }
}

impl FromStr for Normalization {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "min-max" | "minmax" | "min_max" => Ok(Normalization::default()),
            "raw" => Ok(Normalization::Raw),
            other => Err(Error::invalid_request(
                "normalization",
                format!("unknown normalization '{}'; expected min-max or raw", other),
            )),
        }
    }
}

/// Tunables for the combined score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringPolicy {
    pub normalization: Normalization,
    /// Added when a segment enters a penalty country.
    pub country_penalty: f64,
    /// Added when a segment crosses from one country into another.
    pub border_penalty: f64,
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self {
            normalization: Normalization::default(),
            country_penalty: 1.0,
            border_penalty: 1.0,
        }
    }
}

impl ScoringPolicy {
    pub fn with_normalization(mut self, normalization: Normalization) -> Self {
        self.normalization = normalization;
        self
    }
}

/// Per-request cost function over network segments.
#[derive(Debug, Clone, Copy)]
pub struct CostModel<'a> {
    network: &'a Network,
    decision: &'a PolicyDecision,
    scoring: ScoringPolicy,
    time_weight: f64,
    price_weight: f64,
}

impl<'a> CostModel<'a> {
    pub fn new(
        network: &'a Network,
        decision: &'a PolicyDecision,
        scoring: ScoringPolicy,
        time_weight: f64,
        price_weight: f64,
    ) -> Self {
        Self {
            network,
            decision,
            scoring,
            time_weight,
            price_weight,
        }
    }

    /// Combined cost of traversing `segment`.
    pub fn segment_cost(&self, segment: &Segment) -> f64 {
        let time = self.normalize(segment.time_hours, self.network.time_range());
        let price = self.normalize(segment.price, self.network.price_range());
        self.time_weight * time + self.price_weight * price + self.penalty(segment)
    }

    /// Country and border penalties for `segment`.
    pub fn penalty(&self, segment: &Segment) -> f64 {
        let (Some(from), Some(to)) = (
            self.network.location(segment.from),
            self.network.location(segment.to),
        ) else {
            return 0.0;
        };

        let mut penalty = 0.0;
        if self.decision.is_penalized(&to.country) {
            penalty += self.scoring.country_penalty;
        }
        if from.country != to.country {
            penalty += self.scoring.border_penalty;
        }
        penalty
    }

    fn normalize(&self, value: f64, range: Option<MetricRange>) -> f64 {
        match self.scoring.normalization {
            Normalization::Raw => value,
            Normalization::MinMax { scale } => range
                .map(|range| range.normalize(value, scale))
                .unwrap_or(0.0),
        }
    }
}
