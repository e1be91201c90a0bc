//! Location graph store.
//!
//! A [`Network`] holds every known location (with its country) and the
//! directed transport segments between them. It is built once through a
//! [`NetworkBuilder`] and never mutated afterwards, so it can be shared across
//! concurrent searches behind an `Arc`.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Index of a location within a [`Network`].
pub type LocationId = usize;

/// Index of a segment within a [`Network`].
pub type SegmentId = usize;

/// Mean Earth radius used for great-circle distances.
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Minimum Jaro-Winkler similarity for a name to be offered as a suggestion.
const SUGGESTION_THRESHOLD: f64 = 0.8;

/// ISO 3166-1 alpha-2 country code, stored uppercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CountryCode(String);

impl CountryCode {
    /// Parse a two-letter code, normalising it to uppercase.
    pub fn parse(value: &str) -> Result<Self> {
        let trimmed = value.trim();
        if trimmed.len() != 2 || !trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(Error::invalid_request(
                "country_code",
                format!("'{}' is not a two-letter ISO country code", value),
            ));
        }
        Ok(Self(trimmed.to_ascii_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CountryCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for CountryCode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for CountryCode {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<CountryCode> for String {
    fn from(value: CountryCode) -> Self {
        value.0
    }
}

/// Transport category of a segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportMode {
    Land,
    Sea,
    Air,
}

impl TransportMode {
    /// Every supported mode, in tie-break order.
    pub const ALL: [TransportMode; 3] = [TransportMode::Land, TransportMode::Sea, TransportMode::Air];

    /// CO2 emitted per kilometre travelled, in kilograms.
    pub fn emission_factor(self) -> f64 {
        match self {
            TransportMode::Sea => 0.01,
            TransportMode::Land => 0.1,
            TransportMode::Air => 0.7,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TransportMode::Land => "land",
            TransportMode::Sea => "sea",
            TransportMode::Air => "air",
        }
    }
}

impl fmt::Display for TransportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransportMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "land" => Ok(TransportMode::Land),
            "sea" => Ok(TransportMode::Sea),
            "air" => Ok(TransportMode::Air),
            other => Err(Error::invalid_request(
                "allowed_modes",
                format!("unknown transport mode '{}'; expected land, sea or air", other),
            )),
        }
    }
}

/// Geographic coordinates in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPosition {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPosition {
    /// Great-circle (haversine) distance to another position in kilometres.
    pub fn distance_km(&self, other: &Self) -> f64 {
        let dlat = (other.latitude - self.latitude).to_radians();
        let dlon = (other.longitude - self.longitude).to_radians();
        let a = (dlat / 2.0).sin().powi(2)
            + self.latitude.to_radians().cos()
                * other.latitude.to_radians().cos()
                * (dlon / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
        EARTH_RADIUS_KM * c
    }
}

/// A named location (city, port or airport).
#[derive(Debug, Clone, PartialEq)]
pub struct Location {
    pub id: LocationId,
    pub name: String,
    pub country: CountryCode,
    pub position: GeoPosition,
}

/// A directed transport link between two locations.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub id: SegmentId,
    pub from: LocationId,
    pub to: LocationId,
    pub mode: TransportMode,
    pub time_hours: f64,
    pub price: f64,
    pub distance_km: f64,
    pub co2_kg: f64,
}

/// Observed minimum and maximum of a segment metric across the network.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricRange {
    pub min: f64,
    pub max: f64,
}

impl MetricRange {
    fn empty() -> Self {
        Self { min: 0.0, max: 0.0 }
    }

    fn include(&mut self, value: f64, first: bool) {
        if first {
            self.min = value;
            self.max = value;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);
        }
    }

    /// Min-max normalise `value` onto `[0, scale]`. A degenerate range maps to zero.
    pub fn normalize(&self, value: f64, scale: f64) -> f64 {
        let span = self.max - self.min;
        if span <= f64::EPSILON {
            return 0.0;
        }
        (value - self.min) / span * scale
    }
}

/// Input describing a segment to add to a [`NetworkBuilder`].
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentSpec {
    pub from: String,
    pub to: String,
    pub mode: TransportMode,
    pub time_hours: f64,
    pub price: f64,
    /// Derived from the endpoint coordinates when absent.
    pub distance_km: Option<f64>,
    /// Derived from distance and mode emission factor when absent.
    pub co2_kg: Option<f64>,
    /// Also add the reverse segment with identical metrics.
    pub bidirectional: bool,
}

impl SegmentSpec {
    pub fn new(
        from: impl Into<String>,
        to: impl Into<String>,
        mode: TransportMode,
        time_hours: f64,
        price: f64,
    ) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            mode,
            time_hours,
            price,
            distance_km: None,
            co2_kg: None,
            bidirectional: false,
        }
    }

    pub fn distance(mut self, distance_km: f64) -> Self {
        self.distance_km = Some(distance_km);
        self
    }

    pub fn co2(mut self, co2_kg: f64) -> Self {
        self.co2_kg = Some(co2_kg);
        self
    }

    pub fn bidirectional(mut self) -> Self {
        self.bidirectional = true;
        self
    }
}

/// In-memory location graph.
#[derive(Debug, Clone, Default)]
pub struct Network {
    locations: Vec<Location>,
    segments: Vec<Segment>,
    outgoing: Vec<Vec<SegmentId>>,
    name_to_id: HashMap<String, LocationId>,
    time_range: Option<MetricRange>,
    price_range: Option<MetricRange>,
}

impl Network {
    /// Lookup a location by name.
    ///
    /// Exact matches win; otherwise a case-insensitive match is accepted when it
    /// is unambiguous.
    pub fn location_id_by_name(&self, name: &str) -> Option<LocationId> {
        let name = name.trim();
        if let Some(id) = self.name_to_id.get(name) {
            return Some(*id);
        }
        let mut matches = self
            .locations
            .iter()
            .filter(|location| location.name.eq_ignore_ascii_case(name));
        match (matches.next(), matches.next()) {
            (Some(location), None) => Some(location.id),
            _ => None,
        }
    }

    /// Resolve a location name, producing suggestions when it is unknown.
    pub fn resolve(&self, name: &str) -> Result<LocationId> {
        self.location_id_by_name(name).ok_or_else(|| {
            let suggestions = self.fuzzy_location_matches(name, 3);
            Error::UnknownLocation {
                name: name.to_string(),
                suggestions,
            }
        })
    }

    /// Names of locations similar to `name`, best match first.
    pub fn fuzzy_location_matches(&self, name: &str, limit: usize) -> Vec<String> {
        let needle = name.trim().to_lowercase();
        let mut scored: Vec<(f64, &str)> = self
            .locations
            .iter()
            .map(|location| {
                let score = strsim::jaro_winkler(&needle, &location.name.to_lowercase());
                (score, location.name.as_str())
            })
            .filter(|(score, _)| *score >= SUGGESTION_THRESHOLD)
            .collect();

        scored.sort_by(|a, b| b.0.total_cmp(&a.0).then_with(|| a.1.cmp(b.1)));
        scored
            .into_iter()
            .take(limit)
            .map(|(_, name)| name.to_string())
            .collect()
    }

    pub fn location(&self, id: LocationId) -> Option<&Location> {
        self.locations.get(id)
    }

    /// Lookup a location name by identifier.
    pub fn location_name(&self, id: LocationId) -> Option<&str> {
        self.locations.get(id).map(|location| location.name.as_str())
    }

    pub fn segment(&self, id: SegmentId) -> Option<&Segment> {
        self.segments.get(id)
    }

    pub fn locations(&self) -> &[Location] {
        &self.locations
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Segments leaving `location`, in insertion order.
    pub fn outgoing(&self, location: LocationId) -> impl Iterator<Item = &Segment> + '_ {
        self.outgoing
            .get(location)
            .map(Vec::as_slice)
            .unwrap_or(&[])
            .iter()
            .filter_map(|&id| self.segments.get(id))
    }

    /// Locations sorted by name, filtered by country code and a
    /// case-insensitive name substring when given.
    pub fn find_locations(&self, country: Option<&str>, search: Option<&str>) -> Vec<&Location> {
        let country = country.map(str::trim).filter(|c| !c.is_empty());
        let needle = search
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty());

        let mut found: Vec<&Location> = self
            .locations
            .iter()
            .filter(|location| {
                country.is_none_or(|c| location.country.as_str().eq_ignore_ascii_case(c))
            })
            .filter(|location| {
                needle
                    .as_deref()
                    .is_none_or(|n| location.name.to_lowercase().contains(n))
            })
            .collect();
        found.sort_by(|a, b| a.name.cmp(&b.name));
        found
    }

    pub fn location_count(&self) -> usize {
        self.locations.len()
    }

    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// Range of segment travel times, `None` for an empty network.
    pub fn time_range(&self) -> Option<MetricRange> {
        self.time_range
    }

    /// Range of segment prices, `None` for an empty network.
    pub fn price_range(&self) -> Option<MetricRange> {
        self.price_range
    }
}

/// Incremental, validating constructor for [`Network`].
#[derive(Debug, Default)]
pub struct NetworkBuilder {
    network: Network,
}

impl NetworkBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a location, returning its identifier.
    pub fn add_location(
        &mut self,
        name: &str,
        country: &str,
        latitude: f64,
        longitude: f64,
    ) -> Result<LocationId> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::invalid_dataset("location name cannot be empty"));
        }
        if self.network.name_to_id.contains_key(name) {
            return Err(Error::invalid_dataset(format!(
                "duplicate location name '{}'",
                name
            )));
        }
        let country = CountryCode::parse(country).map_err(|_| {
            Error::invalid_dataset(format!(
                "location '{}' has invalid country code '{}'",
                name, country
            ))
        })?;
        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            return Err(Error::invalid_dataset(format!(
                "location '{}' has out-of-range coordinates ({}, {})",
                name, latitude, longitude
            )));
        }

        let id = self.network.locations.len();
        self.network.locations.push(Location {
            id,
            name: name.to_string(),
            country,
            position: GeoPosition {
                latitude,
                longitude,
            },
        });
        self.network.outgoing.push(Vec::new());
        self.network.name_to_id.insert(name.to_string(), id);
        Ok(id)
    }

    /// Add a segment (and its reverse when `bidirectional` is set).
    pub fn add_segment(&mut self, spec: SegmentSpec) -> Result<()> {
        let label = format!("{} -> {} ({})", spec.from, spec.to, spec.mode);
        let from = self.lookup(&spec.from, &label)?;
        let to = self.lookup(&spec.to, &label)?;
        if from == to {
            return Err(Error::invalid_dataset(format!(
                "segment {} is a self-loop",
                label
            )));
        }

        let distance_km = match spec.distance_km {
            Some(distance) => distance,
            None => {
                let a = self.network.locations[from].position;
                let b = self.network.locations[to].position;
                a.distance_km(&b)
            }
        };
        let co2_kg = spec
            .co2_kg
            .unwrap_or(distance_km * spec.mode.emission_factor());

        for (name, value) in [
            ("time", spec.time_hours),
            ("price", spec.price),
            ("distance", distance_km),
            ("co2", co2_kg),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::invalid_dataset(format!(
                    "segment {} has invalid {} value {}",
                    label, name, value
                )));
            }
        }

        self.push_segment(from, to, spec.mode, spec.time_hours, spec.price, distance_km, co2_kg);
        if spec.bidirectional {
            self.push_segment(to, from, spec.mode, spec.time_hours, spec.price, distance_km, co2_kg);
        }
        Ok(())
    }

    /// Finish construction, computing metric ranges for normalisation.
    pub fn build(mut self) -> Network {
        let mut time = MetricRange::empty();
        let mut price = MetricRange::empty();
        for (index, segment) in self.network.segments.iter().enumerate() {
            time.include(segment.time_hours, index == 0);
            price.include(segment.price, index == 0);
        }
        if !self.network.segments.is_empty() {
            self.network.time_range = Some(time);
            self.network.price_range = Some(price);
        }
        self.network
    }

    fn lookup(&self, name: &str, label: &str) -> Result<LocationId> {
        self.network
            .name_to_id
            .get(name.trim())
            .copied()
            .ok_or_else(|| {
                Error::invalid_dataset(format!(
                    "segment {} references unknown location '{}'",
                    label, name
                ))
            })
    }

    #[allow(clippy::too_many_arguments)]
    fn push_segment(
        &mut self,
        from: LocationId,
        to: LocationId,
        mode: TransportMode,
        time_hours: f64,
        price: f64,
        distance_km: f64,
        co2_kg: f64,
    ) {
        let id = self.network.segments.len();
        self.network.segments.push(Segment {
            id,
            from,
            to,
            mode,
            time_hours,
            price,
            distance_km,
            co2_kg,
        });
        self.network.outgoing[from].push(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> Network {
        let mut builder = NetworkBuilder::new();
        builder.add_location("Rotterdam", "nl", 51.92, 4.48).unwrap();
        builder.add_location("Hamburg", "DE", 53.55, 9.99).unwrap();
        builder.add_location("Shanghai", "CN", 31.23, 121.47).unwrap();
        builder
            .add_segment(
                SegmentSpec::new("Rotterdam", "Hamburg", TransportMode::Land, 6.0, 900.0)
                    .distance(410.0)
                    .bidirectional(),
            )
            .unwrap();
        builder
            .add_segment(SegmentSpec::new(
                "Hamburg",
                "Shanghai",
                TransportMode::Sea,
                720.0,
                2400.0,
            ))
            .unwrap();
        builder.build()
    }

    #[test]
    fn country_codes_normalise_to_uppercase() {
        let code = CountryCode::parse(" de ").unwrap();
        assert_eq!(code.as_str(), "DE");
        assert!(CountryCode::parse("DEU").is_err());
        assert!(CountryCode::parse("D1").is_err());
    }

    #[test]
    fn find_locations_filters_and_sorts() {
        let network = triangle();
        let names = |found: Vec<&Location>| -> Vec<String> {
            found.into_iter().map(|l| l.name.clone()).collect()
        };

        assert_eq!(
            names(network.find_locations(None, None)),
            vec!["Hamburg", "Rotterdam", "Shanghai"]
        );
        assert_eq!(names(network.find_locations(Some("nl"), None)), vec!["Rotterdam"]);
        assert_eq!(names(network.find_locations(None, Some("HA"))), vec!["Hamburg", "Shanghai"]);
        assert!(network.find_locations(Some("US"), None).is_empty());
    }

    #[test]
    fn transport_mode_parses_case_insensitively() {
        assert_eq!("SEA".parse::<TransportMode>().unwrap(), TransportMode::Sea);
        assert!("rail".parse::<TransportMode>().is_err());
    }

    #[test]
    fn bidirectional_segments_add_reverse_edge() {
        let network = triangle();
        assert_eq!(network.segment_count(), 3);
        let hamburg = network.location_id_by_name("Hamburg").unwrap();
        let targets: Vec<&str> = network
            .outgoing(hamburg)
            .map(|s| network.location_name(s.to).unwrap())
            .collect();
        assert_eq!(targets, vec!["Rotterdam", "Shanghai"]);
    }

    #[test]
    fn missing_distance_and_co2_are_derived() {
        let network = triangle();
        let sea = network
            .segments()
            .iter()
            .find(|s| s.mode == TransportMode::Sea)
            .unwrap();
        // Hamburg to Shanghai is roughly 8,500 km as the crow flies.
        assert!(sea.distance_km > 8_000.0 && sea.distance_km < 9_000.0);
        assert!((sea.co2_kg - sea.distance_km * 0.01).abs() < 1e-9);
    }

    #[test]
    fn metric_ranges_cover_all_segments() {
        let network = triangle();
        let time = network.time_range().unwrap();
        assert_eq!(time.min, 6.0);
        assert_eq!(time.max, 720.0);
        assert_eq!(time.normalize(720.0, 100.0), 100.0);
        assert_eq!(time.normalize(6.0, 100.0), 0.0);
    }

    #[test]
    fn degenerate_range_normalises_to_zero() {
        let range = MetricRange { min: 5.0, max: 5.0 };
        assert_eq!(range.normalize(5.0, 100.0), 0.0);
    }

    #[test]
    fn lookup_falls_back_to_case_insensitive() {
        let network = triangle();
        assert_eq!(network.location_id_by_name("hamburg"), Some(1));
        assert_eq!(network.location_id_by_name("Hamburg"), Some(1));
        assert_eq!(network.location_id_by_name("Berlin"), None);
    }

    #[test]
    fn unknown_location_suggests_close_names() {
        let network = triangle();
        let err = network.resolve("Hambrug").unwrap_err();
        match err {
            Error::UnknownLocation { suggestions, .. } => {
                assert_eq!(suggestions.first().map(String::as_str), Some("Hamburg"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn rejects_invalid_segments() {
        let mut builder = NetworkBuilder::new();
        builder.add_location("A", "US", 0.0, 0.0).unwrap();
        builder.add_location("B", "DE", 1.0, 1.0).unwrap();
        assert!(builder
            .add_segment(SegmentSpec::new("A", "A", TransportMode::Land, 1.0, 1.0))
            .is_err());
        assert!(builder
            .add_segment(SegmentSpec::new("A", "C", TransportMode::Land, 1.0, 1.0))
            .is_err());
        assert!(builder
            .add_segment(SegmentSpec::new("A", "B", TransportMode::Land, -1.0, 1.0))
            .is_err());
        assert!(builder.add_location("A", "US", 0.0, 0.0).is_err());
        assert!(builder.add_location("Z", "USA", 0.0, 0.0).is_err());
        assert!(builder.add_location("Y", "US", 91.0, 0.0).is_err());
    }

    #[test]
    fn haversine_matches_known_distance() {
        let paris = GeoPosition {
            latitude: 48.8566,
            longitude: 2.3522,
        };
        let london = GeoPosition {
            latitude: 51.5074,
            longitude: -0.1278,
        };
        let d = paris.distance_km(&london);
        assert!((d - 343.5).abs() < 2.0, "got {d}");
    }
}
