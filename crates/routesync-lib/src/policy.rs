//! Country policy filter.
//!
//! Decides which countries a shipment must never touch and which ones it may
//! cross at a scoring penalty. The decision combines the caller's explicit
//! avoid-list with the countries that the [`CargoPolicyCatalog`] tags as
//! prohibited or restricted for the cargo, interpreted through the request's
//! [`PolicyFlag`]s.

use std::collections::BTreeSet;
use std::fs;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::network::{CountryCode, LocationId, Network};

/// How strictly to treat countries tagged by the cargo policy catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PolicyFlag {
    /// Allow the country but penalise routes that enter it.
    #[serde(alias = "penalty")]
    Avoid,
    /// Remove the country from the search entirely.
    Strict,
    /// No effect.
    #[default]
    #[serde(alias = "allow")]
    Ignore,
}

impl std::fmt::Display for PolicyFlag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let value = match self {
            PolicyFlag::Avoid => "avoid",
            PolicyFlag::Strict => "strict",
            PolicyFlag::Ignore => "ignore",
        };
        f.write_str(value)
    }
}

impl std::str::FromStr for PolicyFlag {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "avoid" | "penalty" => Ok(PolicyFlag::Avoid),
            "strict" => Ok(PolicyFlag::Strict),
            "ignore" | "allow" => Ok(PolicyFlag::Ignore),
            other => Err(Error::invalid_request(
                "policy_flag",
                format!("unknown policy flag '{}'; expected avoid, strict or ignore", other),
            )),
        }
    }
}

/// One entry of the cargo policy catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CargoPolicyRule {
    /// Cargo type this rule applies to (case-insensitive).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cargo_type: Option<String>,
    /// Words or phrases that trigger the rule when found in the description.
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub prohibited_in: Vec<CountryCode>,
    #[serde(default)]
    pub restricted_in: Vec<CountryCode>,
}

impl CargoPolicyRule {
    fn matches(&self, cargo_type: &str, description_words: &[String]) -> bool {
        let type_match = self
            .cargo_type
            .as_deref()
            .map(|t| !t.trim().is_empty() && t.trim().eq_ignore_ascii_case(cargo_type.trim()))
            .unwrap_or(false);

        type_match
            || self.keywords.iter().any(|keyword| {
                let phrase = tokenize(keyword);
                !phrase.is_empty()
                    && description_words
                        .windows(phrase.len())
                        .any(|window| window == phrase.as_slice())
            })
    }
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    rules: Vec<CargoPolicyRule>,
}

/// Countries tagged for a particular shipment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CargoClassification {
    pub prohibited_in: BTreeSet<CountryCode>,
    pub restricted_in: BTreeSet<CountryCode>,
}

/// Reference data listing where kinds of cargo are prohibited or restricted.
#[derive(Debug, Clone, Default)]
pub struct CargoPolicyCatalog {
    rules: Vec<CargoPolicyRule>,
}

impl CargoPolicyCatalog {
    pub fn from_rules(rules: Vec<CargoPolicyRule>) -> Self {
        Self { rules }
    }

    /// Load a catalog from a JSON file of the form `{"rules": [...]}`.
    pub fn from_path(path: &Path) -> Result<Self> {
        let file = fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let parsed: CatalogFile = serde_json::from_reader(reader)?;
        Ok(Self {
            rules: parsed.rules,
        })
    }

    pub fn rules(&self) -> &[CargoPolicyRule] {
        &self.rules
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Collect the prohibited/restricted countries of every rule matching the cargo.
    pub fn classify(&self, cargo_type: &str, description: &str) -> CargoClassification {
        let words = tokenize(description);
        let mut classification = CargoClassification::default();
        for rule in self.rules.iter().filter(|rule| rule.matches(cargo_type, &words)) {
            classification
                .prohibited_in
                .extend(rule.prohibited_in.iter().cloned());
            classification
                .restricted_in
                .extend(rule.restricted_in.iter().cloned());
        }
        classification
    }
}

fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Caller-supplied country constraints.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CountryPolicy {
    pub avoid_countries: BTreeSet<CountryCode>,
    pub prohibited_flag: PolicyFlag,
    pub restricted_flag: PolicyFlag,
}

impl CountryPolicy {
    /// Whether the cargo catalog needs to be consulted at all.
    pub fn uses_catalog(&self) -> bool {
        self.prohibited_flag != PolicyFlag::Ignore || self.restricted_flag != PolicyFlag::Ignore
    }

    /// Combine the avoid-list and the cargo classification into a decision.
    pub fn decide(&self, classification: &CargoClassification) -> PolicyDecision {
        let mut excluded = self.avoid_countries.clone();
        let mut penalized = BTreeSet::new();

        for (flag, countries) in [
            (self.prohibited_flag, &classification.prohibited_in),
            (self.restricted_flag, &classification.restricted_in),
        ] {
            match flag {
                PolicyFlag::Strict => excluded.extend(countries.iter().cloned()),
                PolicyFlag::Avoid => penalized.extend(countries.iter().cloned()),
                PolicyFlag::Ignore => {}
            }
        }

        penalized.retain(|country| !excluded.contains(country));
        PolicyDecision {
            excluded,
            penalized,
        }
    }
}

/// Hard exclusions and soft penalties for one request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PolicyDecision {
    excluded: BTreeSet<CountryCode>,
    penalized: BTreeSet<CountryCode>,
}

impl PolicyDecision {
    pub fn is_excluded(&self, country: &CountryCode) -> bool {
        self.excluded.contains(country)
    }

    pub fn is_penalized(&self, country: &CountryCode) -> bool {
        self.penalized.contains(country)
    }

    /// Whether `location` may appear in a path at all.
    pub fn allows_location(&self, network: &Network, location: LocationId) -> bool {
        network
            .location(location)
            .map(|loc| !self.is_excluded(&loc.country))
            .unwrap_or(false)
    }

    /// Fail when either endpoint lies in an excluded country.
    pub fn check_endpoints(
        &self,
        network: &Network,
        start: LocationId,
        goal: LocationId,
    ) -> Result<()> {
        if self.allows_location(network, start) && self.allows_location(network, goal) {
            return Ok(());
        }
        Err(Error::UnreachableDueToPolicy {
            start: network.location_name(start).unwrap_or_default().to_string(),
            goal: network.location_name(goal).unwrap_or_default().to_string(),
        })
    }

    /// Hard-excluded countries, sorted.
    pub fn avoided_countries(&self) -> Vec<String> {
        self.excluded.iter().map(|c| c.to_string()).collect()
    }

    /// Penalised (but allowed) countries, sorted.
    pub fn penalty_countries(&self) -> Vec<String> {
        self.penalized.iter().map(|c| c.to_string()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code(value: &str) -> CountryCode {
        CountryCode::parse(value).unwrap()
    }

    fn catalog() -> CargoPolicyCatalog {
        CargoPolicyCatalog::from_reader(
            r#"{"rules":[
                {"cargo_type":"hazardous","prohibited_in":["RU"],"restricted_in":["DE"]},
                {"keywords":["lithium battery","firearms"],"prohibited_in":["CN"],"restricted_in":["FR","DE"]}
            ]}"#
            .as_bytes(),
        )
        .unwrap()
    }

    #[test]
    fn flags_accept_frontend_aliases() {
        let flag: PolicyFlag = serde_json::from_str("\"penalty\"").unwrap();
        assert_eq!(flag, PolicyFlag::Avoid);
        let flag: PolicyFlag = serde_json::from_str("\"allow\"").unwrap();
        assert_eq!(flag, PolicyFlag::Ignore);
        assert_eq!("STRICT".parse::<PolicyFlag>().unwrap(), PolicyFlag::Strict);
        assert!("sometimes".parse::<PolicyFlag>().is_err());
    }

    #[test]
    fn classify_matches_cargo_type_case_insensitively() {
        let result = catalog().classify("Hazardous", "");
        assert!(result.prohibited_in.contains(&code("RU")));
        assert!(result.restricted_in.contains(&code("DE")));
        assert!(!result.prohibited_in.contains(&code("CN")));
    }

    #[test]
    fn classify_matches_keyword_phrases_on_word_boundaries() {
        let result = catalog().classify("general", "Pallets of Lithium-Battery packs");
        assert!(result.prohibited_in.contains(&code("CN")));

        let miss = catalog().classify("general", "lithium batteryless torches");
        assert!(miss.prohibited_in.is_empty());
    }

    #[test]
    fn strict_flags_exclude_and_avoid_flags_penalise() {
        let classification = catalog().classify("hazardous", "firearms");
        let policy = CountryPolicy {
            avoid_countries: [code("US")].into_iter().collect(),
            prohibited_flag: PolicyFlag::Strict,
            restricted_flag: PolicyFlag::Avoid,
        };
        let decision = policy.decide(&classification);
        assert_eq!(decision.avoided_countries(), vec!["CN", "RU", "US"]);
        assert_eq!(decision.penalty_countries(), vec!["DE", "FR"]);
    }

    #[test]
    fn exclusion_wins_over_penalty() {
        let classification = CargoClassification {
            prohibited_in: [code("DE")].into_iter().collect(),
            restricted_in: [code("DE"), code("FR")].into_iter().collect(),
        };
        let policy = CountryPolicy {
            avoid_countries: BTreeSet::new(),
            prohibited_flag: PolicyFlag::Strict,
            restricted_flag: PolicyFlag::Avoid,
        };
        let decision = policy.decide(&classification);
        assert!(decision.is_excluded(&code("DE")));
        assert!(!decision.is_penalized(&code("DE")));
        assert!(decision.is_penalized(&code("FR")));
    }

    #[test]
    fn ignore_flags_leave_only_the_avoid_list() {
        let classification = catalog().classify("hazardous", "firearms");
        let policy = CountryPolicy {
            avoid_countries: [code("NL")].into_iter().collect(),
            ..CountryPolicy::default()
        };
        assert!(!policy.uses_catalog());
        let decision = policy.decide(&classification);
        assert_eq!(decision.avoided_countries(), vec!["NL"]);
        assert!(decision.penalty_countries().is_empty());
    }
}
