//! Country registry
//!
//! Static, immutable country facts keyed by canonical title-case name.
//! Lookups normalize the requested name first and then match exactly.

#[cfg(test)]
mod proptests;

use serde::Serialize;

/// A single country's facts
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountryRecord {
    pub name: &'static str,
    pub capital: &'static str,
    pub population: u64,
    /// Surface area in km²
    pub area: f64,
}

impl CountryRecord {
    /// People per km²
    #[allow(clippy::cast_precision_loss)] // populations are far below 2^52
    pub fn density(&self) -> f64 {
        self.population as f64 / self.area
    }
}

const BUILTIN_COUNTRIES: &[CountryRecord] = &[
    CountryRecord {
        name: "Brazil",
        capital: "Brasília",
        population: 214_300_000,
        area: 8_515_770.0,
    },
    CountryRecord {
        name: "France",
        capital: "Paris",
        population: 67_390_000,
        area: 551_695.0,
    },
    CountryRecord {
        name: "Japan",
        capital: "Tokyo",
        population: 125_700_000,
        area: 377_975.0,
    },
    CountryRecord {
        name: "Canada",
        capital: "Ottawa",
        population: 38_250_000,
        area: 9_984_670.0,
    },
    CountryRecord {
        name: "Germany",
        capital: "Berlin",
        population: 83_240_000,
        area: 357_022.0,
    },
];

/// Read-only lookup table of countries
#[derive(Debug, Clone)]
pub struct CountryRegistry {
    records: Vec<CountryRecord>,
}

impl Default for CountryRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl CountryRegistry {
    /// The five countries the assistant knows about
    pub fn builtin() -> Self {
        Self {
            records: BUILTIN_COUNTRIES.to_vec(),
        }
    }

    /// Registry over an arbitrary record set (for testing)
    #[allow(dead_code)] // Used in tests
    pub fn from_records(records: Vec<CountryRecord>) -> Self {
        Self { records }
    }

    /// Look up a country by name.
    ///
    /// Returns `None` when the normalized name is not an exact registry key.
    /// There is no fuzzy or partial matching.
    pub fn lookup(&self, name: &str) -> Option<&CountryRecord> {
        let wanted = normalize_name(name);
        self.records.iter().find(|r| r.name == wanted)
    }

    /// All records in registry order
    pub fn iter(&self) -> impl Iterator<Item = &CountryRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }
}

/// Trim, collapse internal whitespace and title-case every word.
pub fn normalize_name(name: &str) -> String {
    name.split_whitespace()
        .map(title_case_word)
        .collect::<Vec<_>>()
        .join(" ")
}

fn title_case_word(word: &str) -> String {
    let mut out = String::with_capacity(word.len());
    let mut at_word_start = true;
    for c in word.chars() {
        if c.is_alphabetic() {
            if at_word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(c);
            at_word_start = true;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_exact() {
        let registry = CountryRegistry::builtin();
        let record = registry.lookup("Brazil").unwrap();
        assert_eq!(record.capital, "Brasília");
        assert_eq!(record.population, 214_300_000);
    }

    #[test]
    fn test_lookup_normalizes_case_and_whitespace() {
        let registry = CountryRegistry::builtin();
        assert_eq!(registry.lookup("  japan ").unwrap().name, "Japan");
        assert_eq!(registry.lookup("GERMANY").unwrap().name, "Germany");
    }

    #[test]
    fn test_lookup_not_found() {
        let registry = CountryRegistry::builtin();
        assert!(registry.lookup("Atlantis").is_none());
        assert!(registry.lookup("").is_none());
        // No partial matching
        assert!(registry.lookup("Bra").is_none());
        assert!(registry.lookup("Brazil Has").is_none());
    }

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("united   states"), "United States");
        assert_eq!(normalize_name("  cÔte d'ivoire "), "Côte D'Ivoire");
        assert_eq!(normalize_name(""), "");
    }

    #[test]
    fn test_density() {
        let registry = CountryRegistry::builtin();
        let japan = registry.lookup("Japan").unwrap();
        assert!((japan.density() - 332.5616).abs() < 0.001);
    }

    #[test]
    fn test_from_records() {
        let registry = CountryRegistry::from_records(vec![CountryRecord {
            name: "Atlantis",
            capital: "Poseidonia",
            population: 1,
            area: 1.0,
        }]);
        assert_eq!(registry.len(), 1);
        assert!(registry.lookup("atlantis").is_some());
        assert!(registry.lookup("Brazil").is_none());
    }
}
