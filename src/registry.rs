//! Static US state registry and synonym table.
//!
//! Both tables are built once on first use and never mutated afterwards, so
//! lookups are safe from any number of threads.

use once_cell::sync::Lazy;
use serde::Serialize;
use std::collections::HashMap;

/// A registry entry: two-letter postal abbreviation and canonical full name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct UsState {
    pub abbreviation: &'static str,
    pub name: &'static str,
}

const fn st(abbreviation: &'static str, name: &'static str) -> UsState {
    UsState { abbreviation, name }
}

/// The 50 states plus DC, alphabetical by full name.
pub static STATES: [UsState; 51] = [
    st("AL", "Alabama"),
    st("AK", "Alaska"),
    st("AZ", "Arizona"),
    st("AR", "Arkansas"),
    st("CA", "California"),
    st("CO", "Colorado"),
    st("CT", "Connecticut"),
    st("DE", "Delaware"),
    st("DC", "District of Columbia"),
    st("FL", "Florida"),
    st("GA", "Georgia"),
    st("HI", "Hawaii"),
    st("ID", "Idaho"),
    st("IL", "Illinois"),
    st("IN", "Indiana"),
    st("IA", "Iowa"),
    st("KS", "Kansas"),
    st("KY", "Kentucky"),
    st("LA", "Louisiana"),
    st("ME", "Maine"),
    st("MD", "Maryland"),
    st("MA", "Massachusetts"),
    st("MI", "Michigan"),
    st("MN", "Minnesota"),
    st("MS", "Mississippi"),
    st("MO", "Missouri"),
    st("MT", "Montana"),
    st("NE", "Nebraska"),
    st("NV", "Nevada"),
    st("NH", "New Hampshire"),
    st("NJ", "New Jersey"),
    st("NM", "New Mexico"),
    st("NY", "New York"),
    st("NC", "North Carolina"),
    st("ND", "North Dakota"),
    st("OH", "Ohio"),
    st("OK", "Oklahoma"),
    st("OR", "Oregon"),
    st("PA", "Pennsylvania"),
    st("RI", "Rhode Island"),
    st("SC", "South Carolina"),
    st("SD", "South Dakota"),
    st("TN", "Tennessee"),
    st("TX", "Texas"),
    st("UT", "Utah"),
    st("VT", "Vermont"),
    st("VA", "Virginia"),
    st("WA", "Washington"),
    st("WV", "West Virginia"),
    st("WI", "Wisconsin"),
    st("WY", "Wyoming"),
];

/// Hand-curated variants: abbreviations with periods dropped, old-style
/// postal abbreviations and common misspellings. Keys are compact (ASCII
/// letters only, lowercase); values are canonical full names.
const CURATED_SYNONYMS: &[(&str, &str)] = &[
    ("ala", "Alabama"),
    ("alab", "Alabama"),
    ("alas", "Alaska"),
    ("alaksa", "Alaska"),
    ("ariz", "Arizona"),
    ("arizonia", "Arizona"),
    ("ark", "Arkansas"),
    ("arkansaw", "Arkansas"),
    ("calif", "California"),
    ("cali", "California"),
    ("cal", "California"),
    ("californa", "California"),
    ("colo", "Colorado"),
    ("colorodo", "Colorado"),
    ("conn", "Connecticut"),
    ("conneticut", "Connecticut"),
    ("connecticutt", "Connecticut"),
    ("del", "Delaware"),
    ("dela", "Delaware"),
    ("washingtondc", "District of Columbia"),
    ("washdc", "District of Columbia"),
    ("fla", "Florida"),
    ("flor", "Florida"),
    ("flordia", "Florida"),
    ("hawai", "Hawaii"),
    ("hawii", "Hawaii"),
    ("ill", "Illinois"),
    ("ills", "Illinois"),
    ("illinios", "Illinois"),
    ("ind", "Indiana"),
    ("kans", "Kansas"),
    ("kan", "Kansas"),
    ("kentuky", "Kentucky"),
    ("louisianna", "Louisiana"),
    ("mass", "Massachusetts"),
    ("massachusets", "Massachusetts"),
    ("massachussetts", "Massachusetts"),
    ("mich", "Michigan"),
    ("minn", "Minnesota"),
    ("miss", "Mississippi"),
    ("missisippi", "Mississippi"),
    ("misouri", "Missouri"),
    ("mont", "Montana"),
    ("nebr", "Nebraska"),
    ("neb", "Nebraska"),
    ("nev", "Nevada"),
    ("nmex", "New Mexico"),
    ("nyc", "New York"),
    ("ncarolina", "North Carolina"),
    ("nocarolina", "North Carolina"),
    ("ndakota", "North Dakota"),
    ("nodak", "North Dakota"),
    ("okla", "Oklahoma"),
    ("ore", "Oregon"),
    ("oreg", "Oregon"),
    ("penn", "Pennsylvania"),
    ("penna", "Pennsylvania"),
    ("pennsylvannia", "Pennsylvania"),
    ("scarolina", "South Carolina"),
    ("sdakota", "South Dakota"),
    ("tenn", "Tennessee"),
    ("tennesee", "Tennessee"),
    ("tex", "Texas"),
    ("virg", "Virginia"),
    ("wash", "Washington"),
    ("washingtonstate", "Washington"),
    ("wva", "West Virginia"),
    ("wvirginia", "West Virginia"),
    ("wis", "Wisconsin"),
    ("wisc", "Wisconsin"),
    ("wyo", "Wyoming"),
];

/// One key of the synonym table.
#[derive(Debug, Clone)]
pub struct SynonymEntry {
    pub key: String,
    pub state: &'static UsState,
}

/// Lookup tables over [`STATES`] and the synonym table.
pub struct StateRegistry {
    by_abbreviation: HashMap<String, &'static UsState>,
    by_name: HashMap<String, &'static UsState>,
    /// Insertion order is the fuzzy-match tie-break order: every canonical
    /// name in [`STATES`] order first, then the curated variants in
    /// declaration order.
    synonyms: Vec<SynonymEntry>,
    synonym_index: HashMap<String, &'static UsState>,
}

static REGISTRY: Lazy<StateRegistry> = Lazy::new(StateRegistry::build);

/// The process-wide registry.
pub fn registry() -> &'static StateRegistry {
    &REGISTRY
}

/// Reduce a token to its lookup key: ASCII letters only, lowercased.
///
/// `"N.Y."` becomes `"ny"`, `"New  York"` becomes `"newyork"`.
pub fn compact_key(token: &str) -> String {
    token
        .chars()
        .filter(|c| c.is_ascii_alphabetic())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

impl StateRegistry {
    fn build() -> Self {
        let mut by_abbreviation = HashMap::with_capacity(STATES.len());
        let mut by_name = HashMap::with_capacity(STATES.len());
        let mut synonyms = Vec::with_capacity(STATES.len() + CURATED_SYNONYMS.len());
        let mut synonym_index = HashMap::with_capacity(STATES.len() + CURATED_SYNONYMS.len());

        for state in STATES.iter() {
            by_abbreviation.insert(state.abbreviation.to_ascii_lowercase(), state);
            let key = compact_key(state.name);
            by_name.insert(key.clone(), state);
            synonym_index.insert(key.clone(), state);
            synonyms.push(SynonymEntry { key, state });
        }

        for (key, name) in CURATED_SYNONYMS {
            // Unknown canonical names and duplicate keys are dropped.
            let Some(state) = by_name.get(&compact_key(name)).copied() else {
                continue;
            };
            if synonym_index.contains_key(*key) {
                continue;
            }
            synonym_index.insert(key.to_string(), state);
            synonyms.push(SynonymEntry {
                key: key.to_string(),
                state,
            });
        }

        Self {
            by_abbreviation,
            by_name,
            synonyms,
            synonym_index,
        }
    }

    /// All registry entries.
    pub fn states(&self) -> &'static [UsState] {
        &STATES
    }

    /// Exact abbreviation match on a compact key (`"tx"`, `"dc"`).
    pub fn by_abbreviation(&self, key: &str) -> Option<&'static UsState> {
        self.by_abbreviation.get(key).copied()
    }

    /// Exact full-name match on a compact key (`"newyork"`).
    pub fn by_full_name(&self, key: &str) -> Option<&'static UsState> {
        self.by_name.get(key).copied()
    }

    /// Exact synonym-table match on a compact key.
    pub fn by_synonym(&self, key: &str) -> Option<&'static UsState> {
        self.synonym_index.get(key).copied()
    }

    /// Synonym table in its stable iteration order.
    pub fn synonyms(&self) -> &[SynonymEntry] {
        &self.synonyms
    }

    /// Canonical entry for a full name, in any casing or spacing.
    pub fn state_for_name(&self, name: &str) -> Option<&'static UsState> {
        self.by_full_name(&compact_key(name))
    }
}
