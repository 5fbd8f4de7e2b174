use once_cell::sync::Lazy;
use regex::Regex;

use super::{ResolutionStrategy, EXACT_CONFIDENCE, SINGLE_TOKEN_CONFIDENCE};
use crate::registry::{compact_key, registry, UsState, STATES};
use crate::similarity::{similarity, similarity_upper_bound};

/// Legal-entity suffixes, street vocabulary and country names that show up
/// when a company name or street address lands in the location field.
static NOISE_WORD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^(?:llc|inc|incorporated|corp|corporation|co|company|ltd|lp|llp|pllc|pc|plc|group|holdings|partners|suite|ste|street|avenue|ave|road|rd|boulevard|blvd|drive|highway|hwy|parkway|pkwy|lane|ln|floor|usa|america)$",
    )
    .expect("noise word pattern is valid")
});

/// Longest state name in words ("District of Columbia").
const MAX_PHRASE_WORDS: usize = 3;

/// A state found by one of the lookup strategies.
#[derive(Debug, Clone, Copy)]
pub(super) struct StateMatch {
    pub state: &'static UsState,
    pub confidence: f64,
    pub strategy: ResolutionStrategy,
}

/// A state dug out of noisy text, with a best-guess city.
#[derive(Debug, Clone)]
pub(super) struct EmbeddedMatch {
    pub city: String,
    pub state: &'static UsState,
}

/// True for a word that marks company or street-address noise.
pub(super) fn is_noise_word(word: &str) -> bool {
    if word.chars().any(|c| c.is_ascii_digit()) {
        return true;
    }
    let bare = word.trim_matches(|c: char| !c.is_alphanumeric());
    !bare.is_empty() && NOISE_WORD.is_match(bare)
}

/// Find a full state name mentioned anywhere inside `hint`, ignoring case.
///
/// Names match as substrings, so "FloridaTitle" yields Florida. The longest
/// matching name wins ("West Virginia" beats "Virginia", "Arkansas" beats
/// "Kansas"); equal lengths fall back to registry order.
pub(super) fn infer_from_hint(hint: &str) -> Option<&'static UsState> {
    let words: Vec<String> = hint
        .split(|c: char| !c.is_ascii_alphabetic())
        .filter(|w| !w.is_empty())
        .map(|w| w.to_ascii_lowercase())
        .collect();
    if words.is_empty() {
        return None;
    }
    let haystack = words.join(" ");

    // Only full names are searched; two-letter abbreviations turn up inside
    // ordinary words too often.
    let mut best: Option<&'static UsState> = None;
    for state in STATES.iter() {
        let needle = state.name.to_ascii_lowercase();
        if haystack.contains(&needle) && best.map_or(true, |b| state.name.len() > b.name.len()) {
            best = Some(state);
        }
    }
    best
}

/// Exact lookup of a bare token: synonym table, then abbreviation, then full name.
pub(super) fn resolve_single_token(token: &str) -> Option<StateMatch> {
    let key = compact_key(token);
    if key.is_empty() {
        return None;
    }
    let reg = registry();
    reg.by_synonym(&key)
        .or_else(|| reg.by_abbreviation(&key))
        .or_else(|| reg.by_full_name(&key))
        .map(|state| StateMatch {
            state,
            confidence: SINGLE_TOKEN_CONFIDENCE,
            strategy: ResolutionStrategy::SingleToken,
        })
}

/// Resolve the state part of `City, State`: exact synonym, exact
/// abbreviation, exact full name, then fuzzy against the synonym table.
pub(super) fn resolve_state_candidate(candidate: &str, fuzzy_threshold: f64) -> Option<StateMatch> {
    let key = compact_key(candidate);
    if key.is_empty() {
        return None;
    }
    let reg = registry();

    let exact = [
        (reg.by_synonym(&key), ResolutionStrategy::ExactSynonym),
        (reg.by_abbreviation(&key), ResolutionStrategy::ExactAbbreviation),
        (reg.by_full_name(&key), ResolutionStrategy::ExactFullName),
    ];
    for (found, strategy) in exact {
        if let Some(state) = found {
            return Some(StateMatch {
                state,
                confidence: EXACT_CONFIDENCE,
                strategy,
            });
        }
    }

    fuzzy_lookup(&key, fuzzy_threshold).map(|(state, score)| StateMatch {
        state,
        confidence: score,
        strategy: ResolutionStrategy::Fuzzy,
    })
}

/// Best synonym-table entry whose similarity to `key` is strictly above
/// `threshold`. Ties keep the earliest entry in table order.
fn fuzzy_lookup(key: &str, threshold: f64) -> Option<(&'static UsState, f64)> {
    let len = key.chars().count();
    let mut best: Option<(&'static UsState, f64)> = None;

    for entry in registry().synonyms() {
        let bound = similarity_upper_bound(len, entry.key.len());
        if bound <= threshold || best.map_or(false, |(_, score)| bound <= score) {
            continue;
        }
        let score = similarity(key, &entry.key);
        if score > threshold && best.map_or(true, |(_, b)| score > b) {
            best = Some((entry.state, score));
        }
    }
    best
}

/// Scan comma segments from the end for a recognizable state phrase.
///
/// Accepted phrases: a canonical state name of up to three words, a
/// two-letter abbreviation written in capitals, or a curated short form
/// written with a trailing period ("Calif."). Segments containing `/` are
/// left to the multi-state strategy.
pub(super) fn resolve_embedded_state(text: &str) -> Option<EmbeddedMatch> {
    let segments: Vec<&str> = text
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();

    for (idx, segment) in segments.iter().enumerate().rev() {
        if segment.contains('/') {
            continue;
        }
        let words: Vec<&str> = segment.split_whitespace().collect();
        for end in (1..=words.len()).rev() {
            for width in (1..=MAX_PHRASE_WORDS.min(end)).rev() {
                let start = end - width;
                if let Some(state) = match_phrase(&words[start..end]) {
                    let city = guess_city(&segments[..idx], &words[..start]);
                    return Some(EmbeddedMatch { city, state });
                }
            }
        }
    }
    None
}

fn match_phrase(words: &[&str]) -> Option<&'static UsState> {
    let key = compact_key(&words.join(" "));
    if key.is_empty() {
        return None;
    }
    let reg = registry();
    if let Some(state) = reg.by_full_name(&key) {
        return Some(state);
    }
    let [word] = words else {
        return None;
    };

    let letters: Vec<char> = word.chars().filter(|c| c.is_ascii_alphabetic()).collect();
    if letters.len() == 2 && letters.iter().all(|c| c.is_ascii_uppercase()) {
        if let Some(state) = reg.by_abbreviation(&key) {
            return Some(state);
        }
    }
    if word.ends_with('.') {
        return reg.by_synonym(&key);
    }
    None
}

/// Words right before the state in the same segment, after the last noise
/// word; otherwise the preceding segment when it is free of noise.
fn guess_city(preceding_segments: &[&str], preceding_words: &[&str]) -> String {
    let tail_start = preceding_words
        .iter()
        .rposition(|w| is_noise_word(w))
        .map_or(0, |i| i + 1);
    let tail = &preceding_words[tail_start..];
    if !tail.is_empty() {
        return clean_city(&tail.join(" "));
    }
    if !preceding_words.is_empty() {
        return String::new();
    }

    match preceding_segments.last() {
        Some(segment) if !segment.split_whitespace().any(is_noise_word) => clean_city(segment),
        _ => String::new(),
    }
}

fn clean_city(raw: &str) -> String {
    raw.trim_matches(|c: char| c.is_whitespace() || matches!(c, '.' | ';' | ':' | '-'))
        .to_string()
}

/// Try each `/`-separated alternative in order through the `City, State`
/// lookup chain; the first one that resolves wins.
pub(super) fn resolve_multi_state(candidate: &str, fuzzy_threshold: f64) -> Option<StateMatch> {
    candidate
        .split('/')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .find_map(|part| resolve_state_candidate(part, fuzzy_threshold))
        .map(|found| StateMatch {
            strategy: ResolutionStrategy::MultiState,
            ..found
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hint_prefers_longest_name() {
        let state = infer_from_hint("West Virginia Title Co").unwrap();
        assert_eq!(state.abbreviation, "WV");
    }

    #[test]
    fn test_hint_matches_substrings_case_insensitively() {
        let state = infer_from_hint("FloridaTitle Group").unwrap();
        assert_eq!(state.abbreviation, "FL");
        let state = infer_from_hint("INDIANAPOLIS Holdings").unwrap();
        assert_eq!(state.abbreviation, "IN");
        // "Kansas" is inside "Arkansas"; the longer name wins
        let state = infer_from_hint("Arkansas Realty Group").unwrap();
        assert_eq!(state.abbreviation, "AR");
        assert!(infer_from_hint("Acme Widgets Inc").is_none());
        assert!(infer_from_hint("").is_none());
    }

    #[test]
    fn test_single_token_lookup_order() {
        let found = resolve_single_token("Calif.").unwrap();
        assert_eq!(found.state.abbreviation, "CA");
        let found = resolve_single_token("dc").unwrap();
        assert_eq!(found.state.name, "District of Columbia");
        assert!(resolve_single_token("Seattle").is_none());
        assert!(resolve_single_token("12345").is_none());
    }

    #[test]
    fn test_exact_beats_fuzzy() {
        let found = resolve_state_candidate("Oregon", 0.7).unwrap();
        assert_eq!(found.strategy, ResolutionStrategy::ExactSynonym);
        assert_eq!(found.confidence, 1.0);
    }

    #[test]
    fn test_fuzzy_picks_highest_score() {
        let (state, score) = fuzzy_lookup("pensylvania", 0.7).unwrap();
        assert_eq!(state.abbreviation, "PA");
        assert!(score > 0.9);
    }

    #[test]
    fn test_fuzzy_rejects_at_threshold() {
        assert!(fuzzy_lookup("xx", 0.7).is_none());
        assert!(fuzzy_lookup("unitedstates", 0.7).is_none());
    }

    #[test]
    fn test_embedded_state_after_company_noise() {
        let found = resolve_embedded_state("Acme Title LLC Phoenix AZ").unwrap();
        assert_eq!(found.state.abbreviation, "AZ");
        assert_eq!(found.city, "Phoenix");
    }

    #[test]
    fn test_embedded_state_in_street_address() {
        let found =
            resolve_embedded_state("Acme Holdings LLC, 500 Commerce Street, Kansas City MO 64105")
                .unwrap();
        assert_eq!(found.state.abbreviation, "MO");
        assert_eq!(found.city, "Kansas City");
    }

    #[test]
    fn test_embedded_state_uses_preceding_segment() {
        let found = resolve_embedded_state("Dallas, TX, USA").unwrap();
        assert_eq!(found.state.abbreviation, "TX");
        assert_eq!(found.city, "Dallas");

        let found = resolve_embedded_state("100 Main Street, Texas, United States").unwrap();
        assert_eq!(found.state.abbreviation, "TX");
        assert_eq!(found.city, "");
    }

    #[test]
    fn test_embedded_ignores_lowercase_words_that_look_like_abbreviations() {
        assert!(resolve_embedded_state("sales in the region").is_none());
    }

    #[test]
    fn test_embedded_accepts_period_short_forms() {
        let found = resolve_embedded_state("Sacramento Calif.").unwrap();
        assert_eq!(found.state.abbreviation, "CA");
        assert_eq!(found.city, "Sacramento");
    }

    #[test]
    fn test_embedded_skips_slash_segments_only() {
        assert!(resolve_embedded_state("New York / New Jersey").is_none());

        let found = resolve_embedded_state("Dallas/Fort Worth, TX, USA").unwrap();
        assert_eq!(found.state.abbreviation, "TX");
        assert_eq!(found.city, "Dallas/Fort Worth");
    }

    #[test]
    fn test_multi_state_first_resolvable_part_wins() {
        let found = resolve_multi_state("XX / NJ / NY", 0.7).unwrap();
        assert_eq!(found.state.abbreviation, "NJ");
        assert_eq!(found.strategy, ResolutionStrategy::MultiState);
        assert!(resolve_multi_state(" / ", 0.7).is_none());
    }

    #[test]
    fn test_noise_words() {
        assert!(is_noise_word("LLC"));
        assert!(is_noise_word("Inc."));
        assert!(is_noise_word("75201"));
        assert!(!is_noise_word("Dallas"));
        assert!(!is_noise_word("St."));
    }
}
