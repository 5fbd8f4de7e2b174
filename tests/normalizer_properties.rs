use location_normalizer::registry::{registry, STATES};
use location_normalizer::{
    normalize, LocationFailure, LocationInput, NormalizedLocation, ResolutionStrategy,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn norm(raw: &str) -> NormalizedLocation {
    normalize(&LocationInput::new(raw))
}

/// Checks every structural invariant a result must satisfy.
fn assert_consistent(raw: &str, loc: &NormalizedLocation) {
    assert_eq!(loc.original_text(), raw.trim(), "original text for {raw:?}");
    assert!((0.0..=1.0).contains(&loc.confidence()), "confidence range for {raw:?}");
    assert_eq!(loc.is_valid(), loc.failure().is_none(), "failure presence for {raw:?}");

    if loc.is_valid() {
        assert!(!loc.state_full().is_empty(), "state for {raw:?}");
        assert!(loc.confidence() > 0.0, "positive confidence for {raw:?}");
        let state = registry()
            .state_for_name(&loc.state_full())
            .unwrap_or_else(|| panic!("unregistered state for {raw:?}"));
        assert_eq!(state.abbreviation, loc.state_abbreviation());
        let expected = if loc.city().is_empty() {
            loc.state_full().to_string()
        } else {
            format!("{}, {}", loc.city(), loc.state_full())
        };
        assert_eq!(loc.normalized_text(), expected);
    } else {
        assert_eq!(loc.confidence(), 0.0, "zero confidence for {raw:?}");
        assert!(loc.state_full().is_empty() && loc.state_abbreviation().is_empty());
        assert!(loc.normalized_text().is_empty());
        assert!(loc.strategy().is_none());
    }

    if loc.confidence() == 1.0 {
        assert!(
            matches!(
                loc.strategy(),
                Some(ResolutionStrategy::ExactSynonym)
                    | Some(ResolutionStrategy::ExactAbbreviation)
                    | Some(ResolutionStrategy::ExactFullName)
            ),
            "confidence 1.0 from non-exact strategy for {raw:?}"
        );
    }
}

#[test]
fn scenario_city_and_full_state_name() {
    let loc = norm("Austin, Texas");
    assert_eq!(loc.city(), "Austin");
    assert_eq!(loc.state_full(), "Texas");
    assert_eq!(loc.state_abbreviation(), "TX");
    assert!(loc.is_valid());
    assert_eq!(loc.confidence(), 1.0);
}

#[test]
fn scenario_city_and_abbreviation() {
    let loc = norm("Plano, TX");
    assert_eq!(loc.city(), "Plano");
    assert_eq!(loc.state_full(), "Texas");
    assert_eq!(loc.state_abbreviation(), "TX");
    assert!(loc.is_valid());
    assert_eq!(loc.confidence(), 1.0);
}

#[test]
fn scenario_empty_input() {
    let loc = norm("");
    assert!(!loc.is_valid());
    assert_eq!(loc.confidence(), 0.0);
    assert_eq!(loc.failure_reason().as_deref(), Some("empty location"));
}

#[test]
fn scenario_empty_input_with_organization_hint() {
    let input = LocationInput::new("").with_hint("The Title Partners of Central Florida");
    let loc = normalize(&input);
    assert_eq!(loc.state_full(), "Florida");
    assert_eq!(loc.state_abbreviation(), "FL");
    assert!(loc.is_valid());
    assert_eq!(loc.confidence(), 0.7);
    assert_eq!(loc.city(), "");
    assert!(loc.failure().is_none());
}

#[test]
fn scenario_unknown_hint_stays_empty() {
    let input = LocationInput::new("   ").with_hint("Acme Widgets Inc");
    let loc = normalize(&input);
    assert_eq!(loc.failure(), Some(&LocationFailure::EmptyInput));
}

#[test]
fn scenario_hint_with_state_inside_a_longer_word() {
    let input = LocationInput::new("").with_hint("FloridaTitle Group");
    let loc = normalize(&input);
    assert_eq!(loc.state_full(), "Florida");
    assert_eq!(loc.confidence(), 0.7);
}

#[test]
fn scenario_metro_area_city_with_trailing_country() {
    let loc = norm("Dallas/Fort Worth, TX, USA");
    assert!(loc.is_valid());
    assert_eq!(loc.state_abbreviation(), "TX");
    assert_eq!(loc.confidence(), 0.8);
    assert_eq!(norm("Dallas, TX, USA").state_abbreviation(), "TX");
}

#[test]
fn scenario_unrecognized_state() {
    let loc = norm("InvalidCity, XX");
    assert!(!loc.is_valid());
    assert_eq!(loc.confidence(), 0.0);
    assert_eq!(loc.failure_reason().as_deref(), Some("unrecognized state: XX"));
}

#[test]
fn scenario_slash_delimited_states_are_deterministic() {
    let first = norm("New York / New Jersey, NY / NJ");
    assert!(first.is_valid());
    assert!(first.confidence() <= 0.7);
    assert!(
        (first.state_abbreviation() == "NY" && first.state_full() == "New York")
            || (first.state_abbreviation() == "NJ" && first.state_full() == "New Jersey")
    );
    for _ in 0..10 {
        assert_eq!(norm("New York / New Jersey, NY / NJ"), first);
    }
    // the first alternative wins
    assert_eq!(first.state_abbreviation(), "NY");
}

#[test]
fn every_abbreviation_resolves_to_itself() {
    for state in STATES.iter() {
        let loc = norm(state.abbreviation);
        assert_eq!(loc.state_abbreviation(), state.abbreviation);
        let back = registry().state_for_name(&loc.state_full()).unwrap();
        assert_eq!(back.abbreviation, state.abbreviation);
    }
}

#[test]
fn comma_input_is_case_insensitive() {
    for state in STATES.iter() {
        for form in [state.abbreviation, state.name] {
            let upper = norm(&format!("Springfield, {}", form.to_uppercase()));
            let lower = norm(&format!("springfield, {}", form.to_lowercase()));
            assert_eq!(upper.state_full(), lower.state_full(), "form {form}");
            assert_eq!(upper.state_abbreviation(), lower.state_abbreviation());
            assert_eq!(upper.confidence(), lower.confidence());
            assert_eq!(upper.state_abbreviation(), state.abbreviation);
        }
    }
    let a = norm("Austin, TX");
    let b = norm("austin, tx");
    assert_eq!(a.state_full(), b.state_full());
    assert_eq!(a.state_abbreviation(), b.state_abbreviation());
}

#[test]
fn exact_matches_outrank_fuzzy_matches() {
    let misspellings = [
        "Arizna",
        "Pensylvania",
        "Tennesse",
        "Massachusettes",
        "Californai",
        "Oklahmoa",
        "Wisconson",
    ];
    for state in misspellings {
        let loc = norm(&format!("Somewhere, {state}"));
        assert!(loc.is_valid(), "{state} should fuzzy match");
        assert_eq!(loc.strategy(), Some(ResolutionStrategy::Fuzzy));
        assert!(loc.confidence() > 0.7 && loc.confidence() < 1.0);

        let exact = norm(&format!("Somewhere, {}", loc.state_full()));
        assert_eq!(exact.confidence(), 1.0);
        assert!(exact.confidence() >= loc.confidence());
    }
}

#[test]
fn renormalizing_is_a_no_op() {
    let inputs = [
        "Austin, Texas",
        "Plano, TX",
        "Miami, Fla.",
        "Texas",
        "Phoenix, Arizna",
        "Dallas, TX, United States",
        "Acme Title LLC Phoenix AZ",
        "New York / New Jersey, NY / NJ",
        "Washington, D.C.",
    ];
    for raw in inputs {
        let first = norm(raw);
        assert!(first.is_valid(), "{raw} should resolve");
        let second = norm(&first.normalized_text());
        assert_eq!(second.state_full(), first.state_full(), "{raw}");
        assert_eq!(second.state_abbreviation(), first.state_abbreviation(), "{raw}");
    }
}

fn random_string(rng: &mut StdRng) -> String {
    const FRAGMENTS: &[&str] = &[
        "TX", "ny", "New York", "Calif.", "LLC", "Suite 200", "/", ",", ", ", ".", " ", "  ",
        "Austin", "12345", "é", "日本", "🙂", "ß", "\t", "-", "Washington", "D.C.", "Inc",
    ];
    let len = match rng.gen_range(0..100) {
        0..=4 => 0,
        5..=94 => rng.gen_range(1..24),
        _ => rng.gen_range(200..2_000),
    };
    let mut out = String::new();
    for _ in 0..len {
        if rng.gen_bool(0.3) {
            out.push_str(FRAGMENTS[rng.gen_range(0..FRAGMENTS.len())]);
        } else {
            let c = match rng.gen_range(0..4) {
                0 => rng.gen_range(b'a'..=b'z') as char,
                1 => rng.gen_range(b'A'..=b'Z') as char,
                2 => rng.gen_range(b' '..=b'~') as char,
                _ => char::from_u32(rng.gen_range(0x80..0x2FFF)).unwrap_or('?'),
            };
            out.push(c);
        }
    }
    out
}

#[test]
fn total_over_random_strings() {
    let mut rng = StdRng::seed_from_u64(0x5eed_10ca);
    for _ in 0..10_000 {
        let raw = random_string(&mut rng);
        let hint = if rng.gen_bool(0.2) {
            Some(random_string(&mut rng))
        } else {
            None
        };
        let input = LocationInput {
            raw: raw.clone(),
            context_hint: hint,
        };
        let loc = normalize(&input);
        assert_consistent(&raw, &loc);

        if loc.is_valid() {
            let again = norm(&loc.normalized_text());
            assert_eq!(again.state_abbreviation(), loc.state_abbreviation(), "{raw:?}");
        }
    }
}

#[test]
fn concurrent_calls_match_sequential_results() {
    let inputs: Vec<String> = [
        "Plano, TX",
        "",
        "Phoenix, Arizna",
        "Dallas, TX, United States",
        "Springfield, XX / YY",
        "Austin",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();
    let expected: Vec<_> = inputs.iter().map(|raw| norm(raw)).collect();

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                scope.spawn(|| inputs.iter().map(|raw| norm(raw)).collect::<Vec<_>>())
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), expected);
        }
    });
}
