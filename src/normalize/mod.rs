//! Free-text location normalization.
//!
//! [`LocationNormalizer::normalize`] resolves strings such as `"Plano, TX"`,
//! `"Dallas, TX, United States"` or `"New York / New Jersey"` to a US state,
//! with a confidence score describing how the state was found. It is a total
//! function: malformed input produces an invalid [`NormalizedLocation`]
//! carrying a [`LocationFailure`], never a panic or an `Err`.

mod strategies;

use once_cell::sync::Lazy;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use thiserror::Error;

use crate::config::{NormalizerConfig, ReviewThresholds};
use crate::registry::UsState;

/// Confidence for a state inferred from the context hint.
pub const CONTEXT_HINT_CONFIDENCE: f64 = 0.7;
/// Confidence for a bare state token without a city.
pub const SINGLE_TOKEN_CONFIDENCE: f64 = 0.9;
/// Confidence for an exact lookup on the state part of `City, State`.
pub const EXACT_CONFIDENCE: f64 = 1.0;
/// Ceiling for states dug out of address or company noise.
pub const EMBEDDED_STATE_CAP: f64 = 0.8;
/// Ceiling for slash-delimited multi-state input.
pub const MULTI_STATE_CAP: f64 = 0.7;

/// Raw location text as it arrives from a lead record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationInput {
    pub raw: String,
    /// Auxiliary text, usually an organization name, mined for a state when
    /// `raw` is empty.
    pub context_hint: Option<String>,
}

impl LocationInput {
    pub fn new(raw: impl Into<String>) -> Self {
        Self {
            raw: raw.into(),
            context_hint: None,
        }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.context_hint = Some(hint.into());
        self
    }
}

/// Which step of the resolution chain produced a state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionStrategy {
    ContextHint,
    SingleToken,
    ExactSynonym,
    ExactAbbreviation,
    ExactFullName,
    Fuzzy,
    EmbeddedState,
    MultiState,
}

impl ResolutionStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResolutionStrategy::ContextHint => "context_hint",
            ResolutionStrategy::SingleToken => "single_token",
            ResolutionStrategy::ExactSynonym => "exact_synonym",
            ResolutionStrategy::ExactAbbreviation => "exact_abbreviation",
            ResolutionStrategy::ExactFullName => "exact_full_name",
            ResolutionStrategy::Fuzzy => "fuzzy",
            ResolutionStrategy::EmbeddedState => "embedded_state",
            ResolutionStrategy::MultiState => "multi_state",
        }
    }
}

/// Why a location could not be resolved. The `Display` text is the
/// `failureReason` reported to callers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocationFailure {
    #[error("empty location")]
    EmptyInput,

    #[error("city without state — cannot determine state")]
    UnparseableSingleToken { city: String },

    #[error("unrecognized state: {candidate}")]
    UnrecognizedState { candidate: String },

    #[error("ambiguous multi-state format: {candidate}")]
    AmbiguousMultiState { candidate: String },
}

impl LocationFailure {
    /// Stable identifier for grouping failures in reports.
    pub fn kind(&self) -> &'static str {
        match self {
            LocationFailure::EmptyInput => "empty_input",
            LocationFailure::UnparseableSingleToken { .. } => "unparseable_single_token",
            LocationFailure::UnrecognizedState { .. } => "unrecognized_state",
            LocationFailure::AmbiguousMultiState { .. } => "ambiguous_multi_state",
        }
    }
}

/// Triage bucket for a normalized location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewTier {
    Automated,
    NeedsReview,
    ManualCorrection,
}

impl ReviewTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewTier::Automated => "automated",
            ReviewTier::NeedsReview => "needs_review",
            ReviewTier::ManualCorrection => "manual_correction",
        }
    }
}

/// How a location was settled: the state and the strategy that found it, or
/// the reason no state was found.
#[derive(Debug, Clone, PartialEq)]
enum Outcome {
    Resolved {
        state: &'static UsState,
        strategy: ResolutionStrategy,
    },
    Failed(LocationFailure),
}

// Flattened into the location as either `strategy` or `failureReason`.
impl Serialize for Outcome {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(1))?;
        match self {
            Outcome::Resolved { strategy, .. } => map.serialize_entry("strategy", strategy)?,
            Outcome::Failed(failure) => map.serialize_entry("failureReason", &failure.to_string())?,
        }
        map.end()
    }
}

/// Result of normalizing one [`LocationInput`].
///
/// Only the normalizer builds these, so the display fields always agree
/// with the outcome.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedLocation {
    original_text: String,
    city: String,
    state_full: String,
    state_abbreviation: String,
    normalized_text: String,
    is_valid: bool,
    confidence: f64,
    #[serde(flatten)]
    outcome: Outcome,
}

/// The success side of [`NormalizedLocation::into_result`].
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedLocation {
    pub city: String,
    pub state: &'static UsState,
    pub confidence: f64,
    pub strategy: ResolutionStrategy,
}

impl NormalizedLocation {
    pub(crate) fn resolved(
        original: &str,
        city: String,
        state: &'static UsState,
        confidence: f64,
        strategy: ResolutionStrategy,
    ) -> Self {
        let normalized_text = if city.is_empty() {
            state.name.to_string()
        } else {
            format!("{}, {}", city, state.name)
        };
        Self {
            original_text: original.to_string(),
            city,
            state_full: state.name.to_string(),
            state_abbreviation: state.abbreviation.to_string(),
            normalized_text,
            is_valid: true,
            confidence: confidence.clamp(0.0, 1.0),
            outcome: Outcome::Resolved { state, strategy },
        }
    }

    pub(crate) fn unresolved(original: &str, city: String, failure: LocationFailure) -> Self {
        Self {
            original_text: original.to_string(),
            city,
            state_full: String::new(),
            state_abbreviation: String::new(),
            normalized_text: String::new(),
            is_valid: false,
            confidence: 0.0,
            outcome: Outcome::Failed(failure),
        }
    }

    /// The input with surrounding whitespace removed.
    pub fn original_text(&self) -> &str {
        &self.original_text
    }

    /// Best-guess city; empty when none was found.
    pub fn city(&self) -> &str {
        &self.city
    }

    pub fn state_full(&self) -> &str {
        &self.state_full
    }

    pub fn state_abbreviation(&self) -> &str {
        &self.state_abbreviation
    }

    /// `"City, State"`, the bare state name, or empty when unresolved.
    pub fn normalized_text(&self) -> &str {
        &self.normalized_text
    }

    pub fn is_valid(&self) -> bool {
        self.is_valid
    }

    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    pub fn state(&self) -> Option<&'static UsState> {
        match self.outcome {
            Outcome::Resolved { state, .. } => Some(state),
            Outcome::Failed(_) => None,
        }
    }

    pub fn strategy(&self) -> Option<ResolutionStrategy> {
        match self.outcome {
            Outcome::Resolved { strategy, .. } => Some(strategy),
            Outcome::Failed(_) => None,
        }
    }

    pub fn failure(&self) -> Option<&LocationFailure> {
        match &self.outcome {
            Outcome::Resolved { .. } => None,
            Outcome::Failed(failure) => Some(failure),
        }
    }

    pub fn failure_reason(&self) -> Option<String> {
        self.failure().map(|f| f.to_string())
    }

    /// Tagged view of this result.
    pub fn into_result(self) -> Result<ResolvedLocation, LocationFailure> {
        match self.outcome {
            Outcome::Resolved { state, strategy } => Ok(ResolvedLocation {
                city: self.city,
                state,
                confidence: self.confidence,
                strategy,
            }),
            Outcome::Failed(failure) => Err(failure),
        }
    }

    /// Bucket this result for downstream handling. Embedded-state matches are
    /// heuristic and never qualify for automated use.
    pub fn review_tier(&self, thresholds: &ReviewThresholds) -> ReviewTier {
        if !self.is_valid {
            return ReviewTier::ManualCorrection;
        }
        let heuristic = self.strategy() == Some(ResolutionStrategy::EmbeddedState);
        if self.confidence >= thresholds.automated_min && !heuristic {
            ReviewTier::Automated
        } else if self.confidence >= thresholds.review_min {
            ReviewTier::NeedsReview
        } else {
            ReviewTier::ManualCorrection
        }
    }
}

/// Resolves free-text locations against the static state registry.
///
/// Holds only configuration; every call is independent, so one instance can
/// be shared across threads.
#[derive(Debug, Clone)]
pub struct LocationNormalizer {
    fuzzy_threshold: f64,
}

impl Default for LocationNormalizer {
    fn default() -> Self {
        Self::new(&NormalizerConfig::default())
    }
}

static DEFAULT_NORMALIZER: Lazy<LocationNormalizer> = Lazy::new(LocationNormalizer::default);

/// Normalize with the default configuration.
pub fn normalize(input: &LocationInput) -> NormalizedLocation {
    DEFAULT_NORMALIZER.normalize(input)
}

impl LocationNormalizer {
    pub fn new(config: &NormalizerConfig) -> Self {
        Self {
            fuzzy_threshold: config.fuzzy_threshold,
        }
    }

    /// Resolve `input`, trying each strategy in order until one finds a state.
    ///
    /// 1. empty input: infer from the context hint
    /// 2. no comma: the whole string is a state token
    /// 3. `City, State[, ...]`: the last segment is the state candidate
    /// 4. a state embedded among address or company noise
    /// 5. slash-delimited alternatives such as `NY / NJ`
    ///
    /// When every step fails, the context hint is tried before giving up, so
    /// unparseable text is treated like empty text.
    pub fn normalize(&self, input: &LocationInput) -> NormalizedLocation {
        let original = input.raw.trim();
        let segments: Vec<&str> = original
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect();

        let Some(&candidate) = segments.last() else {
            return hint_or_failure(input, original, String::new(), LocationFailure::EmptyInput);
        };

        let city = if segments.len() > 1 { segments[0] } else { "" };
        let multi_state = candidate.contains('/');

        if !multi_state {
            let primary = if segments.len() == 1 {
                strategies::resolve_single_token(candidate)
            } else {
                strategies::resolve_state_candidate(candidate, self.fuzzy_threshold)
            };
            if let Some(found) = primary {
                return NormalizedLocation::resolved(
                    original,
                    city.to_string(),
                    found.state,
                    found.confidence,
                    found.strategy,
                );
            }
        }

        if let Some(embedded) = strategies::resolve_embedded_state(original) {
            return NormalizedLocation::resolved(
                original,
                embedded.city,
                embedded.state,
                EMBEDDED_STATE_CAP,
                ResolutionStrategy::EmbeddedState,
            );
        }

        if multi_state {
            let city = city.split('/').next().unwrap_or_default().trim().to_string();
            return match strategies::resolve_multi_state(candidate, self.fuzzy_threshold) {
                Some(found) => NormalizedLocation::resolved(
                    original,
                    city,
                    found.state,
                    found.confidence.min(MULTI_STATE_CAP),
                    ResolutionStrategy::MultiState,
                ),
                None => hint_or_failure(
                    input,
                    original,
                    city,
                    LocationFailure::AmbiguousMultiState {
                        candidate: candidate.to_string(),
                    },
                ),
            };
        }

        if segments.len() == 1 {
            hint_or_failure(
                input,
                original,
                candidate.to_string(),
                LocationFailure::UnparseableSingleToken {
                    city: candidate.to_string(),
                },
            )
        } else {
            hint_or_failure(
                input,
                original,
                city.to_string(),
                LocationFailure::UnrecognizedState {
                    candidate: candidate.to_string(),
                },
            )
        }
    }
}

/// Last resort: a state named in the context hint, keeping whatever city was
/// found; otherwise `failure`.
fn hint_or_failure(
    input: &LocationInput,
    original: &str,
    city: String,
    failure: LocationFailure,
) -> NormalizedLocation {
    match input.context_hint.as_deref().and_then(strategies::infer_from_hint) {
        Some(state) => NormalizedLocation::resolved(
            original,
            city,
            state,
            CONTEXT_HINT_CONFIDENCE,
            ResolutionStrategy::ContextHint,
        ),
        None => NormalizedLocation::unresolved(original, city, failure),
    }
}
