use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

use crate::app::ports::{LocationSink, LocationSource, SourceRecord};
use crate::config::{NormalizerConfig, ReviewThresholds};
use crate::error::Result;
use crate::normalize::{LocationInput, LocationNormalizer, NormalizedLocation, ReviewTier};
use crate::observability::metrics;

/// Upper bound on rows echoed back in [`BatchSummary::review_samples`].
pub const MAX_REVIEW_SAMPLES: usize = 25;

/// A row that did not qualify for automated use.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewSample {
    pub line: usize,
    pub original_text: String,
    pub normalized_text: String,
    pub confidence: f64,
    pub tier: ReviewTier,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
}

/// Aggregate data-quality report for one batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchSummary {
    pub generated_at: DateTime<Utc>,
    pub total_rows: usize,
    pub resolved: usize,
    pub unresolved: usize,
    pub row_errors: usize,
    pub by_tier: BTreeMap<String, usize>,
    pub by_strategy: BTreeMap<String, usize>,
    pub by_failure: BTreeMap<String, usize>,
    pub by_state: BTreeMap<String, usize>,
    /// Mean confidence over resolved rows.
    pub mean_confidence: Option<f64>,
    pub review_samples: Vec<ReviewSample>,
    #[serde(skip)]
    confidence_sum: f64,
}

impl BatchSummary {
    pub fn new() -> Self {
        Self {
            generated_at: Utc::now(),
            total_rows: 0,
            resolved: 0,
            unresolved: 0,
            row_errors: 0,
            by_tier: BTreeMap::new(),
            by_strategy: BTreeMap::new(),
            by_failure: BTreeMap::new(),
            by_state: BTreeMap::new(),
            mean_confidence: None,
            review_samples: Vec::new(),
            confidence_sum: 0.0,
        }
    }

    pub fn record(&mut self, line: usize, location: &NormalizedLocation, thresholds: &ReviewThresholds) {
        self.total_rows += 1;
        let tier = location.review_tier(thresholds);
        *self.by_tier.entry(tier.as_str().to_string()).or_default() += 1;

        if location.is_valid() {
            self.resolved += 1;
            self.confidence_sum += location.confidence();
            self.mean_confidence = Some(self.confidence_sum / self.resolved as f64);
            *self.by_state.entry(location.state_abbreviation().to_string()).or_default() += 1;
            if let Some(strategy) = location.strategy() {
                *self.by_strategy.entry(strategy.as_str().to_string()).or_default() += 1;
            }
        } else {
            self.unresolved += 1;
            if let Some(failure) = location.failure() {
                *self.by_failure.entry(failure.kind().to_string()).or_default() += 1;
            }
        }

        if tier != ReviewTier::Automated && self.review_samples.len() < MAX_REVIEW_SAMPLES {
            self.review_samples.push(ReviewSample {
                line,
                original_text: location.original_text().to_string(),
                normalized_text: location.normalized_text().to_string(),
                confidence: location.confidence(),
                tier,
                failure_reason: location.failure_reason(),
            });
        }
    }

    pub fn record_row_error(&mut self) {
        self.row_errors += 1;
    }
}

impl Default for BatchSummary {
    fn default() -> Self {
        Self::new()
    }
}

/// Normalizes every row of a source into a sink and reports on the batch.
pub struct NormalizeBatchUseCase {
    normalizer: LocationNormalizer,
    thresholds: ReviewThresholds,
}

impl NormalizeBatchUseCase {
    pub fn new(config: &NormalizerConfig) -> Self {
        Self {
            normalizer: LocationNormalizer::new(config),
            thresholds: config.review,
        }
    }

    /// Normalize a single row.
    pub fn normalize_record(&self, record: &SourceRecord) -> NormalizedLocation {
        let location = self.normalizer.normalize(&record.input);
        if location.is_valid() {
            if let Some(strategy) = location.strategy() {
                metrics::normalize::record_resolved(strategy.as_str(), location.confidence());
            }
        } else if let Some(failure) = location.failure() {
            debug!(line = record.line, reason = %failure, "Location unresolved");
            metrics::normalize::record_unresolved(failure.kind());
        }
        location
    }

    /// Drain `source` into `sink`. Unreadable rows are counted and skipped;
    /// a failing sink stops the batch.
    pub fn run<I, S>(&self, source: I, sink: &mut S) -> Result<BatchSummary>
    where
        I: LocationSource,
        S: LocationSink + ?Sized,
    {
        let span = tracing::info_span!("normalize_batch");
        let _enter = span.enter();

        let mut summary = BatchSummary::new();
        for item in source {
            let record = match item {
                Ok(record) => record,
                Err(e) => {
                    warn!("Skipping unreadable row: {}", e);
                    metrics::normalize::row_error();
                    summary.record_row_error();
                    continue;
                }
            };

            let location = self.normalize_record(&record);
            summary.record(record.line, &location, &self.thresholds);
            sink.write(&record, &location)?;
        }
        sink.finish()?;

        metrics::normalize::batch_processed(summary.total_rows);
        info!(
            total = summary.total_rows,
            resolved = summary.resolved,
            unresolved = summary.unresolved,
            row_errors = summary.row_errors,
            "Batch normalized"
        );
        Ok(summary)
    }

    /// Normalize many inputs across the rayon pool. Output order matches
    /// input order.
    pub fn normalize_many(&self, inputs: &[LocationInput]) -> Vec<NormalizedLocation> {
        inputs
            .par_iter()
            .map(|input| self.normalizer.normalize(input))
            .collect()
    }
}
