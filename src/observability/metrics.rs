//! Metric names and recording helpers for batch normalization.
//!
//! Recording goes through the `metrics` facade; without an installed
//! recorder the calls are no-ops, so embedding callers opt in by installing
//! their own exporter.

use std::fmt;

/// Enum representing all metric names used in the crate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricName {
    NormalizeResolved,
    NormalizeUnresolved,
    NormalizeConfidence,
    NormalizeRowErrors,
    NormalizeBatchesProcessed,
    NormalizeBatchSize,
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl MetricName {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricName::NormalizeResolved => "location_normalize_resolved_total",
            MetricName::NormalizeUnresolved => "location_normalize_unresolved_total",
            MetricName::NormalizeConfidence => "location_normalize_confidence",
            MetricName::NormalizeRowErrors => "location_normalize_row_errors_total",
            MetricName::NormalizeBatchesProcessed => "location_normalize_batches_processed_total",
            MetricName::NormalizeBatchSize => "location_normalize_batch_size",
        }
    }

    /// Get all metric names as an iterator
    pub fn all_metrics() -> impl Iterator<Item = MetricName> {
        use MetricName::*;
        [
            NormalizeResolved,
            NormalizeUnresolved,
            NormalizeConfidence,
            NormalizeRowErrors,
            NormalizeBatchesProcessed,
            NormalizeBatchSize,
        ]
        .into_iter()
    }
}

pub mod normalize {
    use super::MetricName;

    /// Record a resolved row, labelled by the strategy that found the state
    pub fn record_resolved(strategy: &str, confidence: f64) {
        ::metrics::counter!(MetricName::NormalizeResolved.as_str(), "strategy" => strategy.to_string())
            .increment(1);
        ::metrics::histogram!(MetricName::NormalizeConfidence.as_str()).record(confidence);
    }

    /// Record an unresolved row, labelled by failure kind
    pub fn record_unresolved(kind: &str) {
        ::metrics::counter!(MetricName::NormalizeUnresolved.as_str(), "kind" => kind.to_string())
            .increment(1);
    }

    /// Record a row the source could not read
    pub fn row_error() {
        ::metrics::counter!(MetricName::NormalizeRowErrors.as_str()).increment(1);
    }

    /// Record that a batch was processed
    pub fn batch_processed(batch_size: usize) {
        ::metrics::histogram!(MetricName::NormalizeBatchSize.as_str()).record(batch_size as f64);
        ::metrics::counter!(MetricName::NormalizeBatchesProcessed.as_str()).increment(1);
    }
}
