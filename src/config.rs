use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{NormalizerError, Result};

/// Environment variable naming the config file when `--config` is not given.
pub const CONFIG_ENV_VAR: &str = "LOCATION_NORMALIZER_CONFIG";
/// Config file looked up in the working directory when nothing else is set.
pub const DEFAULT_CONFIG_PATH: &str = "normalizer.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub normalizer: NormalizerConfig,
    pub batch: BatchConfig,
}

/// Tunables for the normalizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizerConfig {
    /// Fuzzy matches are accepted only when similarity is strictly above this.
    pub fuzzy_threshold: f64,
    pub review: ReviewThresholds,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            fuzzy_threshold: 0.7,
            review: ReviewThresholds::default(),
        }
    }
}

/// Confidence cut-offs used to triage results.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReviewThresholds {
    /// At or above this, results are safe for automated use.
    pub automated_min: f64,
    /// At or above this (and below `automated_min`), results need review.
    pub review_min: f64,
}

impl Default for ReviewThresholds {
    fn default() -> Self {
        Self {
            automated_min: 0.9,
            review_min: 0.5,
        }
    }
}

/// Field names pulled from NDJSON batch records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    pub location_field: String,
    pub hint_field: String,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            location_field: "location".to_string(),
            hint_field: "company".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration.
    ///
    /// An explicit path must exist. Without one, `LOCATION_NORMALIZER_CONFIG`
    /// is consulted and then `normalizer.toml`; if neither file exists the
    /// defaults are used.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        let candidate = std::env::var(CONFIG_ENV_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));

        if candidate.exists() {
            Self::from_file(&candidate)
        } else {
            Ok(Self::default())
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            NormalizerError::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let n = &self.normalizer;
        for (name, value) in [
            ("normalizer.fuzzy_threshold", n.fuzzy_threshold),
            ("normalizer.review.automated_min", n.review.automated_min),
            ("normalizer.review.review_min", n.review.review_min),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(NormalizerError::Config(format!(
                    "{} must be within [0, 1], got {}",
                    name, value
                )));
            }
        }
        if n.review.review_min > n.review.automated_min {
            return Err(NormalizerError::Config(format!(
                "normalizer.review.review_min ({}) exceeds automated_min ({})",
                n.review.review_min, n.review.automated_min
            )));
        }
        if self.batch.location_field.trim().is_empty() {
            return Err(NormalizerError::MissingField("batch.location_field".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_empty_toml_yields_defaults() {
        let config = AppConfig::from_toml_str("").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.normalizer.fuzzy_threshold, 0.7);
        assert_eq!(config.batch.location_field, "location");
    }

    #[test]
    fn test_partial_override() {
        let config = AppConfig::from_toml_str(
            r#"
            [normalizer]
            fuzzy_threshold = 0.8

            [batch]
            hint_field = "organization"
            "#,
        )
        .unwrap();
        assert_eq!(config.normalizer.fuzzy_threshold, 0.8);
        assert_eq!(config.normalizer.review.automated_min, 0.9);
        assert_eq!(config.batch.hint_field, "organization");
        assert_eq!(config.batch.location_field, "location");
    }

    #[test]
    fn test_rejects_out_of_range_threshold() {
        let err = AppConfig::from_toml_str("[normalizer]\nfuzzy_threshold = 1.5\n").unwrap_err();
        assert!(matches!(err, NormalizerError::Config(_)));
    }

    #[test]
    fn test_rejects_inverted_review_band() {
        let err = AppConfig::from_toml_str(
            "[normalizer.review]\nautomated_min = 0.4\nreview_min = 0.6\n",
        )
        .unwrap_err();
        assert!(err.to_string().contains("review_min"));
    }

    #[test]
    fn test_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[batch]\nlocation_field = \"Location\"").unwrap();
        let config = AppConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.batch.location_field, "Location");
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        let result = AppConfig::load(Some(Path::new("/nonexistent/normalizer.toml")));
        assert!(result.is_err());
    }
}
