use thiserror::Error;

/// Errors raised by configuration loading and batch I/O.
///
/// Normalization itself never fails; unresolvable input is reported through
/// [`crate::normalize::NormalizedLocation`].
#[derive(Error, Debug)]
pub enum NormalizerError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON deserialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Malformed record on line {line}: {message}")]
    Row { line: usize, message: String },
}

pub type Result<T> = std::result::Result<T, NormalizerError>;
