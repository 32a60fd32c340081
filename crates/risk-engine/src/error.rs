//! Error types for the risk engine

use shared_pdf::DocumentError;
use thiserror::Error;

/// Why the `[집합건물]` line could not be turned into an address and building name
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("[집합건물] marker line not found")]
    MarkerNotFound,

    #[error("address needs region and two city/district tokens before the neighborhood (boundary: {boundary:?})")]
    InsufficientTokens { boundary: Option<usize> },

    #[error("no building name left after removing unit and floor markers")]
    MissingBuildingName,
}

/// Transport or payload failure for one registry query
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("Registry request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Registry returned an error ({code}): {message}")]
    Service { code: String, message: String },

    #[error("Malformed registry payload: {0}")]
    Payload(String),
}

impl RegistryError {
    /// Whether asking again may succeed; a service answer such as "no data"
    /// (resultCode 03) or a rejected key will not change on retry
    pub fn is_transient(&self) -> bool {
        !matches!(self, RegistryError::Service { .. })
    }
}

/// A single registry item that cannot become a trade record; skipped, never escalated
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MalformedRecord {
    #[error("missing field '{0}'")]
    MissingField(&'static str),

    #[error("invalid {field}: '{value}'")]
    InvalidField { field: &'static str, value: String },
}

#[derive(Error, Debug)]
pub enum ReferenceTableError {
    #[error("Failed to read reference table: {0}")]
    Csv(#[from] csv::Error),

    #[error("Reference table is missing column '{0}'")]
    MissingColumn(&'static str),
}

#[derive(Error, Debug)]
pub enum ScoringError {
    #[error("Failed to load scoring model: {0}")]
    Load(String),

    #[error("Scoring model has no weight for feature '{0}'")]
    UnknownFeature(String),

    #[error("Scoring service request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Scoring service returned an invalid response: {0}")]
    InvalidResponse(String),
}

#[derive(Error, Debug)]
pub enum SummaryError {
    #[error("Summary service request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Summary service returned no text")]
    EmptyResponse,

    #[error("Summary service is not configured: {0}")]
    NotConfigured(String),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
}

/// Failure while assembling the pipeline's default capabilities at startup
#[derive(Error, Debug)]
pub enum SetupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    ReferenceTable(#[from] ReferenceTableError),

    #[error("Registry client: {0}")]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Scoring(#[from] ScoringError),

    #[error(transparent)]
    Summary(#[from] SummaryError),
}

/// Failure of one analysis run; no partial report is produced
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Address or building name extraction failed: {0}")]
    Extraction(#[from] ParseError),

    #[error("No administrative code for address '{0}'")]
    Lookup(String),

    #[error("No comparable transaction found for '{building}' in {code}")]
    NoComparableTransaction { code: String, building: String },

    #[error("Document recognition failed: {0}")]
    Recognition(#[from] DocumentError),

    #[error("Scoring failed: {0}")]
    Scoring(#[from] ScoringError),

    #[error("Summary generation failed: {0}")]
    Summary(#[from] SummaryError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
