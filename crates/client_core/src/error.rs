use std::path::PathBuf;

use shared::error::ValidationError;
use thiserror::Error;

/// Which layer rejected a submission attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Transport,
    Application,
}

/// Why a submission attempt ended without a translation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmissionError {
    #[error("empty input")]
    EmptyInput,
    #[error("input too long: {len} units, limit is {max}")]
    InputTooLong { len: usize, max: usize },
    #[error("network error: {0}")]
    NetworkFailure(String),
    #[error("{0}")]
    ApiFailure(String),
}

impl SubmissionError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::EmptyInput | Self::InputTooLong { .. } => ErrorCategory::Validation,
            Self::NetworkFailure(_) => ErrorCategory::Transport,
            Self::ApiFailure(_) => ErrorCategory::Application,
        }
    }
}

impl From<ValidationError> for SubmissionError {
    fn from(value: ValidationError) -> Self {
        match value {
            ValidationError::EmptyText => Self::EmptyInput,
            ValidationError::TextTooLong { len, max } => Self::InputTooLong { len, max },
        }
    }
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("invalid url: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("unreadable response body (status {status}): {source}")]
    Decode {
        status: u16,
        #[source]
        source: serde_json::Error,
    },
    #[error("server returned {status}: {message}")]
    Status { status: u16, message: String },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read settings file '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse settings file '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid value '{value}' for {key}")]
    InvalidValue { key: &'static str, value: String },
    #[error("failed to build http client: {0}")]
    HttpClient(#[source] reqwest::Error),
    #[error("invalid server url '{value}': {source}")]
    InvalidServerUrl {
        value: String,
        #[source]
        source: url::ParseError,
    },
}
