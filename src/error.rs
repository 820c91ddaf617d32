use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Error types for Keyword Studio
#[derive(Error, Debug)]
pub enum StudioError {
    // Fetch errors
    #[error("Invalid URL format: {url} ({reason})")]
    InvalidUrl { url: String, reason: String },

    #[error("Timeout error for {url}")]
    Timeout { url: String },

    #[error("Request error for {url}: {message}")]
    Network { url: String, message: String },

    #[error("HTTP request failed: {url} - {status}")]
    HttpStatus { url: String, status: u16 },

    // Analysis errors
    #[error("Not enough URLs could be crawled successfully. Failed URLs: {}", format_failures(.failures))]
    InsufficientSources { failures: Vec<UrlFailure> },

    #[error("Input validation failed: {message}")]
    InputValidation { message: String },

    // Classifier errors
    #[error("Classification failed: {message}")]
    Classification { message: String },

    // Storage errors
    #[error("Analysis not found: {analysis_id}")]
    NotFound { analysis_id: String },

    #[error("Storage error: {message}")]
    Storage { message: String },

    // Configuration errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl StudioError {
    /// Create an invalid URL error
    pub fn invalid_url(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidUrl { url: url.into(), reason: reason.into() }
    }

    /// Create a network error
    pub fn network(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Network { url: url.into(), message: message.into() }
    }

    /// Create an input validation error
    pub fn input(message: impl Into<String>) -> Self {
        Self::InputValidation { message: message.into() }
    }

    /// Create a classification error
    pub fn classification(message: impl Into<String>) -> Self {
        Self::Classification { message: message.into() }
    }

    /// Create a storage error
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage { message: message.into() }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Configuration { message: message.into() }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal { message: message.into() }
    }

    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            Self::InvalidUrl { .. } | Self::Timeout { .. } | Self::Network { .. } | Self::HttpStatus { .. } => "fetch",
            Self::InsufficientSources { .. } | Self::InputValidation { .. } => "analysis",
            Self::Classification { .. } => "classifier",
            Self::NotFound { .. } | Self::Storage { .. } => "storage",
            Self::Configuration { .. } => "configuration",
            Self::Internal { .. } => "internal",
        }
    }

    /// Structured failure kind for per-URL records
    pub fn failure_kind(&self) -> FailureKind {
        match self {
            Self::InvalidUrl { .. } => FailureKind::InvalidUrl,
            Self::Timeout { .. } => FailureKind::Timeout,
            Self::Network { .. } => FailureKind::Network,
            Self::HttpStatus { .. } => FailureKind::HttpStatus,
            _ => FailureKind::Other,
        }
    }
}

/// Result type alias for Keyword Studio
pub type StudioResult<T> = std::result::Result<T, StudioError>;

/// Kind of per-URL failure recorded in an analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    InvalidUrl,
    Timeout,
    Network,
    HttpStatus,
    Other,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid_url"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::Network => write!(f, "network"),
            FailureKind::HttpStatus => write!(f, "http_status"),
            FailureKind::Other => write!(f, "other"),
        }
    }
}

/// A URL that could not be processed, with its reason
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlFailure {
    pub url: String,
    pub kind: FailureKind,
    pub reason: String,
}

impl UrlFailure {
    pub fn from_error(url: impl Into<String>, error: &StudioError) -> Self {
        Self {
            url: url.into(),
            kind: error.failure_kind(),
            reason: error.to_string(),
        }
    }
}

impl fmt::Display for UrlFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.url, self.reason)
    }
}

fn format_failures(failures: &[UrlFailure]) -> String {
    failures
        .iter()
        .map(|failure| failure.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

impl From<std::io::Error> for StudioError {
    fn from(err: std::io::Error) -> Self {
        Self::Storage { message: err.to_string() }
    }
}

impl From<serde_json::Error> for StudioError {
    fn from(err: serde_json::Error) -> Self {
        Self::Storage { message: err.to_string() }
    }
}

/// Convert anyhow::Error to StudioError
impl From<anyhow::Error> for StudioError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal { message: err.to_string() }
    }
}
