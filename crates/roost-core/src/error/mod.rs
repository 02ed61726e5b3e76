//! Error types and result aliases for roost operations.
//!
//! Provides a unified error type that covers all possible error conditions
//! across the roost crates with actionable error messages.

use thiserror::Error;

/// Unified error type for all roost operations
#[derive(Error, Debug)]
pub enum RoostError {
    // Resolver errors
    #[error("failed to fetch {url}: {reason}")]
    Fetch { url: String, reason: String },

    #[error("cannot resolve '{specifier}' against '{base}': {reason}")]
    InvalidSpecifier {
        specifier: String,
        base: String,
        reason: String,
    },

    // Registry errors
    #[error("HTTP client error: {message}")]
    Http {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("registry returned status {status} while {action}")]
    RegistryStatus { status: u16, action: String },

    #[error("{name}@{version} is already published")]
    AlreadyPublished { name: String, version: String },

    #[error("no API key found")]
    MissingApiKey,

    // Config errors
    #[error("failed to parse configuration: {message}")]
    ConfigParse { message: String },

    #[error("configuration field '{field}' is invalid: {reason}")]
    ConfigValidation { field: String, reason: String },

    #[error("file pattern '{pattern}' {reason}")]
    FileMatching { pattern: String, reason: String },

    // IO errors
    #[error("IO error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias for roost operations
pub type RoostResult<T> = Result<T, RoostError>;

impl RoostError {
    /// Create an HTTP error from any error type
    pub fn http<E>(message: String, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Http {
            message,
            source: Some(Box::new(source)),
        }
    }

    /// Create an IO error from std::io::Error
    pub fn io(message: String, source: std::io::Error) -> Self {
        Self::Io { message, source }
    }

    /// Get a user-friendly suggestion for fixing this error
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            RoostError::Http { .. } => Some("Check your internet connection and try again"),
            RoostError::MissingApiKey => {
                Some("Link your registry API key with `roost link <key>`")
            },
            RoostError::AlreadyPublished { .. } => {
                Some("Increment the version in your configuration before publishing")
            },
            RoostError::ConfigValidation { .. } => {
                Some("Run `roost init` to generate a fresh configuration")
            },
            _ => None,
        }
    }
}
