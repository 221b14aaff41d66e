//! Error types for the channelmap core library
//!
//! Per-field evaluation failures live in [`crate::transform::TransformError`] and are
//! collected as data. The [`Error`] type defined here covers failures at the
//! configuration and collaborator boundary: rejected rules, rejected mapping sets,
//! unknown channels and store failures.

use crate::mapping::ValidationIssue;
use crate::transform::RuleShapeError;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Main error type for channelmap operations
#[derive(Error, Debug)]
pub enum Error {
    /// A transform rule descriptor was malformed
    #[error("Invalid transform rule: {source}")]
    RuleShape {
        #[from]
        source: RuleShapeError,
    },

    /// A mapping set was rejected at the configuration boundary
    #[error("Mapping validation failed with {} error(s)", count_errors(.issues))]
    Validation { issues: Vec<ValidationIssue> },

    /// The requested channel is unknown to the collaborator
    #[error("Channel not found: {channel_id}")]
    ChannelNotFound { channel_id: String },

    /// A storage collaborator failed
    #[error("Store error: {message}")]
    Store {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },

    /// JSON parsing and serialization errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: serde_json::Error,
    },

    /// IO errors
    #[error("IO error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience type alias for Results using our Error type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a store error without an underlying cause
    pub fn store(message: impl Into<String>) -> Self {
        Error::Store {
            message: message.into(),
            source: None,
        }
    }

    /// Create a channel-not-found error
    pub fn channel_not_found(channel_id: impl Into<String>) -> Self {
        Error::ChannelNotFound {
            channel_id: channel_id.into(),
        }
    }
}

fn count_errors(issues: &[ValidationIssue]) -> usize {
    issues
        .iter()
        .filter(|issue| issue.severity == Severity::Error)
        .count()
}

/// Severity levels for validation findings
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational, no action required
    Info,
    /// Warning, should be reviewed
    Warning,
    /// Error, the mapping set cannot be saved
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

// Conversion implementations
impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::Store {
            message: err.to_string(),
            source: Some(err),
        }
    }
}
