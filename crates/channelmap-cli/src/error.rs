//! Error types and handling for the CLI
//!
//! Every handler returns [`Result`]; `main` turns the error into a message on
//! stderr and a process exit code.

use std::io;
use std::path::PathBuf;

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for CLI operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error (file operations, etc.)
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Error from channelmap-core
    #[error(transparent)]
    Core(#[from] channelmap_core::Error),

    /// File not found
    #[error("File not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    /// A file could not be parsed in the format its extension implies
    #[error("Invalid file format for {}: expected {} ({})", path.display(), expected, reason)]
    InvalidFormat {
        path: PathBuf,
        expected: String,
        reason: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid argument combination or value
    #[error("Invalid arguments: {0}")]
    InvalidArgs(String),

    /// No catalog file was given on the command line or in the configuration
    #[error("No catalog configured. Pass --catalog, set CHANNELMAP_CATALOG or add catalog.path to the config file")]
    CatalogNotConfigured,

    /// A preview or rule test completed with per-field failures
    #[error("{failed} mapping(s) failed")]
    MappingFailures { failed: usize },

    /// A mapping set has blocking issues, or warnings under `--strict`
    #[error("Mapping set failed validation: {errors} error(s), {warnings} warning(s)")]
    ValidationFailed { errors: usize, warnings: usize },

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML serialization/deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Generic error with context
    #[error("{message}")]
    Other { message: String },
}

impl Error {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create an invalid arguments error
    pub fn invalid_args(message: impl Into<String>) -> Self {
        Self::InvalidArgs(message.into())
    }

    /// Create a generic error with message
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }

    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Io(_) => 1,
            Self::Core(core) => match core {
                channelmap_core::Error::ChannelNotFound { .. } => 7,
                channelmap_core::Error::Validation { .. } => 8,
                channelmap_core::Error::RuleShape { .. } => 9,
                _ => 2,
            },
            Self::FileNotFound { .. } => 3,
            Self::InvalidFormat { .. } => 4,
            Self::Config(_) | Self::CatalogNotConfigured => 5,
            Self::InvalidArgs(_) => 6,
            Self::ValidationFailed { .. } => 8,
            Self::MappingFailures { .. } => 10,
            Self::Json(_) => 12,
            Self::Yaml(_) => 13,
            Self::Other { .. } => 99,
        }
    }

    /// Check if this error should display usage help
    pub fn should_show_help(&self) -> bool {
        matches!(self, Self::InvalidArgs(_) | Self::CatalogNotConfigured)
    }
}

impl From<channelmap_core::RuleShapeError> for Error {
    fn from(err: channelmap_core::RuleShapeError) -> Self {
        Self::Core(err.into())
    }
}

/// Format an error for display to the user
pub fn format_error(error: &Error, use_color: bool) -> String {
    let mut message = if use_color {
        use colored::Colorize;
        format!("{} {}", "Error:".red().bold(), error)
    } else {
        format!("Error: {}", error)
    };

    // Rejected saves list each blocking issue
    if let Error::Core(channelmap_core::Error::Validation { issues }) = error {
        for issue in issues
            .iter()
            .filter(|issue| issue.severity == channelmap_core::Severity::Error)
        {
            message.push_str(&format!("\n  - {}", issue));
        }
    }

    message
}
