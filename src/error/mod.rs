//! Error handling for the S3 response time probe
//!
//! Every failure is fatal for the run. The variants only exist so that the
//! diagnostic line and the log record can say which part of the lifecycle
//! broke; the process exit status is the same for all of them.

use thiserror::Error;

use crate::storage::StorageError;

/// Exit status used for every fatal condition
pub const FAILURE_EXIT_CODE: i32 = 2;

/// Custom error types for the probe
#[derive(Error, Debug)]
pub enum AppError {
    /// Missing or malformed configuration
    #[error("{0}")]
    Config(String),

    /// Local scratch file operations
    #[error("{0}")]
    Io(String),

    /// Rejections and transport failures from the storage service
    #[error("{0}")]
    Storage(String),

    /// Digest mismatch after upload or download
    #[error("{0}")]
    Integrity(String),

    /// Failures writing the latency sample to the metrics backend
    #[error("Failed to write to influxdb: {0}")]
    Metrics(String),

    /// Generic internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config(message.into())
    }

    /// Create a new local I/O error
    pub fn io<S: Into<String>>(message: S) -> Self {
        Self::Io(message.into())
    }

    /// Create a new storage service error
    pub fn storage<S: Into<String>>(message: S) -> Self {
        Self::Storage(message.into())
    }

    /// Create a new integrity verification error
    pub fn integrity<S: Into<String>>(message: S) -> Self {
        Self::Integrity(message.into())
    }

    /// Create a new metrics transport error
    pub fn metrics<S: Into<String>>(message: S) -> Self {
        Self::Metrics(message.into())
    }

    /// Create a new internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal(message.into())
    }

    /// Wrap a storage client error, naming the operation that failed
    pub fn from_storage(operation: &str, error: StorageError) -> Self {
        match error {
            StorageError::Io(e) => Self::io(format!("{} error: {}", operation, e)),
            other => Self::storage(format!("S3 {} error: {}", operation, other)),
        }
    }

    /// Get error category for logging and reporting
    pub fn category(&self) -> &'static str {
        match self {
            Self::Config(_) => "CONFIG",
            Self::Io(_) => "IO",
            Self::Storage(_) => "STORAGE",
            Self::Integrity(_) => "INTEGRITY",
            Self::Metrics(_) => "METRICS",
            Self::Internal(_) => "INTERNAL",
        }
    }

    /// Get exit code for this error type
    ///
    /// A probe only signals up or down, so every category maps to the same code.
    pub fn exit_code(&self) -> i32 {
        FAILURE_EXIT_CODE
    }

    /// Format the single diagnostic line printed on failure
    pub fn format_for_console(&self, use_color: bool) -> String {
        if use_color {
            use colored::Colorize;
            format!("{} - {}", "CRITICAL".red().bold(), self)
        } else {
            format!("CRITICAL - {}", self)
        }
    }
}

// Standard library error conversions
impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::io(error.to_string())
    }
}

impl From<url::ParseError> for AppError {
    fn from(error: url::ParseError) -> Self {
        Self::config(format!("URL parse error: {}", error))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(error: serde_json::Error) -> Self {
        Self::config(format!("Could not decode configuration JSON: {}", error))
    }
}

/// Custom Result type for the application
pub type Result<T> = std::result::Result<T, AppError>;
