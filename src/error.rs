//! Error types for a3s-watch

use thiserror::Error;

/// Errors that can occur while fetching, configuring, or filtering
///
/// The permission, triage, and query functions never produce these;
/// they are total over their inputs. Errors only come from the
/// external log source seam, configuration loading, and filter token
/// parsing.
#[derive(Debug, Error)]
pub enum WatchError {
    /// External log source failed to deliver a collection
    #[error("Log source error: {0}")]
    Source(String),

    /// Serialization/deserialization failure
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Filter token that does not name a known value
    #[error("Invalid filter value '{value}' for {field}")]
    InvalidFilter {
        field: &'static str,
        value: String,
    },
}

/// Result type alias for watch operations
pub type Result<T> = std::result::Result<T, WatchError>;
