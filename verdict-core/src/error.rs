//! Core error types for Verdict
//!
//! Only configuration mistakes are errors. Anything that goes wrong while a
//! session is executing is recorded as data on the session result instead.

use thiserror::Error;

/// Core error type for the load simulation and scoring engine
#[derive(Debug, Error, Clone, PartialEq)]
pub enum VerdictError {
    /// Scenario catalog is empty or carries an unusable weight
    #[error("Invalid scenario catalog: {0}")]
    InvalidCatalog(String),

    /// Aggregation was asked to summarize zero sessions
    #[error("Cannot summarize an empty result set")]
    EmptyResultSet,

    /// Category weights do not line up with the supplied category scores
    #[error("Category weight mismatch: {0}")]
    WeightMismatch(String),

    /// Run, threshold or breakpoint configuration is unusable
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type alias for Verdict
pub type Result<T> = std::result::Result<T, VerdictError>;

impl From<serde_json::Error> for VerdictError {
    fn from(err: serde_json::Error) -> Self {
        VerdictError::Serialization(err.to_string())
    }
}
