//! Engine Error Types
//!
//! A detected fault is not an error; it travels as [`crate::Verdict::Fault`].
//! Everything here means the dataset, the rule, or its configuration is broken.

use thiserror::Error;
use trend_table::TableError;

/// Error returned by a reporting sink
pub type SinkError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that abort an evaluation pass
#[derive(Debug, Error)]
pub enum EngineError {
    /// Threshold or detector parameter out of range
    #[error("Invalid parameter {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    /// Fault payload failed validation
    #[error("Invalid fault record: {0}")]
    InvalidRecord(String),

    /// Dataset problem (missing column, wrong type, misaligned series)
    #[error(transparent)]
    Table(#[from] TableError),

    /// Failure inside a named rule
    #[error("Rule {rule} failed: {source}")]
    Rule {
        rule: String,
        source: Box<EngineError>,
    },

    /// Reporting sink rejected a record
    #[error("Reporting sink failed: {0}")]
    Sink(#[source] SinkError),
}

impl EngineError {
    /// Name of the rule that raised this error, if known
    pub fn rule(&self) -> Option<&str> {
        match self {
            EngineError::Rule { rule, .. } => Some(rule),
            _ => None,
        }
    }
}
