//! Table Error Types

use thiserror::Error;

/// Errors raised while building, loading, or reading a sample table
#[derive(Debug, Error)]
pub enum TableError {
    /// Column not present in the table
    #[error("Missing column: {0}")]
    MissingColumn(String),

    /// Column exists but holds a different kind of data
    #[error("Column {column} holds {found} data, expected {expected}")]
    TypeMismatch {
        column: String,
        expected: &'static str,
        found: &'static str,
    },

    /// Sequences that must be aligned by row have different lengths
    #[error("{context}: length {actual} does not match table length {expected}")]
    LengthMismatch {
        context: String,
        expected: usize,
        actual: usize,
    },

    /// Column name registered twice
    #[error("Duplicate column: {0}")]
    DuplicateColumn(String),

    /// Timestamps not ascending
    #[error("Timestamp at row {row} is earlier than the previous row")]
    Unordered { row: usize },

    /// Row index past the end of the table
    #[error("Row {row} is out of range for table of {len} rows")]
    RowOutOfRange { row: usize, len: usize },

    /// Malformed CSV content
    #[error("Line {line}, column {column}: {reason}")]
    Parse {
        line: usize,
        column: String,
        reason: String,
    },

    /// Missing or unreadable header row
    #[error("Invalid header: {0}")]
    Header(String),

    /// Underlying read failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
