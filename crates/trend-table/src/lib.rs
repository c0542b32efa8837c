//! Trend Sample Tables
//!
//! Column-oriented storage for building-automation trend data, tri-state
//! condition series derived from it, and CSV loading of trend exports.

mod condition;
mod error;
mod source;
mod table;

pub use condition::{ConditionSeries, Tristate};
pub use error::TableError;
pub use source::{parse_timestamp, CsvSource, LoadStats, SampleSource, Schema, TIMESTAMP_FORMATS};
pub use table::{finite, Column, ColumnData, ColumnKind, SampleTable, Value};
