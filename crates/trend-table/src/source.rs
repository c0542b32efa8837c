//! Sample Sources
//!
//! Trend exports from building automation front-ends are comma-separated with
//! a header row. Exports are often dirty: blank lines, truncated rows, and
//! empty cells where a point was offline. Loading keeps the table usable:
//! blank lines and rows with the wrong number of fields are skipped, empty
//! cells become missing samples.

use crate::error::TableError;
use crate::table::{ColumnData, ColumnKind, SampleTable};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Accepted timestamp layouts, tried in order
pub const TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

/// Anything that can produce a sample table
pub trait SampleSource {
    fn load(&self) -> Result<SampleTable, TableError>;
}

/// Declared columns of a trend export
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Schema {
    /// Header of the timestamp column
    pub timestamp_column: String,
    /// Data columns and their kinds
    pub columns: Vec<(String, ColumnKind)>,
}

impl Schema {
    /// Create a schema with no data columns
    pub fn new(timestamp_column: impl Into<String>) -> Self {
        Self {
            timestamp_column: timestamp_column.into(),
            columns: Vec::new(),
        }
    }

    /// Declare a data column
    pub fn column(mut self, name: impl Into<String>, kind: ColumnKind) -> Self {
        self.columns.push((name.into(), kind));
        self
    }
}

/// Line accounting for one load
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadStats {
    /// Rows kept in the table
    pub rows: usize,
    /// Blank lines skipped
    pub blank_lines: usize,
    /// Lines skipped for a field count that differs from the header
    pub malformed_lines: usize,
}

/// CSV file source
pub struct CsvSource {
    path: PathBuf,
    schema: Schema,
}

impl CsvSource {
    pub fn new(path: impl AsRef<Path>, schema: Schema) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            schema,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Parse CSV text from any buffered reader
    pub fn parse<R: BufRead>(reader: R, schema: &Schema) -> Result<(SampleTable, LoadStats), TableError> {
        let mut lines = reader.lines().enumerate();
        let mut stats = LoadStats::default();

        let header = loop {
            match lines.next() {
                Some((_, line)) => {
                    let line = line?;
                    let line = line.trim_start_matches('\u{feff}');
                    if !line.trim().is_empty() {
                        break split_fields(line);
                    }
                }
                None => return Err(TableError::Header("file has no header row".into())),
            }
        };

        let position = |name: &str| -> Result<usize, TableError> {
            header
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| TableError::MissingColumn(name.to_string()))
        };
        let ts_index = position(&schema.timestamp_column)?;
        let indices = schema
            .columns
            .iter()
            .map(|(name, _)| position(name))
            .collect::<Result<Vec<_>, _>>()?;

        let mut timestamps = Vec::new();
        let mut builders: Vec<ColumnBuilder> = schema
            .columns
            .iter()
            .map(|(_, kind)| ColumnBuilder::new(*kind))
            .collect();

        for (index, line) in lines {
            let line = line?;
            let line_no = index + 1;
            if line.trim().is_empty() {
                stats.blank_lines += 1;
                continue;
            }

            let fields = split_fields(&line);
            if fields.len() != header.len() {
                warn!(
                    "Skipping line {}: {} fields, header has {}",
                    line_no,
                    fields.len(),
                    header.len()
                );
                stats.malformed_lines += 1;
                continue;
            }

            timestamps.push(parse_timestamp(&fields[ts_index]).ok_or_else(|| {
                TableError::Parse {
                    line: line_no,
                    column: schema.timestamp_column.clone(),
                    reason: format!("unrecognised timestamp '{}'", fields[ts_index]),
                }
            })?);

            for ((builder, &col), (name, _)) in builders
                .iter_mut()
                .zip(indices.iter())
                .zip(schema.columns.iter())
            {
                builder
                    .push(&fields[col])
                    .map_err(|reason| TableError::Parse {
                        line: line_no,
                        column: name.clone(),
                        reason,
                    })?;
            }
            stats.rows += 1;
        }

        let mut table = SampleTable::new(schema.timestamp_column.clone(), timestamps)?;
        for (builder, (name, _)) in builders.into_iter().zip(schema.columns.iter()) {
            table.push_column(name.clone(), builder.finish())?;
        }

        debug!("Parsed {} rows, {} columns", stats.rows, schema.columns.len());
        Ok((table, stats))
    }
}

impl SampleSource for CsvSource {
    fn load(&self) -> Result<SampleTable, TableError> {
        let file = File::open(&self.path)?;
        let (table, stats) = Self::parse(BufReader::new(file), &self.schema)?;
        info!(
            "Loaded {} rows from {} ({} blank, {} malformed lines skipped)",
            stats.rows,
            self.path.display(),
            stats.blank_lines,
            stats.malformed_lines
        );
        Ok(table)
    }
}

/// Parse a timestamp in any of the accepted layouts
pub fn parse_timestamp(text: &str) -> Option<NaiveDateTime> {
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
}

/// Split a line on commas, trimming whitespace around each field.
/// Double-quoted fields may contain commas, and `""` inside quotes is a
/// literal quote.
fn split_fields(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut quoted = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if quoted && chars.peek() == Some(&'"') => {
                field.push('"');
                chars.next();
            }
            '"' => quoted = !quoted,
            ',' if !quoted => fields.push(std::mem::take(&mut field).trim().to_string()),
            _ => field.push(c),
        }
    }
    fields.push(field.trim().to_string());
    fields
}

enum ColumnBuilder {
    Numeric(Vec<Option<f64>>),
    Boolean(Vec<Option<bool>>),
    Categorical(Vec<Option<String>>),
}

impl ColumnBuilder {
    fn new(kind: ColumnKind) -> Self {
        match kind {
            ColumnKind::Numeric => ColumnBuilder::Numeric(Vec::new()),
            ColumnKind::Boolean => ColumnBuilder::Boolean(Vec::new()),
            ColumnKind::Categorical => ColumnBuilder::Categorical(Vec::new()),
        }
    }

    fn push(&mut self, text: &str) -> Result<(), String> {
        let text = (!text.is_empty()).then_some(text);
        match self {
            ColumnBuilder::Numeric(v) => v.push(
                text.map(|t| {
                    t.parse::<f64>()
                        .map_err(|_| format!("'{}' is not a number", t))
                })
                .transpose()?
                .filter(|v| v.is_finite()),
            ),
            ColumnBuilder::Boolean(v) => v.push(text.map(parse_bool).transpose()?),
            ColumnBuilder::Categorical(v) => v.push(text.map(str::to_string)),
        }
        Ok(())
    }

    fn finish(self) -> ColumnData {
        match self {
            ColumnBuilder::Numeric(v) => ColumnData::Numeric(v),
            ColumnBuilder::Boolean(v) => ColumnData::Boolean(v),
            ColumnBuilder::Categorical(v) => ColumnData::Categorical(v),
        }
    }
}

fn parse_bool(text: &str) -> Result<bool, String> {
    match text.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" | "occupied" => Ok(true),
        "false" | "0" | "no" | "off" | "unoccupied" => Ok(false),
        _ => Err(format!("'{}' is not a boolean", text)),
    }
}
