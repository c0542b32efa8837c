//! Sample Table Implementation

use crate::condition::{ConditionSeries, Tristate};
use crate::error::TableError;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Declared kind of a data column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnKind {
    Numeric,
    Boolean,
    Categorical,
}

impl ColumnKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnKind::Numeric => "numeric",
            ColumnKind::Boolean => "boolean",
            ColumnKind::Categorical => "categorical",
        }
    }
}

/// Column values; `None` marks a missing sample
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    Numeric(Vec<Option<f64>>),
    Boolean(Vec<Option<bool>>),
    Categorical(Vec<Option<String>>),
}

impl ColumnData {
    pub fn kind(&self) -> ColumnKind {
        match self {
            ColumnData::Numeric(_) => ColumnKind::Numeric,
            ColumnData::Boolean(_) => ColumnKind::Boolean,
            ColumnData::Categorical(_) => ColumnKind::Categorical,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ColumnData::Numeric(v) => v.len(),
            ColumnData::Boolean(v) => v.len(),
            ColumnData::Categorical(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn value(&self, row: usize) -> Value {
        match self {
            ColumnData::Numeric(v) => v[row].map(Value::Number).unwrap_or(Value::Missing),
            ColumnData::Boolean(v) => v[row].map(Value::Flag).unwrap_or(Value::Missing),
            ColumnData::Categorical(v) => v[row]
                .clone()
                .map(Value::Text)
                .unwrap_or(Value::Missing),
        }
    }
}

/// Named column of a sample table
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub data: ColumnData,
}

/// A single cell, as carried in fault payloads
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Timestamp(NaiveDateTime),
    Number(f64),
    Flag(bool),
    Text(String),
    Missing,
}

/// Time-ordered trend samples stored column-wise
#[derive(Debug, Clone)]
pub struct SampleTable {
    timestamp_column: String,
    timestamps: Vec<NaiveDateTime>,
    columns: Vec<Column>,
}

impl SampleTable {
    /// Create a table from its timestamp axis (must be ascending)
    pub fn new(
        timestamp_column: impl Into<String>,
        timestamps: Vec<NaiveDateTime>,
    ) -> Result<Self, TableError> {
        if let Some(row) = timestamps
            .windows(2)
            .position(|pair| pair[1] < pair[0])
        {
            return Err(TableError::Unordered { row: row + 1 });
        }
        Ok(Self {
            timestamp_column: timestamp_column.into(),
            timestamps,
            columns: Vec::new(),
        })
    }

    /// Add a data column aligned with the timestamp axis
    pub fn with_column(
        mut self,
        name: impl Into<String>,
        data: ColumnData,
    ) -> Result<Self, TableError> {
        self.push_column(name, data)?;
        Ok(self)
    }

    /// Add a data column in place
    pub fn push_column(&mut self, name: impl Into<String>, data: ColumnData) -> Result<(), TableError> {
        let name = name.into();
        if name == self.timestamp_column || self.columns.iter().any(|c| c.name == name) {
            return Err(TableError::DuplicateColumn(name));
        }
        if data.len() != self.len() {
            return Err(TableError::LengthMismatch {
                context: format!("column {}", name),
                expected: self.len(),
                actual: data.len(),
            });
        }
        self.columns.push(Column { name, data });
        Ok(())
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    /// Name of the timestamp column (the primary axis in fault payloads)
    pub fn timestamp_column(&self) -> &str {
        &self.timestamp_column
    }

    pub fn timestamps(&self) -> &[NaiveDateTime] {
        &self.timestamps
    }

    /// Names of the data columns in insertion order
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    /// Check whether a column (or the timestamp axis) exists
    pub fn has_column(&self, name: &str) -> bool {
        name == self.timestamp_column || self.columns.iter().any(|c| c.name == name)
    }

    /// Look up a data column by name
    pub fn column(&self, name: &str) -> Result<&Column, TableError> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| TableError::MissingColumn(name.to_string()))
    }

    /// Numeric column values
    pub fn numeric(&self, name: &str) -> Result<&[Option<f64>], TableError> {
        match &self.column(name)?.data {
            ColumnData::Numeric(v) => Ok(v),
            other => Err(type_mismatch(name, ColumnKind::Numeric, other.kind())),
        }
    }

    /// Boolean column values
    pub fn boolean(&self, name: &str) -> Result<&[Option<bool>], TableError> {
        match &self.column(name)?.data {
            ColumnData::Boolean(v) => Ok(v),
            other => Err(type_mismatch(name, ColumnKind::Boolean, other.kind())),
        }
    }

    /// Categorical column values
    pub fn categorical(&self, name: &str) -> Result<&[Option<String>], TableError> {
        match &self.column(name)?.data {
            ColumnData::Categorical(v) => Ok(v),
            other => Err(type_mismatch(name, ColumnKind::Categorical, other.kind())),
        }
    }

    /// Values of a column (timestamp axis included) at the given rows
    pub fn project(&self, name: &str, rows: &[usize]) -> Result<Vec<Value>, TableError> {
        let len = self.len();
        if let Some(&row) = rows.iter().find(|&&r| r >= len) {
            return Err(TableError::RowOutOfRange { row, len });
        }

        if name == self.timestamp_column {
            return Ok(rows
                .iter()
                .map(|&r| Value::Timestamp(self.timestamps[r]))
                .collect());
        }

        let column = self.column(name)?;
        Ok(rows.iter().map(|&r| column.data.value(r)).collect())
    }

    /// `column > threshold` per sample
    pub fn above(&self, name: &str, threshold: f64) -> Result<ConditionSeries, TableError> {
        Ok(compare(self.numeric(name)?, |v| v > threshold))
    }

    /// `column < threshold` per sample
    pub fn below(&self, name: &str, threshold: f64) -> Result<ConditionSeries, TableError> {
        Ok(compare(self.numeric(name)?, |v| v < threshold))
    }

    /// `|a - b| > tolerance` per sample
    pub fn deviation_above(
        &self,
        a: &str,
        b: &str,
        tolerance: f64,
    ) -> Result<ConditionSeries, TableError> {
        let a = self.numeric(a)?;
        let b = self.numeric(b)?;
        Ok(a.iter()
            .zip(b.iter())
            .map(|(x, y)| match (finite(x), finite(y)) {
                (Some(x), Some(y)) => Tristate::from((x - y).abs() > tolerance),
                _ => Tristate::Undefined,
            })
            .collect())
    }

    /// Categorical column equals `expected` per sample
    pub fn equals(&self, name: &str, expected: &str) -> Result<ConditionSeries, TableError> {
        Ok(self
            .categorical(name)?
            .iter()
            .map(|v| Tristate::from(v.as_deref().map(|s| s == expected)))
            .collect())
    }

    /// Boolean column is set per sample
    pub fn is_set(&self, name: &str) -> Result<ConditionSeries, TableError> {
        Ok(self.boolean(name)?.iter().map(|&v| Tristate::from(v)).collect())
    }
}

fn compare(values: &[Option<f64>], predicate: impl Fn(f64) -> bool) -> ConditionSeries {
    values
        .iter()
        .map(|v| match finite(v) {
            Some(x) => Tristate::from(predicate(x)),
            None => Tristate::Undefined,
        })
        .collect()
}

/// Sample value, treating NaN and infinities as missing
pub fn finite(value: &Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

fn type_mismatch(name: &str, expected: ColumnKind, found: ColumnKind) -> TableError {
    TableError::TypeMismatch {
        column: name.to_string(),
        expected: expected.as_str(),
        found: found.as_str(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn minutes(n: usize) -> Vec<NaiveDateTime> {
        let start = NaiveDate::from_ymd_opt(2021, 11, 19)
            .unwrap()
            .and_hms_opt(22, 0, 0)
            .unwrap();
        (0..n)
            .map(|i| start + chrono::Duration::minutes(5 * i as i64))
            .collect()
    }

    fn sample_table() -> SampleTable {
        SampleTable::new("DateTime", minutes(4))
            .unwrap()
            .with_column(
                "HeatingAirVolume",
                ColumnData::Numeric(vec![Some(0.0), Some(25.0), None, Some(40.0)]),
            )
            .unwrap()
            .with_column(
                "HeatCoolMode",
                ColumnData::Categorical(vec![
                    Some("HEAT".into()),
                    Some("COOL".into()),
                    Some("COOL".into()),
                    None,
                ]),
            )
            .unwrap()
    }

    #[test]
    fn test_rejects_unordered_timestamps() {
        let mut times = minutes(3);
        times.swap(1, 2);
        assert!(matches!(
            SampleTable::new("DateTime", times),
            Err(TableError::Unordered { row: 2 })
        ));
    }

    #[test]
    fn test_column_length_checked() {
        let result = SampleTable::new("DateTime", minutes(3))
            .unwrap()
            .with_column("RoomTemperature", ColumnData::Numeric(vec![Some(68.0)]));
        assert!(matches!(result, Err(TableError::LengthMismatch { .. })));
    }

    #[test]
    fn test_missing_and_mistyped_columns() {
        let table = sample_table();
        assert!(matches!(
            table.numeric("CoolingAirVolume"),
            Err(TableError::MissingColumn(_))
        ));
        assert!(matches!(
            table.numeric("HeatCoolMode"),
            Err(TableError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_above_marks_missing_undefined() {
        let table = sample_table();
        let series = table.above("HeatingAirVolume", 10.0).unwrap();
        assert_eq!(
            series.as_slice(),
            &[Tristate::False, Tristate::True, Tristate::Undefined, Tristate::True]
        );
    }

    #[test]
    fn test_non_finite_samples_undefined() {
        let table = SampleTable::new("DateTime", minutes(3))
            .unwrap()
            .with_column(
                "CoolingDamperCommand",
                ColumnData::Numeric(vec![Some(f64::NAN), Some(80.0), Some(80.0)]),
            )
            .unwrap()
            .with_column(
                "CoolingDamperPosition",
                ColumnData::Numeric(vec![Some(10.0), Some(f64::INFINITY), Some(10.0)]),
            )
            .unwrap();

        assert_eq!(
            table
                .deviation_above("CoolingDamperCommand", "CoolingDamperPosition", 5.0)
                .unwrap()
                .as_slice(),
            &[Tristate::Undefined, Tristate::Undefined, Tristate::True]
        );
        assert_eq!(
            table.above("CoolingDamperPosition", 5.0).unwrap().as_slice(),
            &[Tristate::True, Tristate::Undefined, Tristate::True]
        );
    }

    #[test]
    fn test_equals_on_categorical() {
        let table = sample_table();
        let series = table.equals("HeatCoolMode", "COOL").unwrap();
        assert_eq!(
            series.as_slice(),
            &[Tristate::False, Tristate::True, Tristate::True, Tristate::Undefined]
        );
    }

    #[test]
    fn test_project_includes_timestamp_axis() {
        let table = sample_table();
        let times = table.project("DateTime", &[1, 3]).unwrap();
        assert_eq!(times[0], Value::Timestamp(table.timestamps()[1]));

        let values = table.project("HeatingAirVolume", &[2, 3]).unwrap();
        assert_eq!(values, vec![Value::Missing, Value::Number(40.0)]);

        assert!(matches!(
            table.project("HeatingAirVolume", &[9]),
            Err(TableError::RowOutOfRange { row: 9, len: 4 })
        ));
    }
}
