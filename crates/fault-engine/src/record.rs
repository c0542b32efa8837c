//! Fault Record
//!
//! The payload handed from a failed check to reporting: a message plus the
//! offending rows of the columns needed to diagnose the fault, keyed by
//! column name. The primary axis is the timestamp column.

use crate::error::EngineError;
use serde::Serialize;
use std::collections::BTreeMap;
use trend_table::{SampleTable, Value};

/// Detected threshold violation with its diagnostic context
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FaultRecord {
    rule: String,
    message: String,
    primary_axis_label: String,
    dependent_axis_labels: Vec<String>,
    rows: Vec<usize>,
    data: BTreeMap<String, Vec<Value>>,
}

impl FaultRecord {
    /// Build a record, failing if any axis label is absent or empty in `data`
    /// or if a column does not have one value per row
    pub fn new(
        rule: impl Into<String>,
        message: impl Into<String>,
        primary_axis_label: impl Into<String>,
        dependent_axis_labels: Vec<String>,
        rows: Vec<usize>,
        data: BTreeMap<String, Vec<Value>>,
    ) -> Result<Self, EngineError> {
        let primary_axis_label = primary_axis_label.into();

        if primary_axis_label.is_empty() {
            return Err(EngineError::InvalidRecord("primary_axis_label is empty".into()));
        }
        if dependent_axis_labels.is_empty() {
            return Err(EngineError::InvalidRecord("dependent_axis_labels is empty".into()));
        }
        for label in std::iter::once(&primary_axis_label).chain(dependent_axis_labels.iter()) {
            match data.get(label) {
                Some(values) if !values.is_empty() => {}
                _ => {
                    return Err(EngineError::InvalidRecord(format!(
                        "axis label '{}' is not found or empty",
                        label
                    )))
                }
            }
        }
        if let Some((name, values)) = data.iter().find(|(_, v)| v.len() != rows.len()) {
            return Err(EngineError::InvalidRecord(format!(
                "column '{}' has {} values for {} rows",
                name,
                values.len(),
                rows.len()
            )));
        }

        Ok(Self {
            rule: rule.into(),
            message: message.into(),
            primary_axis_label,
            dependent_axis_labels,
            rows,
            data,
        })
    }

    /// Build a record from table rows, restricted to `report_columns`.
    /// The timestamp column is always included as the primary axis.
    pub fn from_rows(
        rule: impl Into<String>,
        message: impl Into<String>,
        table: &SampleTable,
        report_columns: &[String],
        rows: Vec<usize>,
    ) -> Result<Self, EngineError> {
        let primary = table.timestamp_column().to_string();
        let dependent: Vec<String> = report_columns
            .iter()
            .filter(|c| **c != primary)
            .cloned()
            .collect();

        let mut data = BTreeMap::new();
        data.insert(primary.clone(), table.project(&primary, &rows)?);
        for column in &dependent {
            data.insert(column.clone(), table.project(column, &rows)?);
        }

        Self::new(rule, message, primary, dependent, rows, data)
    }

    /// Name of the rule that raised the fault
    pub fn rule(&self) -> &str {
        &self.rule
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn primary_axis_label(&self) -> &str {
        &self.primary_axis_label
    }

    pub fn dependent_axis_labels(&self) -> &[String] {
        &self.dependent_axis_labels
    }

    /// Offending row indices in the source table
    pub fn rows(&self) -> &[usize] {
        &self.rows
    }

    /// Values of one referenced column at the offending rows
    pub fn values(&self, label: &str) -> Option<&[Value]> {
        self.data.get(label).map(Vec::as_slice)
    }

    pub fn data(&self) -> &BTreeMap<String, Vec<Value>> {
        &self.data
    }
}
