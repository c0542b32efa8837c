//! Threshold Policies
//!
//! Two independent checks turn a condition series into a verdict:
//! a proportional check on the share of active samples, and a consecutive
//! check on unbroken runs of active samples. `Undefined` samples count toward
//! neither the numerator nor the denominator of the proportional check.

use crate::error::EngineError;
use crate::record::FaultRecord;
use crate::rule_set::Verdict;
use crate::run::RunDetector;
use serde::{Deserialize, Serialize};
use tracing::debug;
use trend_table::{ConditionSeries, SampleTable, TableError};

/// Per-rule threshold constants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    /// Value above which a raw measurement counts as active
    pub tolerance: f64,
    /// Fraction (0-1) of defined samples allowed to be active
    pub failure_percent: f64,
    /// Run length of active samples that constitutes a failure
    pub failure_consecutive: usize,
    /// Columns carried in the fault payload
    pub report_columns: Vec<String>,
    /// Human-readable description, first line of the fault message
    pub description: String,
}

impl Thresholds {
    /// Check ranges; run before any evaluation
    pub fn validate(&self) -> Result<(), EngineError> {
        if !self.failure_percent.is_finite() || !(0.0..=1.0).contains(&self.failure_percent) {
            return Err(EngineError::InvalidParameter {
                name: "failure_percent",
                reason: format!("{} is outside [0, 1]", self.failure_percent),
            });
        }
        if self.failure_consecutive == 0 {
            return Err(EngineError::InvalidParameter {
                name: "failure_consecutive",
                reason: "run length must be at least 1".into(),
            });
        }
        if !self.tolerance.is_finite() {
            return Err(EngineError::InvalidParameter {
                name: "tolerance",
                reason: format!("{} is not finite", self.tolerance),
            });
        }
        Ok(())
    }

    /// Largest count of active samples that still passes, for `defined` samples
    pub fn max_failures(&self, defined: usize) -> usize {
        (self.failure_percent * defined as f64).floor() as usize
    }
}

/// Threshold checks bound to one rule
pub struct ThresholdPolicy<'a> {
    rule: &'a str,
    thresholds: &'a Thresholds,
    detector: RunDetector,
}

impl<'a> ThresholdPolicy<'a> {
    /// Validate `thresholds` and bind them to `rule`
    pub fn new(rule: &'a str, thresholds: &'a Thresholds) -> Result<Self, EngineError> {
        thresholds.validate()?;
        Ok(Self {
            rule,
            thresholds,
            detector: RunDetector::new(thresholds.failure_consecutive)?,
        })
    }

    /// Fault when more than `floor(failure_percent * N)` samples are active.
    /// The payload carries at most that many rows (at least one).
    pub fn check_proportional(
        &self,
        series: &ConditionSeries,
        table: &SampleTable,
    ) -> Result<Option<FaultRecord>, EngineError> {
        check_aligned(series, table)?;

        let observed = series.count_true();
        let max_failures = self.thresholds.max_failures(series.count_defined());
        debug!(
            "{}: {} active samples, {} allowed",
            self.rule, observed, max_failures
        );
        if observed <= max_failures {
            return Ok(None);
        }

        let rows: Vec<usize> = series.true_indices().take(max_failures.max(1)).collect();
        let message = format!(
            "{}\nThe maximum allowed instances ({} at {:.0}% of samples) was exceeded ({} observed)",
            self.thresholds.description,
            max_failures,
            self.thresholds.failure_percent * 100.0,
            observed
        );
        FaultRecord::from_rows(self.rule, message, table, &self.thresholds.report_columns, rows)
            .map(Some)
    }

    /// Fault when any run of `failure_consecutive` active samples exists.
    /// The payload carries every run onset.
    pub fn check_consecutive(
        &self,
        series: &ConditionSeries,
        table: &SampleTable,
    ) -> Result<Option<FaultRecord>, EngineError> {
        check_aligned(series, table)?;

        let onsets = self.detector.scan(series.as_slice());
        debug!("{}: {} qualifying runs", self.rule, onsets.len());
        if onsets.is_empty() {
            return Ok(None);
        }

        let message = format!(
            "{}\nThe maximum allowed consecutive instances ({}) was exceeded ({} observed)",
            self.thresholds.description,
            self.thresholds.failure_consecutive,
            onsets.len()
        );
        FaultRecord::from_rows(self.rule, message, table, &self.thresholds.report_columns, onsets)
            .map(Some)
    }

    /// Proportional check, then consecutive; the first fault wins
    pub fn check(&self, series: &ConditionSeries, table: &SampleTable) -> Result<Verdict, EngineError> {
        if let Some(fault) = self.check_proportional(series, table)? {
            return Ok(Verdict::Fault(fault));
        }
        if let Some(fault) = self.check_consecutive(series, table)? {
            return Ok(Verdict::Fault(fault));
        }
        Ok(Verdict::Pass)
    }
}

fn check_aligned(series: &ConditionSeries, table: &SampleTable) -> Result<(), EngineError> {
    if series.len() != table.len() {
        return Err(TableError::LengthMismatch {
            context: "condition series".into(),
            expected: table.len(),
            actual: series.len(),
        }
        .into());
    }
    Ok(())
}
