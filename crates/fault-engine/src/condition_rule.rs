//! Condition Rules
//!
//! The common rule shape: derive a condition series from named columns, then
//! hand it to the combined threshold check.

use crate::error::EngineError;
use crate::policy::{ThresholdPolicy, Thresholds};
use crate::rule_set::{Rule, Verdict};
use trend_table::{ConditionSeries, SampleTable, TableError};

type Derive = dyn Fn(&SampleTable) -> Result<ConditionSeries, TableError> + Send + Sync;

/// Rule defined by a condition derivation and its thresholds
pub struct ConditionRule {
    name: String,
    thresholds: Thresholds,
    derive: Box<Derive>,
}

impl ConditionRule {
    pub fn new<F>(name: impl Into<String>, thresholds: Thresholds, derive: F) -> Self
    where
        F: Fn(&SampleTable) -> Result<ConditionSeries, TableError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            thresholds,
            derive: Box::new(derive),
        }
    }

    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    /// Condition series this rule derives from `table`
    pub fn condition(&self, table: &SampleTable) -> Result<ConditionSeries, EngineError> {
        Ok((self.derive)(table)?)
    }
}

impl Rule for ConditionRule {
    fn name(&self) -> &str {
        &self.name
    }

    fn evaluate(&self, table: &SampleTable) -> Result<Verdict, EngineError> {
        let policy = ThresholdPolicy::new(&self.name, &self.thresholds)?;
        let series = self.condition(table)?;
        policy.check(&series, table)
    }
}
