//! Consecutive Run Detection
//!
//! Finds the onset of every run of at least `k` consecutive `True` samples.
//! `False` and `Undefined` both end a run.

use crate::error::EngineError;
use trend_table::{ConditionSeries, Tristate};

/// Rising-edge detector for runs of a minimum length
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunDetector {
    min_run: usize,
}

impl RunDetector {
    /// Create a detector for runs of at least `min_run` samples
    pub fn new(min_run: usize) -> Result<Self, EngineError> {
        if min_run == 0 {
            return Err(EngineError::InvalidParameter {
                name: "failure_consecutive",
                reason: "run length must be at least 1".into(),
            });
        }
        Ok(Self { min_run })
    }

    pub fn min_run(&self) -> usize {
        self.min_run
    }

    /// Onset index of each qualifying run, ascending, one per run
    pub fn scan(&self, samples: &[Tristate]) -> Vec<usize> {
        let mut onsets = Vec::new();
        let mut count = 0usize;
        let mut reported = false;

        for (i, sample) in samples.iter().enumerate() {
            if sample.is_true() {
                count += 1;
                if count == self.min_run && !reported {
                    onsets.push(i + 1 - self.min_run);
                    reported = true;
                }
            } else {
                count = 0;
                reported = false;
            }
        }

        onsets
    }
}

/// Onsets of runs of at least `k` true samples in `series`
pub fn onsets(series: &ConditionSeries, k: usize) -> Result<Vec<usize>, EngineError> {
    Ok(RunDetector::new(k)?.scan(series.as_slice()))
}
