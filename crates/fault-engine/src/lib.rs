//! Fault Detection Engine
//!
//! Turns condition series into pass/fail verdicts and runs rule sets:
//! - Run detection (onset of each run of consecutive active samples)
//! - Proportional and consecutive threshold policies
//! - Fault records carrying diagnostic context to reporting
//! - Rule registry with per-rule fault isolation

mod condition_rule;
mod error;
mod policy;
mod record;
mod rule_set;
mod run;

pub use condition_rule::ConditionRule;
pub use error::{EngineError, SinkError};
pub use policy::{ThresholdPolicy, Thresholds};
pub use record::FaultRecord;
pub use rule_set::{FaultSink, FnRule, PassSummary, Rule, RuleSet, Verdict};
pub use run::{onsets, RunDetector};
