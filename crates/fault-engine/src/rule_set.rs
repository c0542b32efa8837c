//! Rule Registry and Evaluation Pass

use crate::error::{EngineError, SinkError};
use crate::record::FaultRecord;
use rayon::prelude::*;
use std::sync::Arc;
use tracing::{debug, info, warn};
use trend_table::SampleTable;

/// Outcome of one rule evaluation
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    /// No threshold exceeded
    Pass,
    /// A threshold was exceeded
    Fault(FaultRecord),
}

impl Verdict {
    pub fn is_fault(&self) -> bool {
        matches!(self, Verdict::Fault(_))
    }
}

/// A fault detection rule over a sample table.
///
/// Rules hold no iteration state and never mutate the table.
pub trait Rule: Send + Sync {
    /// Unique name, used in reports and error context
    fn name(&self) -> &str;

    /// Evaluate the rule. `Err` means the table or rule is malformed.
    fn evaluate(&self, table: &SampleTable) -> Result<Verdict, EngineError>;
}

/// Rule backed by a function or closure
pub struct FnRule<F> {
    name: String,
    f: F,
}

impl<F> FnRule<F>
where
    F: Fn(&SampleTable) -> Result<Verdict, EngineError> + Send + Sync,
{
    pub fn new(name: impl Into<String>, f: F) -> Self {
        Self { name: name.into(), f }
    }
}

impl<F> Rule for FnRule<F>
where
    F: Fn(&SampleTable) -> Result<Verdict, EngineError> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn evaluate(&self, table: &SampleTable) -> Result<Verdict, EngineError> {
        (self.f)(table)
    }
}

/// Receiver of detected faults, called once per fault in rule order
pub trait FaultSink {
    fn record(&mut self, fault: FaultRecord) -> Result<(), SinkError>;
}

impl FaultSink for Vec<FaultRecord> {
    fn record(&mut self, fault: FaultRecord) -> Result<(), SinkError> {
        self.push(fault);
        Ok(())
    }
}

impl<S: FaultSink + ?Sized> FaultSink for &mut S {
    fn record(&mut self, fault: FaultRecord) -> Result<(), SinkError> {
        (**self).record(fault)
    }
}

/// Result of a completed pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassSummary {
    /// Number of rules evaluated
    pub rules_evaluated: usize,
    /// Names of rules that reported a fault, in rule order
    pub faulted: Vec<String>,
}

impl PassSummary {
    pub fn fault_count(&self) -> usize {
        self.faulted.len()
    }
}

/// Ordered collection of rules evaluated against one sample table
pub struct RuleSet {
    table: Arc<SampleTable>,
    rules: Vec<Box<dyn Rule>>,
}

impl RuleSet {
    /// Create an empty rule set over `table`
    pub fn new(table: Arc<SampleTable>) -> Self {
        Self {
            table,
            rules: Vec::new(),
        }
    }

    /// Register a rule; rules run in registration order
    pub fn register(&mut self, rule: impl Rule + 'static) -> &mut Self {
        if self.rules.iter().any(|r| r.name() == rule.name()) {
            warn!("Rule {} registered more than once", rule.name());
        }
        debug!("Registered rule {}", rule.name());
        self.rules.push(Box::new(rule));
        self
    }

    /// Register a function as a rule
    pub fn register_fn<F>(&mut self, name: impl Into<String>, f: F) -> &mut Self
    where
        F: Fn(&SampleTable) -> Result<Verdict, EngineError> + Send + Sync + 'static,
    {
        self.register(FnRule::new(name, f))
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Registered rule names in evaluation order
    pub fn rule_names(&self) -> Vec<&str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    pub fn table(&self) -> &Arc<SampleTable> {
        &self.table
    }

    /// Point the set at another table for the next pass
    pub fn set_table(&mut self, table: Arc<SampleTable>) {
        self.table = table;
    }

    /// Evaluate every rule in order, forwarding each fault to `sink` as it
    /// is found. A fault never stops the pass; an error aborts it.
    pub fn run(&self, sink: &mut dyn FaultSink) -> Result<PassSummary, EngineError> {
        info!(
            "Evaluating {} rules over {} samples",
            self.rules.len(),
            self.table.len()
        );
        let mut summary = PassSummary::default();

        for rule in &self.rules {
            let verdict = evaluate_one(rule.as_ref(), &self.table);
            forward(rule.as_ref(), verdict, sink, &mut summary)?;
        }

        info!(
            "Pass complete: {} rules, {} faults",
            summary.rules_evaluated,
            summary.fault_count()
        );
        Ok(summary)
    }

    /// Evaluate rules concurrently, then forward faults to `sink` serially in
    /// registration order. On error, faults from earlier rules are already
    /// forwarded and later ones are dropped.
    pub fn run_parallel(&self, sink: &mut dyn FaultSink) -> Result<PassSummary, EngineError> {
        info!(
            "Evaluating {} rules over {} samples in parallel",
            self.rules.len(),
            self.table.len()
        );
        let table = self.table.as_ref();
        let verdicts: Vec<_> = self
            .rules
            .par_iter()
            .map(|rule| evaluate_one(rule.as_ref(), table))
            .collect();

        let mut summary = PassSummary::default();
        for (rule, verdict) in self.rules.iter().zip(verdicts) {
            forward(rule.as_ref(), verdict, sink, &mut summary)?;
        }

        info!(
            "Pass complete: {} rules, {} faults",
            summary.rules_evaluated,
            summary.fault_count()
        );
        Ok(summary)
    }
}

fn evaluate_one(rule: &dyn Rule, table: &SampleTable) -> Result<Verdict, EngineError> {
    debug!("Evaluating rule {}", rule.name());
    rule.evaluate(table).map_err(|e| EngineError::Rule {
        rule: rule.name().to_string(),
        source: Box::new(e),
    })
}

fn forward(
    rule: &dyn Rule,
    verdict: Result<Verdict, EngineError>,
    sink: &mut dyn FaultSink,
    summary: &mut PassSummary,
) -> Result<(), EngineError> {
    summary.rules_evaluated += 1;
    metrics::counter!("fault_engine_rules_evaluated_total").increment(1);
    match verdict? {
        Verdict::Pass => debug!("Rule {} passed", rule.name()),
        Verdict::Fault(fault) => {
            info!("Rule {} detected a fault", rule.name());
            metrics::counter!("fault_engine_faults_total", "rule" => rule.name().to_string())
                .increment(1);
            summary.faulted.push(rule.name().to_string());
            sink.record(fault).map_err(EngineError::Sink)?;
        }
    }
    Ok(())
}
