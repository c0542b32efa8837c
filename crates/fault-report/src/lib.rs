//! Fault Reporting
//!
//! Sinks that receive fault records from a rule pass:
//! - `TextReport` appends numbered issues to a plain-text log
//! - `JsonLinesReport` writes one JSON object per fault
//! - `TracingSink` emits each fault as a warning event

mod json;
mod text;

pub use json::JsonLinesReport;
pub use text::TextReport;

use fault_engine::{FaultRecord, FaultSink, SinkError};
use std::path::PathBuf;
use thiserror::Error;
use tracing::warn;

/// Reporting errors
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Sink that logs each fault through `tracing`
#[derive(Debug, Default)]
pub struct TracingSink {
    count: usize,
}

impl TracingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Faults logged so far
    pub fn count(&self) -> usize {
        self.count
    }
}

impl FaultSink for TracingSink {
    fn record(&mut self, fault: FaultRecord) -> Result<(), SinkError> {
        self.count += 1;
        warn!(
            rule = fault.rule(),
            rows = fault.rows().len(),
            "{}",
            fault.message()
        );
        Ok(())
    }
}

/// Fans each fault out to several sinks
#[derive(Default)]
pub struct Tee<'a> {
    sinks: Vec<&'a mut dyn FaultSink>,
}

impl<'a> Tee<'a> {
    pub fn new() -> Self {
        Self { sinks: Vec::new() }
    }

    pub fn with(mut self, sink: &'a mut dyn FaultSink) -> Self {
        self.sinks.push(sink);
        self
    }
}

impl FaultSink for Tee<'_> {
    fn record(&mut self, fault: FaultRecord) -> Result<(), SinkError> {
        for sink in &mut self.sinks {
            sink.record(fault.clone())?;
        }
        Ok(())
    }
}
