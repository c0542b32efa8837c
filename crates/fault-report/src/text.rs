//! Plain-text issue log

use crate::ReportError;
use fault_engine::{FaultRecord, FaultSink, SinkError};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const ISSUE_PREFIX: &str = "Issue #";

/// Appends `Issue #n`, the fault message, and two blank lines per fault.
/// Numbering continues from issues already in the file.
#[derive(Debug)]
pub struct TextReport {
    path: PathBuf,
    file: File,
    log_index: usize,
}

impl TextReport {
    /// Open (or create) the log at `path` for appending
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ReportError> {
        let path = path.as_ref().to_path_buf();
        let existing = count_issues(&path)?;

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|source| ReportError::Io {
                path: path.clone(),
                source,
            })?;

        info!("Issue log {} ({} existing issues)", path.display(), existing);
        Ok(Self {
            path,
            file,
            log_index: existing + 1,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number the next issue will get
    pub fn log_index(&self) -> usize {
        self.log_index
    }

    fn write(&mut self, fault: &FaultRecord) -> Result<(), ReportError> {
        let entry = format!("{}{}\n{}\n\n\n", ISSUE_PREFIX, self.log_index, fault.message());
        self.file
            .write_all(entry.as_bytes())
            .and_then(|_| self.file.flush())
            .map_err(|source| ReportError::Io {
                path: self.path.clone(),
                source,
            })?;
        debug!("Logged issue #{} ({})", self.log_index, fault.rule());
        self.log_index += 1;
        Ok(())
    }
}

impl FaultSink for TextReport {
    fn record(&mut self, fault: FaultRecord) -> Result<(), SinkError> {
        Ok(self.write(&fault)?)
    }
}

fn count_issues(path: &Path) -> Result<usize, ReportError> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
        Err(source) => {
            return Err(ReportError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    let mut count = 0;
    for line in BufReader::new(file).lines() {
        let line = line.map_err(|source| ReportError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        if line.starts_with(ISSUE_PREFIX) {
            count += 1;
        }
    }
    Ok(count)
}
