//! JSON-lines fault output

use crate::ReportError;
use fault_engine::{FaultRecord, FaultSink, SinkError};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

/// Writes each fault as one serialized JSON object per line
pub struct JsonLinesReport<W: Write> {
    writer: W,
    written: usize,
}

impl JsonLinesReport<BufWriter<File>> {
    /// Append to the file at `path`, creating it if needed
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ReportError> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|source| ReportError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> JsonLinesReport<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, written: 0 }
    }

    pub fn written(&self) -> usize {
        self.written
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write(&mut self, fault: &FaultRecord) -> Result<(), ReportError> {
        serde_json::to_writer(&mut self.writer, fault)?;
        self.writer
            .write_all(b"\n")
            .and_then(|_| self.writer.flush())
            .map_err(|source| ReportError::Io {
                path: "<json lines>".into(),
                source,
            })?;
        self.written += 1;
        Ok(())
    }
}

impl<W: Write> FaultSink for JsonLinesReport<W> {
    fn record(&mut self, fault: FaultRecord) -> Result<(), SinkError> {
        Ok(self.write(&fault)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::fault;

    #[test]
    fn test_one_object_per_line() {
        let mut report = JsonLinesReport::new(Vec::new());
        report.record(fault("a", "first")).unwrap();
        report.record(fault("b", "second")).unwrap();
        assert_eq!(report.written(), 2);

        let out = String::from_utf8(report.into_inner()).unwrap();
        let lines: Vec<serde_json::Value> = out
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["rule"], "a");
        assert_eq!(lines[1]["message"], "second");
        assert_eq!(lines[0]["primary_axis_label"], "DateTime");
        assert_eq!(lines[0]["rows"][0], 3);
        assert_eq!(lines[0]["data"]["RoomTemperature"][0], 74.5);
    }

    #[test]
    fn test_open_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("faults.jsonl");
        JsonLinesReport::open(&path).unwrap().record(fault("a", "x")).unwrap();
        JsonLinesReport::open(&path).unwrap().record(fault("b", "y")).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap().lines().count(), 2);
    }
}
