// Separation progress tracing
// Monotonic progress reporting with an optional append-only JSONL sink

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TraceError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// One progress step of a separation request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceEntry {
    /// RFC 3339 timestamp of when this entry was created
    pub timestamp: String,

    /// Stage name (e.g., "decode", "query", "separation")
    pub stage: String,

    /// Overall request progress [0.0, 1.0]
    pub progress: f32,

    pub message: String,

    /// Optional structured data (e.g., target term, confidence)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl TraceEntry {
    pub fn new(stage: impl Into<String>, progress: f32, message: impl Into<String>) -> Self {
        TraceEntry {
            timestamp: Utc::now().to_rfc3339(),
            stage: stage.into(),
            progress: progress.clamp(0.0, 1.0),
            message: message.into(),
            data: None,
        }
    }

    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Serialize to JSON line (with newline)
    pub fn to_json_line(&self) -> Result<String, serde_json::Error> {
        let json = serde_json::to_string(self)?;
        Ok(format!("{}\n", json))
    }
}

/// Appends trace entries to a JSONL file, creating it on first write
pub struct TraceWriter {
    file_path: PathBuf,
}

impl TraceWriter {
    pub fn new(file_path: PathBuf) -> Self {
        TraceWriter { file_path }
    }

    pub fn write(&self, entry: &TraceEntry) -> Result<(), TraceError> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.file_path)?;

        file.write_all(entry.to_json_line()?.as_bytes())?;
        file.flush()?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }
}

/// Collects progress for one request
/// Reported progress never decreases, even if a stage reports a lower value
pub struct ProgressTracker {
    writer: Option<TraceWriter>,
    entries: Vec<TraceEntry>,
    last_progress: f32,
}

impl ProgressTracker {
    pub fn new() -> Self {
        ProgressTracker {
            writer: None,
            entries: Vec::new(),
            last_progress: 0.0,
        }
    }

    /// Also mirror every entry to a JSONL trace file
    pub fn with_writer(writer: TraceWriter) -> Self {
        ProgressTracker {
            writer: Some(writer),
            ..Self::new()
        }
    }

    pub fn report(&mut self, stage: &str, progress: f32, message: impl Into<String>) {
        self.record(TraceEntry::new(stage, progress, message));
    }

    pub fn report_with_data(
        &mut self,
        stage: &str,
        progress: f32,
        message: impl Into<String>,
        data: serde_json::Value,
    ) {
        self.record(TraceEntry::new(stage, progress, message).with_data(data));
    }

    fn record(&mut self, mut entry: TraceEntry) {
        entry.progress = entry.progress.max(self.last_progress);
        self.last_progress = entry.progress;

        if let Some(ref writer) = self.writer {
            // Trace output is best effort and never fails the request
            if let Err(e) = writer.write(&entry) {
                log::warn!("Failed to write trace to {}: {}", writer.path().display(), e);
            }
        }

        log::debug!("[{:>3.0}%] {}: {}", entry.progress * 100.0, entry.stage, entry.message);
        self.entries.push(entry);
    }

    pub fn progress(&self) -> f32 {
        self.last_progress
    }

    pub fn entries(&self) -> &[TraceEntry] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<TraceEntry> {
        self.entries
    }
}

impl Default for ProgressTracker {
    fn default() -> Self {
        Self::new()
    }
}

/// Read trace entries from a JSONL file
pub fn read_trace_file(path: &Path) -> Result<Vec<TraceEntry>, TraceError> {
    let contents = std::fs::read_to_string(path)?;
    let mut entries = Vec::new();

    for line in contents.lines() {
        if line.trim().is_empty() {
            continue;
        }
        entries.push(serde_json::from_str(line)?);
    }

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_progress_clamping() {
        assert_eq!(TraceEntry::new("test", -0.5, "test").progress, 0.0);
        assert_eq!(TraceEntry::new("test", 1.5, "test").progress, 1.0);
    }

    #[test]
    fn test_tracker_is_monotonic() {
        let mut tracker = ProgressTracker::new();
        tracker.report("decode", 0.3, "decoded");
        tracker.report("query", 0.1, "parsed");
        tracker.report("separation", 0.8, "one target done");

        let progress: Vec<f32> = tracker.entries().iter().map(|e| e.progress).collect();
        assert_eq!(progress, vec![0.3, 0.3, 0.8]);
        assert_eq!(tracker.progress(), 0.8);
    }

    #[test]
    fn test_tracker_writes_jsonl() {
        let temp_dir = TempDir::new().unwrap();
        let trace_path = temp_dir.path().join("trace.jsonl");

        let mut tracker = ProgressTracker::with_writer(TraceWriter::new(trace_path.clone()));
        tracker.report("decode", 0.05, "Decoded audio");
        tracker.report_with_data(
            "separation",
            1.0,
            "Extracted speech",
            serde_json::json!({ "term": "speech" }),
        );

        let entries = read_trace_file(&trace_path).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].stage, "decode");
        assert_eq!(entries[1].data.as_ref().unwrap()["term"], "speech");
    }

    #[test]
    fn test_unwritable_trace_does_not_panic() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("missing").join("trace.jsonl");

        let mut tracker = ProgressTracker::with_writer(TraceWriter::new(missing));
        tracker.report("decode", 0.5, "still recorded in memory");
        assert_eq!(tracker.entries().len(), 1);
    }

    #[test]
    fn test_json_line_format() {
        let entry = TraceEntry::new("test", 0.5, "Testing");
        let json_line = entry.to_json_line().unwrap();
        assert!(json_line.ends_with('\n'));

        let parsed: TraceEntry = serde_json::from_str(json_line.trim()).unwrap();
        assert_eq!(parsed.stage, "test");
        assert!(parsed.data.is_none());
    }
}
