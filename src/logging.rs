// src/logging.rs
//
// Telemetry sinks for the adaptive difficulty loop.
// - EventSink: trait used by sessions and the research harness
// - NoopSink:  discards all events
// - FileSink:  writes one JSON object per line (JSONL)

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::performance::SessionReport;
use crate::store::{LoadStatus, StoreError};
use crate::types::{Action, Difficulty, Tier};

/// One processed attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttemptLog {
    /// Index of the attempt within its session (0-based).
    pub attempt_index: usize,
    pub category: String,
    pub difficulty: Difficulty,
    pub correct: bool,
    pub elapsed_secs: f64,
    pub hint_used: bool,
    pub tier: Tier,
    pub reward: i32,
    pub action: Action,
    pub explored: bool,
    pub next_difficulty: Difficulty,
    pub q_before: f64,
    pub q_after: f64,
    /// Set when persisting the table after this update failed.
    pub persist_error: Option<String>,
}

/// Lifecycle events of the durable store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum StoreEvent {
    Loaded { path: String, entries: usize },
    Missing { path: String },
    Discarded { path: String, error: String },
    SaveFailed { path: String, error: String },
}

impl StoreEvent {
    pub fn from_load_status(path: &Path, status: &LoadStatus) -> Self {
        let path = path.display().to_string();
        match status {
            LoadStatus::Loaded { entries } => StoreEvent::Loaded {
                path,
                entries: *entries,
            },
            LoadStatus::Missing => StoreEvent::Missing { path },
            LoadStatus::Discarded(err) => StoreEvent::Discarded {
                path,
                error: err.to_string(),
            },
        }
    }

    pub fn save_failed(path: &Path, err: &StoreError) -> Self {
        StoreEvent::SaveFailed {
            path: path.display().to_string(),
            error: err.to_string(),
        }
    }
}

/// Abstract sink for controller telemetry.
pub trait EventSink {
    fn log_attempt(&mut self, record: &AttemptLog);

    fn log_store_event(&mut self, event: &StoreEvent);

    fn log_session(&mut self, _report: &SessionReport) {}
}

/// Sink that discards all events.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSink;

impl EventSink for NoopSink {
    fn log_attempt(&mut self, _record: &AttemptLog) {
        // intentionally no-op
    }

    fn log_store_event(&mut self, _event: &StoreEvent) {
        // intentionally no-op
    }
}

/// JSONL file sink.
///
/// Every record is one JSON object on its own line, wrapped as
/// `{"kind": "...", "data": {...}}`.
pub struct FileSink {
    writer: BufWriter<File>,
}

#[derive(Serialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
enum Line<'a> {
    Attempt(&'a AttemptLog),
    Store(&'a StoreEvent),
    Session(&'a SessionReport),
}

impl FileSink {
    /// Create a new sink writing to `path` (truncates).
    pub fn create(path: impl AsRef<Path>) -> io::Result<Self> {
        let file = File::create(path)?;
        Ok(Self {
            writer: BufWriter::new(file),
        })
    }

    fn write_line(&mut self, line: &Line<'_>) {
        // Telemetry must never interrupt the learning loop, so serialization
        // and I/O errors are dropped.
        if let Ok(mut bytes) = serde_json::to_vec(line) {
            bytes.push(b'\n');
            let _ = self.writer.write_all(&bytes);
            let _ = self.writer.flush();
        }
    }
}

impl EventSink for FileSink {
    fn log_attempt(&mut self, record: &AttemptLog) {
        self.write_line(&Line::Attempt(record));
    }

    fn log_store_event(&mut self, event: &StoreEvent) {
        self.write_line(&Line::Store(event));
    }

    fn log_session(&mut self, report: &SessionReport) {
        self.write_line(&Line::Session(report));
    }
}
