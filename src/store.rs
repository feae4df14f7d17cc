// src/store.rs
//
// Durable Q-table store.
//
// The whole table is written as one versioned JSON document:
//
//   {
//     "format": "adaptive-difficulty/q-table",
//     "version": 1,
//     "entries": [
//       { "category": "math", "difficulty": 3, "tier": "Excellent",
//         "values": [1.0, 2.0, 3.0] },
//       ...
//     ]
//   }
//
// Saves go through a temp file in the same directory followed by a
// rename, so readers never observe a half-written store.
//
// Single writer only: the store is loaded once and overwritten in full on
// every save. Two processes sharing one path race last-writer-wins, and a
// process holding a stale load silently clobbers newer updates. Callers
// running several controllers against one path must serialise access
// themselves (file lock or a single owning service).

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::rl::q_table::{ActionValues, QTable};
use crate::types::{Difficulty, StateKey, Tier};

/// Format tag written into every store document.
pub const STORE_FORMAT: &str = "adaptive-difficulty/q-table";

/// Current store schema version.
/// Increment when changing the state key or entry shape.
pub const STORE_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoreDocument {
    format: String,
    version: u32,
    entries: Vec<StoreEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoreEntry {
    category: String,
    difficulty: Difficulty,
    tier: Tier,
    values: Vec<f64>,
}

/// Errors raised while reading or writing the store.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreError {
    Io { path: String, source: String },
    Serialize { source: String },
    Parse { source: String },
    UnsupportedFormat { found: String },
    VersionMismatch { found: u32, expected: u32 },
    InvalidEntry { index: usize, message: String },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Io { path, source } => {
                write!(f, "Q-table store I/O error at '{}': {}", path, source)
            }
            StoreError::Serialize { source } => {
                write!(f, "Failed to serialize Q-table: {}", source)
            }
            StoreError::Parse { source } => {
                write!(f, "Failed to parse Q-table store: {}", source)
            }
            StoreError::UnsupportedFormat { found } => {
                write!(f, "Unsupported Q-table store format '{}'", found)
            }
            StoreError::VersionMismatch { found, expected } => write!(
                f,
                "Q-table store version {} does not match supported version {}",
                found, expected
            ),
            StoreError::InvalidEntry { index, message } => {
                write!(f, "Invalid Q-table store entry #{}: {}", index, message)
            }
        }
    }
}

impl std::error::Error for StoreError {}

/// Result of loading the store at controller construction.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadStatus {
    /// Store read successfully with this many rows.
    Loaded { entries: usize },
    /// No store at the path yet; starting empty.
    Missing,
    /// Store present but unusable; starting empty.
    Discarded(StoreError),
}

/// File-backed Q-table store at a fixed path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QTableStore {
    path: PathBuf,
}

impl QTableStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the store. `Ok(None)` when no file exists yet.
    pub fn load(&self) -> Result<Option<QTable>, StoreError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(self.io_error(err)),
        };
        decode_table(&content).map(Some)
    }

    /// Load, folding every failure into an empty table.
    pub fn load_or_empty(&self) -> (QTable, LoadStatus) {
        match self.load() {
            Ok(Some(table)) => {
                let entries = table.len();
                (table, LoadStatus::Loaded { entries })
            }
            Ok(None) => (QTable::new(), LoadStatus::Missing),
            Err(err) => (QTable::new(), LoadStatus::Discarded(err)),
        }
    }

    /// Overwrite the store with the full table.
    pub fn save(&self, table: &QTable) -> Result<(), StoreError> {
        let content = encode_table(table)?;
        self.atomic_write(content.as_bytes())
            .map_err(|err| self.io_error(err))
    }

    fn atomic_write(&self, data: &[u8]) -> io::Result<()> {
        let parent = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        fs::create_dir_all(parent)?;

        let file_name = self
            .path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("q_table.json");
        let tmp_path = parent.join(format!(".{}.tmp.{}", file_name, std::process::id()));

        let result = fs::write(&tmp_path, data).and_then(|()| fs::rename(&tmp_path, &self.path));
        if result.is_err() {
            let _ = fs::remove_file(&tmp_path);
        }
        result
    }

    fn io_error(&self, err: io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.display().to_string(),
            source: err.to_string(),
        }
    }
}

/// Serialize a table to the versioned store document.
pub fn encode_table(table: &QTable) -> Result<String, StoreError> {
    let doc = StoreDocument {
        format: STORE_FORMAT.to_string(),
        version: STORE_VERSION,
        entries: table
            .iter()
            .map(|(key, values)| StoreEntry {
                category: key.category.clone(),
                difficulty: key.difficulty,
                tier: key.tier,
                values: values.to_vec(),
            })
            .collect(),
    };
    serde_json::to_string_pretty(&doc).map_err(|err| StoreError::Serialize {
        source: err.to_string(),
    })
}

/// Parse and validate a store document.
pub fn decode_table(content: &str) -> Result<QTable, StoreError> {
    let doc: StoreDocument = serde_json::from_str(content).map_err(|err| StoreError::Parse {
        source: err.to_string(),
    })?;

    if doc.format != STORE_FORMAT {
        return Err(StoreError::UnsupportedFormat { found: doc.format });
    }
    if doc.version != STORE_VERSION {
        return Err(StoreError::VersionMismatch {
            found: doc.version,
            expected: STORE_VERSION,
        });
    }

    let mut table = QTable::new();
    for (index, entry) in doc.entries.into_iter().enumerate() {
        let values: ActionValues =
            entry
                .values
                .as_slice()
                .try_into()
                .map_err(|_| StoreError::InvalidEntry {
                    index,
                    message: format!("expected 3 action values, found {}", entry.values.len()),
                })?;
        if values.iter().any(|v| !v.is_finite()) {
            return Err(StoreError::InvalidEntry {
                index,
                message: "non-finite action value".to_string(),
            });
        }

        let key = StateKey::new(entry.category, entry.difficulty, entry.tier);
        if table.contains(&key) {
            return Err(StoreError::InvalidEntry {
                index,
                message: format!(
                    "duplicate state ({}, {}, {:?})",
                    key.category, key.difficulty, key.tier
                ),
            });
        }
        table.insert(key, values);
    }

    Ok(table)
}
