//! Persisted gradebook record and snapshot sinks.
//!
//! The record is a single JSON object `{ "classes": {...}, "activeClass": "..." }`.
//! Loading never fails: anything absent or malformed falls back to the
//! default state. Writing goes through a [`SnapshotSink`] whose failures the
//! store logs and ignores.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::Deserialize;

use crate::model::Course;
use crate::store::GradebookState;

/// Receives every committed snapshot.
pub trait SnapshotSink: Send + Sync {
    /// Write `state` somewhere durable.
    fn persist(&self, state: &GradebookState) -> Result<()>;
}

#[derive(Debug, Deserialize)]
struct PersistedRecord {
    classes: IndexMap<String, Course>,
    #[serde(rename = "activeClass", default)]
    active_class: Option<serde_json::Value>,
}

/// Serialize a state as the persisted JSON record.
pub fn to_json(state: &GradebookState) -> Result<String> {
    serde_json::to_string_pretty(state).context("failed to serialize gradebook state")
}

/// Parse a persisted record, or `None` if it is unusable.
pub fn parse_state(raw: &str) -> Option<GradebookState> {
    let record: PersistedRecord = match serde_json::from_str(raw) {
        Ok(record) => record,
        Err(e) => {
            tracing::warn!("ignoring malformed gradebook state: {e}");
            return None;
        }
    };
    let active = record.active_class.as_ref().and_then(|v| v.as_str());
    GradebookState::from_parts(record.classes, active)
}

/// Load from an optional raw record, falling back to the default state.
pub fn load_state(raw: Option<&str>) -> GradebookState {
    match raw.and_then(parse_state) {
        Some(state) => state,
        None => {
            tracing::info!("starting from the default gradebook");
            GradebookState::default()
        }
    }
}

/// Load the record stored at `path`, falling back to the default state when
/// the file is missing or unreadable.
pub fn load_state_file(path: &Path) -> GradebookState {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => Some(raw),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
        Err(e) => {
            tracing::warn!("failed to read {}: {e}", path.display());
            None
        }
    };
    load_state(raw.as_deref())
}

/// Writes each snapshot as pretty JSON to a file.
///
/// The record is written to a sibling temp file and renamed over the target,
/// so a failed write leaves the previous record intact.
#[derive(Debug, Clone)]
pub struct JsonFileSink {
    path: PathBuf,
}

impl JsonFileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SnapshotSink for JsonFileSink {
    fn persist(&self, state: &GradebookState) -> Result<()> {
        let json = to_json(state)?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json)
            .with_context(|| format!("failed to write {}", tmp.display()))?;
        std::fs::rename(&tmp, &self.path)
            .with_context(|| format!("failed to replace {}", self.path.display()))?;
        tracing::debug!("saved gradebook to {}", self.path.display());
        Ok(())
    }
}

/// Keeps the latest serialized snapshot in memory.
///
/// Clones share the same buffer, so a test can hand one clone to the store
/// and inspect the other.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    inner: Arc<Mutex<MemoryRecord>>,
}

#[derive(Debug, Default)]
struct MemoryRecord {
    last: Option<String>,
    writes: usize,
}

impl MemorySink {
    /// The most recently written record.
    pub fn last(&self) -> Option<String> {
        self.inner.lock().ok().and_then(|r| r.last.clone())
    }

    /// How many snapshots have been written.
    pub fn writes(&self) -> usize {
        self.inner.lock().map(|r| r.writes).unwrap_or_default()
    }
}

impl SnapshotSink for MemorySink {
    fn persist(&self, state: &GradebookState) -> Result<()> {
        let json = to_json(state)?;
        let mut record = self
            .inner
            .lock()
            .map_err(|_| anyhow::anyhow!("memory sink lock poisoned"))?;
        record.last = Some(json);
        record.writes += 1;
        Ok(())
    }
}
