use crate::buffers::BufferSnapshot;
use serde::{Deserialize, Serialize};

pub mod store;

pub const SCHEMA_VERSION: u32 = 2;

fn legacy_schema_version() -> u32 {
    // v1 files predate the version field entirely
    1
}

/// The durable single-slot representation of the three buffers at a point in
/// time. The share token carries only the three texts; the timestamp stays
/// local.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedProject {
    #[serde(default = "legacy_schema_version")]
    pub schema_version: u32,
    pub markup: String,
    pub style: String,
    pub behavior: String,
    pub timestamp: u64,
}

impl PersistedProject {
    pub fn from_snapshot(snapshot: &BufferSnapshot, timestamp: u64) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            markup: snapshot.markup.clone(),
            style: snapshot.style.clone(),
            behavior: snapshot.behavior.clone(),
            timestamp,
        }
    }

    pub fn snapshot(&self) -> BufferSnapshot {
        BufferSnapshot {
            markup: self.markup.clone(),
            style: self.style.clone(),
            behavior: self.behavior.clone(),
        }
    }
}

/// One saved solution for a problem, keyed by problem id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedSolution {
    pub problem_id: String,
    pub code: String,
    pub timestamp: u64,
}
