//! Manifest of resources ensured by a run

use crate::resource::{Handle, ResourceKind, ResourceState};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// One provisioned resource
#[derive(Debug, Clone, Serialize)]
pub struct ManifestEntry {
    pub kind: ResourceKind,
    pub key: String,
    pub id: String,
    pub state: ResourceState,
    pub attributes: BTreeMap<String, String>,
}

impl ManifestEntry {
    pub fn new(handle: &Handle, state: ResourceState) -> Self {
        Self {
            kind: handle.kind,
            key: handle.key.clone(),
            id: handle.id.clone(),
            state,
            attributes: handle.attributes.clone(),
        }
    }
}

/// Human-readable record of a completed run
#[derive(Debug, Clone, Serialize)]
pub struct Manifest {
    pub provider: String,
    pub started_at: DateTime<Utc>,
    pub entries: Vec<ManifestEntry>,

    /// Total execution time in milliseconds
    pub duration_ms: u64,
}

impl Manifest {
    pub fn new(provider: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            started_at: Utc::now(),
            entries: Vec::new(),
            duration_ms: 0,
        }
    }

    pub fn push(&mut self, handle: &Handle, state: ResourceState) {
        self.entries.push(ManifestEntry::new(handle, state));
    }

    pub fn created(&self) -> usize {
        self.count(ResourceState::Created)
    }

    pub fn existing(&self) -> usize {
        self.count(ResourceState::Exists)
    }

    fn count(&self, state: ResourceState) -> usize {
        self.entries.iter().filter(|e| e.state == state).count()
    }
}

impl std::fmt::Display for Manifest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind_width = self
            .entries
            .iter()
            .map(|e| e.kind.as_str().len())
            .max()
            .unwrap_or(0);
        let key_width = self.entries.iter().map(|e| e.key.len()).max().unwrap_or(0);

        for entry in &self.entries {
            writeln!(
                f,
                "{:<kw$}  {:<yw$}  {}  ({})",
                entry.kind.as_str(),
                entry.key,
                entry.id,
                entry.state,
                kw = kind_width,
                yw = key_width,
            )?;
        }
        write!(
            f,
            "{} created, {} already present",
            self.created(),
            self.existing()
        )
    }
}
