//! # Local State File
//!
//! The CLI keeps the registry in a JSON snapshot of versioned seal records.
//! Each invocation loads the snapshot into an in-memory store, runs one
//! operation, and writes the snapshot back when the operation mutated it.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};

use seal_registry::{
    InMemorySealStore, RegistryConfig, SealRegistry, SectorInfo, StaticDirectory, Versioned,
};
use seal_state::Seal;

/// A registry bound to a state file.
#[derive(Debug)]
pub struct Workspace {
    path: PathBuf,
    store: Arc<InMemorySealStore>,
    registry: SealRegistry,
}

impl Workspace {
    /// Load `path`, or start empty when it does not exist yet.
    pub fn open(path: &Path, sectors: Vec<SectorInfo>, config: RegistryConfig) -> Result<Self> {
        let records: Vec<Versioned<Seal>> = if path.exists() {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read state file {}", path.display()))?;
            serde_json::from_str(&raw)
                .with_context(|| format!("failed to parse state file {}", path.display()))?
        } else {
            tracing::debug!(path = %path.display(), "state file absent, starting empty");
            Vec::new()
        };
        tracing::debug!(path = %path.display(), seals = records.len(), "state loaded");

        let store = InMemorySealStore::from_snapshot(records, config.store_timeout)
            .with_context(|| format!("state file {} is inconsistent", path.display()))?;
        let store = Arc::new(store);
        let directory: StaticDirectory = sectors.into_iter().collect();
        let registry = SealRegistry::new(store.clone(), Arc::new(directory), config);
        Ok(Self {
            path: path.to_path_buf(),
            store,
            registry,
        })
    }

    pub fn registry(&self) -> &SealRegistry {
        &self.registry
    }

    /// Write the current snapshot back to the state file.
    ///
    /// Writes to a sibling temp file first and renames it over the target,
    /// so an interrupted save leaves the previous snapshot intact.
    pub fn save(&self) -> Result<()> {
        let records = self.store.snapshot()?;
        let json = serde_json::to_string_pretty(&records)?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json)
            .with_context(|| format!("failed to write {}", tmp.display()))?;
        std::fs::rename(&tmp, &self.path)
            .with_context(|| format!("failed to replace {}", self.path.display()))?;
        tracing::debug!(path = %self.path.display(), seals = records.len(), "state saved");
        Ok(())
    }
}
