use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Persisted per-node selection flags.
///
/// Keys are (operation, option); `None` for the option addresses the
/// operation-level checkbox. Missing keys read as unchecked. `set` is
/// called once per toggle and must apply immediately, no batching.
pub trait SelectionStore {
    fn get(&self, operation: &str, option: Option<&str>) -> Option<bool>;
    fn set(&mut self, operation: &str, option: Option<&str>, value: bool);
}

fn key(operation: &str, option: Option<&str>) -> String {
    match option {
        Some(opt) => format!("{}/{}", operation, opt),
        None => operation.to_string(),
    }
}

/// In-memory store for tests and one-shot invocations
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, bool>,
    writes: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `set` calls since creation
    pub fn write_count(&self) -> usize {
        self.writes
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl SelectionStore for MemoryStore {
    fn get(&self, operation: &str, option: Option<&str>) -> Option<bool> {
        self.entries.get(&key(operation, option)).copied()
    }

    fn set(&mut self, operation: &str, option: Option<&str>, value: bool) {
        self.writes += 1;
        self.entries.insert(key(operation, option), value);
    }
}

/// TOML-backed store, written through on every `set`
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: BTreeMap<String, bool>,
}

impl FileStore {
    /// Load the store from `path`; a missing file is an empty store
    pub fn load(path: &Path) -> Result<Self> {
        let entries = if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read selections: {}", path.display()))?;
            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse selections: {}", path.display()))?
        } else {
            BTreeMap::new()
        };
        Ok(Self {
            path: path.to_path_buf(),
            entries,
        })
    }

    fn save(&self) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create dir: {}", dir.display()))?;
        }
        let contents =
            toml::to_string_pretty(&self.entries).context("Failed to serialize selections")?;
        std::fs::write(&self.path, contents)
            .with_context(|| format!("Failed to write selections: {}", self.path.display()))?;
        Ok(())
    }
}

impl SelectionStore for FileStore {
    fn get(&self, operation: &str, option: Option<&str>) -> Option<bool> {
        self.entries.get(&key(operation, option)).copied()
    }

    fn set(&mut self, operation: &str, option: Option<&str>, value: bool) {
        self.entries.insert(key(operation, option), value);
        // The trait contract has no error channel; a failed write keeps
        // the in-memory value and is reported in the log.
        if let Err(e) = self.save() {
            warn!(error = %e, "failed to persist selection change");
        }
    }
}
