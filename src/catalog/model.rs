use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::common::errors::ScourError;

/// One toggleable sub-item of an operation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionEntry {
    /// Stable identifier, unique within the owning operation
    pub id: String,

    /// Display name
    pub name: String,

    /// Short description shown in warnings and listings
    #[serde(default)]
    pub description: Option<String>,

    /// Warning text; when present, enabling this option asks for
    /// confirmation first
    #[serde(default)]
    pub warning: Option<String>,

    /// Filesystem paths this option covers (tilde-expanded). Also used
    /// as existence probes for auto-hide.
    #[serde(default)]
    pub paths: Vec<String>,
}

impl OptionEntry {
    /// Description, falling back to the display name
    pub fn describe(&self) -> &str {
        self.description.as_deref().unwrap_or(&self.name)
    }
}

/// A top-level cleanup operation with its options
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationEntry {
    /// Stable identifier, unique within the catalog
    pub id: String,

    /// Display name
    pub name: String,

    /// Options, in catalog order
    #[serde(default, rename = "option")]
    pub options: Vec<OptionEntry>,
}

impl OperationEntry {
    /// Look up an option by id
    pub fn option(&self, option_id: &str) -> Option<&OptionEntry> {
        self.options.iter().find(|o| o.id == option_id)
    }

    /// Warning text for an option, if it declares a non-empty one
    pub fn warning(&self, option_id: &str) -> Option<&str> {
        self.option(option_id)
            .and_then(|o| o.warning.as_deref())
            .filter(|w| !w.trim().is_empty())
    }

    /// Whether this operation would do nothing on this system.
    ///
    /// True when at least one option declares probe paths and none of
    /// the declared paths exist. Operations without any declared paths
    /// are never auto-hidden since nothing can be probed.
    pub fn would_do_nothing(&self) -> bool {
        let mut probed = false;
        for opt in &self.options {
            for path in &opt.paths {
                probed = true;
                if expand_tilde(path).exists() {
                    return false;
                }
            }
        }
        probed
    }

    /// Structural validation, used by the tree build to skip malformed
    /// entries instead of aborting the whole population
    pub fn validate(&self) -> Result<(), ScourError> {
        if self.id.trim().is_empty() {
            return Err(ScourError::CatalogEntryInvalid {
                id: self.name.clone(),
                reason: "empty operation id".into(),
            });
        }
        let mut seen = std::collections::HashSet::new();
        for opt in &self.options {
            if opt.id.trim().is_empty() {
                return Err(ScourError::CatalogEntryInvalid {
                    id: self.id.clone(),
                    reason: format!("option '{}' has an empty id", opt.name),
                });
            }
            if !seen.insert(opt.id.as_str()) {
                return Err(ScourError::CatalogEntryInvalid {
                    id: self.id.clone(),
                    reason: format!("duplicate option id '{}'", opt.id),
                });
            }
        }
        Ok(())
    }
}

/// Read-only set of available operations, sorted by id
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    operations: Vec<OperationEntry>,
}

impl Catalog {
    /// Build a catalog from entries, sorting them into stable id order
    pub fn from_entries(mut operations: Vec<OperationEntry>) -> Self {
        operations.sort_by(|a, b| a.id.cmp(&b.id));
        Self { operations }
    }

    /// All operations in sorted-id order
    pub fn operations(&self) -> &[OperationEntry] {
        &self.operations
    }

    /// Look up an operation by id
    pub fn get(&self, id: &str) -> Option<&OperationEntry> {
        self.operations.iter().find(|op| op.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }
}

/// Expand a leading ~ to the home directory
pub fn expand_tilde(path: &str) -> PathBuf {
    if path == "~" {
        return dirs::home_dir().unwrap_or_else(|| PathBuf::from(path));
    }
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}
