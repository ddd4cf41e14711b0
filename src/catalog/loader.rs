use anyhow::{Context, Result};
use std::path::Path;
use tracing::debug;

use super::model::{Catalog, OperationEntry};

#[derive(Debug, serde::Deserialize)]
struct CatalogFile {
    #[serde(default, rename = "operation")]
    operations: Vec<OperationEntry>,
}

/// Load a catalog from a TOML file.
///
/// Parsing is strict at the file level (an unreadable or syntactically
/// broken file is an error); per-entry structural problems are left for
/// the tree build, which skips bad entries and keeps going.
pub fn load_catalog(path: &Path) -> Result<Catalog> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read catalog: {}", path.display()))?;
    let file: CatalogFile = toml::from_str(&contents)
        .with_context(|| format!("Failed to parse catalog: {}", path.display()))?;
    debug!(
        operations = file.operations.len(),
        path = %path.display(),
        "loaded catalog"
    );
    Ok(Catalog::from_entries(file.operations))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_catalog_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.toml");
        std::fs::write(
            &path,
            r#"
[[operation]]
id = "cache"
name = "Cache"

[[operation.option]]
id = "temp_files"
name = "Temporary files"

[[operation.option]]
id = "logs"
name = "Logs"
warning = "Log history will be lost."
"#,
        )
        .unwrap();

        let catalog = load_catalog(&path).unwrap();
        assert_eq!(catalog.len(), 1);
        let op = catalog.get("cache").unwrap();
        assert_eq!(op.options.len(), 2);
        assert!(op.warning("logs").is_some());
        assert!(op.warning("temp_files").is_none());
    }

    #[test]
    fn test_load_catalog_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_catalog(&dir.path().join("nope.toml")).is_err());
    }
}
