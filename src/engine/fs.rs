use anyhow::{bail, Result};
use std::path::Path;
use tracing::debug;
use walkdir::WalkDir;

use super::{CleanEngine, UnitReport};
use crate::catalog::{expand_tilde, Catalog, OptionEntry};
use crate::common::format;
use crate::runner::{OptionSelection, RunRequest};

/// Filesystem engine: previews or deletes the files under the paths a
/// catalog option declares.
///
/// Only files below the user's home directory are touched unless
/// `allow_outside_home` is set. The declared root directory itself is
/// never removed, only its contents and emptied subdirectories.
pub struct FsEngine<'a> {
    catalog: &'a Catalog,
    allow_outside_home: bool,
}

impl<'a> FsEngine<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Self {
            catalog,
            allow_outside_home: false,
        }
    }

    pub fn allow_outside_home(mut self, allow: bool) -> Self {
        self.allow_outside_home = allow;
        self
    }

    fn is_protected(&self, path: &Path) -> bool {
        if path == Path::new("/") {
            return true;
        }
        match dirs::home_dir() {
            Some(home) => path == home || (!path.starts_with(&home) && !self.allow_outside_home),
            None => !self.allow_outside_home,
        }
    }

    fn process_option(
        &self,
        option: &OptionEntry,
        really_delete: bool,
        report: &mut UnitReport,
    ) {
        for declared in &option.paths {
            let root = expand_tilde(declared);
            if !root.exists() {
                continue;
            }
            if self.is_protected(&root) {
                report
                    .lines
                    .push(format!("skipping protected path: {}", root.display()));
                continue;
            }

            let mut dirs_seen = Vec::new();
            for entry in WalkDir::new(&root).contents_first(true) {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(e) => {
                        let at = e
                            .path()
                            .map(format::display_path)
                            .unwrap_or_else(|| root.display().to_string());
                        report.lines.push(format!("failed to read {}: {}", at, e));
                        continue;
                    }
                };
                let path = entry.path();
                if entry.file_type().is_dir() {
                    if path != root {
                        dirs_seen.push(path.to_path_buf());
                    }
                    continue;
                }
                let size = entry.metadata().map(|m| m.len()).unwrap_or(0);
                if really_delete {
                    match std::fs::remove_file(path) {
                        Ok(()) => {
                            report.bytes += size;
                            report.lines.push(format!(
                                "removed {} ({})",
                                format::display_path(path),
                                format::bytes_to_human(size)
                            ));
                        }
                        Err(e) => {
                            report.lines.push(format!(
                                "failed to remove {}: {}",
                                format::display_path(path),
                                e
                            ));
                        }
                    }
                } else {
                    report.bytes += size;
                    report.lines.push(format!(
                        "would remove {} ({})",
                        format::display_path(path),
                        format::bytes_to_human(size)
                    ));
                }
            }

            if really_delete {
                // contents_first ordering means children come before
                // parents, so emptied directories fold up naturally
                for dir in &dirs_seen {
                    let _ = std::fs::remove_dir(dir);
                }
            }
        }
    }
}

impl CleanEngine for FsEngine<'_> {
    fn prepare(&mut self, request: &RunRequest) -> Result<()> {
        for (op_id, selection) in request.entries() {
            let Some(entry) = self.catalog.get(op_id) else {
                bail!("unknown operation '{}'", op_id);
            };
            if let OptionSelection::Options(ids) = selection {
                for opt_id in ids {
                    if entry.option(opt_id).is_none() {
                        bail!("unknown option '{}' for operation '{}'", opt_id, op_id);
                    }
                }
            }
        }
        Ok(())
    }

    fn process(
        &mut self,
        operation: &str,
        option: Option<&str>,
        really_delete: bool,
    ) -> Result<UnitReport> {
        let Some(entry) = self.catalog.get(operation) else {
            bail!("unknown operation '{}'", operation);
        };

        let mut report = UnitReport::default();
        match option {
            Some(opt_id) => {
                let Some(opt) = entry.option(opt_id) else {
                    bail!("unknown option '{}' for operation '{}'", opt_id, operation);
                };
                self.process_option(opt, really_delete, &mut report);
            }
            None => {
                for opt in &entry.options {
                    self.process_option(opt, really_delete, &mut report);
                }
            }
        }

        debug!(
            operation,
            option = option.unwrap_or("*"),
            bytes = report.bytes,
            really_delete,
            "processed unit"
        );
        Ok(report)
    }
}
