use std::path::PathBuf;

use thiserror::Error;

/// Typed errors for the selection/run core.
///
/// The CLI layer wraps these in `anyhow` for reporting; modules use the
/// typed variants so callers can distinguish "nothing selected" from a
/// genuine failure.
#[derive(Debug, Error)]
pub enum ScourError {
    /// A single catalog entry is malformed. The tree build skips the
    /// entry and keeps going; this is never fatal to the whole catalog.
    #[error("invalid catalog entry '{id}': {reason}")]
    CatalogEntryInvalid { id: String, reason: String },

    /// A run was requested with an empty selection. Reported
    /// synchronously by `Worker::new` before any progress callback.
    #[error("no operations selected")]
    NoOperationsSelected,

    /// One unit of work failed inside `advance()`. Logged with the
    /// error tag and counted; the run continues with the next unit.
    #[error("{unit} failed: {source}")]
    UnitOfWorkFailed {
        unit: String,
        #[source]
        source: anyhow::Error,
    },

    /// The runner could not be built from a non-empty request.
    #[error("could not start run: {0}")]
    RunnerConstructionFailed(#[source] anyhow::Error),

    /// Catalog file could not be read or parsed.
    #[error("catalog error in '{path}': {message}")]
    CatalogUnreadable { path: PathBuf, message: String },
}

impl ScourError {
    /// Label for a unit of work, used in log lines and `UnitOfWorkFailed`.
    pub fn unit_label(operation: &str, option: Option<&str>) -> String {
        match option {
            Some(opt) => format!("{}.{}", operation, opt),
            None => operation.to_string(),
        }
    }
}
