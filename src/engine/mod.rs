pub mod fs;

pub use fs::FsEngine;

use anyhow::Result;

use crate::runner::RunRequest;

/// Outcome of one unit of work
#[derive(Debug, Default)]
pub struct UnitReport {
    /// Bytes that were (or would be) reclaimed
    pub bytes: u64,
    /// Human-readable detail lines for the run log
    pub lines: Vec<String>,
}

/// The cleaning collaborator driven by the worker.
///
/// One `process` call handles exactly one unit of work: a single
/// option within an operation, or the whole operation when `option`
/// is `None`. Implementations must not block for longer than one unit
/// is expected to take; the worker yields only between calls.
pub trait CleanEngine {
    /// Preflight for a captured request; an error here fails runner
    /// construction before any unit starts
    fn prepare(&mut self, _request: &RunRequest) -> Result<()> {
        Ok(())
    }

    /// Process one unit. `really_delete` false means preview: measure
    /// and report, touch nothing.
    fn process(&mut self, operation: &str, option: Option<&str>, really_delete: bool)
        -> Result<UnitReport>;
}
