use std::collections::BTreeMap;
use std::time::Instant;

use tracing::debug;

use super::progress::{LogTag, ProgressSink, ProgressUpdate};
use crate::common::errors::ScourError;
use crate::engine::CleanEngine;
use crate::selection::tree::{OptionSelection, SelectionTree};

/// Immutable snapshot of the selection driving one run.
///
/// Operations are kept in sorted-id order; options keep the order they
/// had when the snapshot was taken. The worker never re-reads the
/// selection tree, so toggles during a run cannot affect it.
#[derive(Debug, Clone, Default)]
pub struct RunRequest {
    entries: BTreeMap<String, OptionSelection>,
}

impl RunRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Capture the checked set of a selection tree
    pub fn from_tree(tree: &SelectionTree) -> Self {
        let mut request = Self::new();
        for op_id in tree.selected_operations() {
            if let Some(selection) = tree.selected_options(&op_id) {
                request.insert(op_id, selection);
            }
        }
        request
    }

    pub fn insert(&mut self, operation: impl Into<String>, selection: OptionSelection) {
        self.entries.insert(operation.into(), selection);
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Entries in sorted-id order
    pub fn entries(&self) -> impl Iterator<Item = (&String, &OptionSelection)> {
        self.entries.iter()
    }
}

/// Result of one `advance()` call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepResult {
    /// More units remain; schedule another `advance()`
    Continue,
    /// The run is finished (completed, empty, or aborted)
    Done,
}

#[derive(Debug, Clone)]
struct Unit {
    operation: String,
    option: Option<String>,
}

/// Cooperative preview/clean runner.
///
/// Each `advance()` performs exactly one unit of work (one option of
/// one operation) and returns, so the host can service events between
/// units. Cancellation via `abort()` is observed at the top of the
/// next `advance()`; a unit already in progress always finishes.
///
/// A worker is built per run and never reused.
pub struct Worker<'e> {
    engine: &'e mut dyn CleanEngine,
    really_delete: bool,
    units: Vec<Unit>,
    cursor: usize,
    announced_op: Option<String>,
    op_bytes: BTreeMap<String, u64>,
    total_bytes: u64,
    error_count: usize,
    aborted: bool,
    finished: bool,
    started: Instant,
}

impl<'e> Worker<'e> {
    /// Build a worker for a captured request.
    ///
    /// Fails fast with `NoOperationsSelected` on an empty request and
    /// with `RunnerConstructionFailed` when the engine rejects the
    /// request; neither touches the progress sink.
    pub fn new(
        request: &RunRequest,
        really_delete: bool,
        engine: &'e mut dyn CleanEngine,
    ) -> Result<Self, ScourError> {
        if request.is_empty() {
            return Err(ScourError::NoOperationsSelected);
        }
        engine
            .prepare(request)
            .map_err(ScourError::RunnerConstructionFailed)?;

        let mut units = Vec::new();
        for (op_id, selection) in request.entries() {
            match selection {
                OptionSelection::Whole => units.push(Unit {
                    operation: op_id.clone(),
                    option: None,
                }),
                OptionSelection::Options(ids) => {
                    for opt_id in ids {
                        units.push(Unit {
                            operation: op_id.clone(),
                            option: Some(opt_id.clone()),
                        });
                    }
                }
            }
        }

        debug!(units = units.len(), really_delete, "worker constructed");
        Ok(Self {
            engine,
            really_delete,
            units,
            cursor: 0,
            announced_op: None,
            op_bytes: BTreeMap::new(),
            total_bytes: 0,
            error_count: 0,
            aborted: false,
            finished: false,
            started: Instant::now(),
        })
    }

    /// Request cooperative cancellation. The next `advance()` reports
    /// `Done` without starting further units.
    pub fn abort(&mut self) {
        self.aborted = true;
    }

    pub fn is_aborted(&self) -> bool {
        self.aborted
    }

    /// Units failed so far; failures never stop the run
    pub fn error_count(&self) -> usize {
        self.error_count
    }

    /// Bytes reclaimed (or previewed) so far
    pub fn total_bytes(&self) -> u64 {
        self.total_bytes
    }

    /// Total units captured at construction
    pub fn unit_count(&self) -> usize {
        self.units.len()
    }

    /// Perform one unit of work and report through `sink`.
    pub fn advance(&mut self, sink: &mut dyn ProgressSink) -> StepResult {
        if self.finished {
            return StepResult::Done;
        }
        if self.aborted {
            self.finish(sink);
            return StepResult::Done;
        }
        if self.units.is_empty() {
            // Nothing to do: jump straight to completion
            sink.on_progress(ProgressUpdate::Fraction(1.0));
            self.finish(sink);
            return StepResult::Done;
        }

        let unit = self.units[self.cursor].clone();
        if self.announced_op.as_deref() != Some(unit.operation.as_str()) {
            self.announced_op = Some(unit.operation.clone());
            sink.on_progress(ProgressUpdate::Message(unit.operation.clone()));
        }

        match self
            .engine
            .process(&unit.operation, unit.option.as_deref(), self.really_delete)
        {
            Ok(report) => {
                for line in &report.lines {
                    sink.on_log(line, None);
                }
                let op_total = self
                    .op_bytes
                    .entry(unit.operation.clone())
                    .and_modify(|b| *b += report.bytes)
                    .or_insert(report.bytes);
                let op_total = *op_total;
                self.total_bytes += report.bytes;

                sink.on_item_size(&unit.operation, unit.option.as_deref(), report.bytes);
                if unit.option.is_some() {
                    sink.on_item_size(&unit.operation, None, op_total);
                }
                sink.on_total_size(self.total_bytes);
            }
            Err(source) => {
                self.error_count += 1;
                let err = ScourError::UnitOfWorkFailed {
                    unit: ScourError::unit_label(&unit.operation, unit.option.as_deref()),
                    source,
                };
                sink.on_log(&err.to_string(), Some(LogTag::Error));
            }
        }

        self.cursor += 1;
        sink.on_progress(ProgressUpdate::Fraction(
            self.cursor as f64 / self.units.len() as f64,
        ));

        if self.cursor == self.units.len() {
            self.finish(sink);
            StepResult::Done
        } else {
            StepResult::Continue
        }
    }

    fn finish(&mut self, sink: &mut dyn ProgressSink) {
        self.finished = true;
        if self.error_count > 0 {
            sink.on_log(
                &format!("run finished with {} failed units", self.error_count),
                Some(LogTag::Error),
            );
        }
        let elapsed = self.started.elapsed().as_secs_f64();
        debug!(
            elapsed_secs = elapsed,
            total_bytes = self.total_bytes,
            errors = self.error_count,
            aborted = self.aborted,
            "run finished"
        );
        sink.on_done(self.really_delete, elapsed);
    }
}
