pub mod progress;
pub mod worker;

pub use crate::selection::tree::OptionSelection;
pub use progress::{LogTag, ProgressSink, ProgressUpdate};
pub use worker::{RunRequest, StepResult, Worker};

/// Minimal host-scheduler binding: keep advancing the worker until it
/// reports `Done`, polling `abort_requested` between steps.
///
/// Event-loop hosts schedule `advance()` as a zero-delay continuation
/// instead; the worker only requires that each call happens eventually
/// and on the owning thread.
pub fn drive<F>(worker: &mut Worker<'_>, sink: &mut dyn ProgressSink, abort_requested: F)
where
    F: Fn() -> bool,
{
    loop {
        if abort_requested() {
            worker.abort();
        }
        if let StepResult::Done = worker.advance(sink) {
            break;
        }
    }
}
