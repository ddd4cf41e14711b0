/// Progress feedback, either a completion fraction or a status line
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressUpdate {
    /// Completed fraction in [0, 1]
    Fraction(f64),
    /// Informational status text
    Message(String),
}

/// Tag attached to log lines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTag {
    Error,
}

/// Callback surface the worker reports through.
///
/// Every method is invoked synchronously from within `advance()` (or,
/// for nothing-to-do runs, the first `advance()` after construction),
/// never from another thread, so implementations may freely mutate UI
/// state without synchronization.
pub trait ProgressSink {
    /// Progress of the whole run
    fn on_progress(&mut self, update: ProgressUpdate);

    /// One log line; `Some(LogTag::Error)` marks failures
    fn on_log(&mut self, text: &str, tag: Option<LogTag>);

    /// Updated byte count for one (operation, option); `None` for the
    /// option addresses the operation's running total
    fn on_item_size(&mut self, operation: &str, option: Option<&str>, bytes: u64);

    /// Updated byte count across the whole run
    fn on_total_size(&mut self, bytes: u64);

    /// Exactly one call when the run finishes or is aborted
    fn on_done(&mut self, really_deleted: bool, elapsed_secs: f64);
}
