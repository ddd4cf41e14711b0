use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::common::format::{bytes_to_human, elapsed_to_human, truncate_middle};
use crate::runner::{LogTag, ProgressSink, ProgressUpdate};
use crate::selection::SelectionTree;

/// Print the selection tree with checkbox state
pub fn print_tree(tree: &SelectionTree) {
    println!();
    for op in tree.operations() {
        let mark = if op.checked { "[x]".green() } else { "[ ]".dimmed() };
        println!("  {} {} {}", mark, op.name.bold(), op.id.dimmed());
        for opt in &op.options {
            let mark = if opt.checked { "[x]".green() } else { "[ ]".dimmed() };
            let warn = if opt.warning.is_some() {
                " ⚠".yellow().to_string()
            } else {
                String::new()
            };
            println!("      {} {} {}{}", mark, opt.name, opt.id.dimmed(), warn);
        }
    }
    if !tree.hidden().is_empty() {
        println!();
        println!(
            "  {} {} hidden (nothing to do here); use --all to show",
            "·".dimmed(),
            tree.hidden().len()
        );
    }
    println!();
}

/// Machine-readable run summary
#[derive(Debug, Serialize)]
pub struct RunSummary {
    pub really_deleted: bool,
    pub units: usize,
    pub failed_units: usize,
    pub total_bytes: u64,
    pub elapsed_secs: f64,
    pub aborted: bool,
    pub finished_at: chrono::DateTime<chrono::Local>,
    pub operation_bytes: BTreeMap<String, u64>,
}

pub fn print_summary_human(summary: &RunSummary) {
    println!();
    for (op, bytes) in &summary.operation_bytes {
        println!("  {:<24} {}", op, bytes_to_human(*bytes).cyan());
    }
    let verb = if summary.really_deleted {
        "Recovered"
    } else {
        "Would recover"
    };
    let mut line = format!(
        "  {} {} in {}",
        verb,
        bytes_to_human(summary.total_bytes),
        elapsed_to_human(summary.elapsed_secs)
    );
    if summary.failed_units > 0 {
        line.push_str(&format!(" ({} units failed)", summary.failed_units));
    }
    if summary.aborted {
        line.push_str(" (aborted)");
    }
    println!("{}", line.bold());
    println!();
}

pub fn print_summary_json(summary: &RunSummary) {
    match serde_json::to_string_pretty(summary) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("failed to serialize summary: {}", e),
    }
}

/// ProgressSink rendering to the terminal: an indicatif bar for the
/// fraction, log lines printed above it, sizes collected for the final
/// summary.
pub struct ConsoleSink {
    bar: ProgressBar,
    pub operation_bytes: BTreeMap<String, u64>,
    pub total_bytes: u64,
    pub elapsed_secs: f64,
    pub really_deleted: bool,
    pub error_lines: usize,
    quiet: bool,
}

const BAR_TICKS: u64 = 1000;

impl ConsoleSink {
    pub fn new(quiet: bool) -> Self {
        let bar = if quiet {
            ProgressBar::hidden()
        } else {
            let bar = ProgressBar::new(BAR_TICKS);
            bar.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.cyan} [{bar:40.cyan/blue}] {percent}% {msg}")
                    .unwrap()
                    .progress_chars("━━░"),
            );
            bar
        };
        Self {
            bar,
            operation_bytes: BTreeMap::new(),
            total_bytes: 0,
            elapsed_secs: 0.0,
            really_deleted: false,
            error_lines: 0,
            quiet,
        }
    }
}

impl ProgressSink for ConsoleSink {
    fn on_progress(&mut self, update: ProgressUpdate) {
        match update {
            ProgressUpdate::Fraction(f) => {
                let f = f.clamp(0.0, 1.0);
                self.bar.set_position((f * BAR_TICKS as f64) as u64);
            }
            ProgressUpdate::Message(text) => {
                self.bar.set_message(truncate_middle(&text, 40));
            }
        }
    }

    fn on_log(&mut self, text: &str, tag: Option<LogTag>) {
        match tag {
            Some(LogTag::Error) => {
                self.error_lines += 1;
                self.bar.println(format!("{} {}", "ERROR:".red().bold(), text));
            }
            None => {
                if !self.quiet {
                    self.bar.println(text.to_string());
                }
            }
        }
    }

    fn on_item_size(&mut self, operation: &str, option: Option<&str>, bytes: u64) {
        // The summary table tracks operation totals; per-option figures
        // arrive with `option` set and are superseded by the operation
        // total reported right after them.
        if option.is_none() {
            self.operation_bytes.insert(operation.to_string(), bytes);
        }
    }

    fn on_total_size(&mut self, bytes: u64) {
        self.total_bytes = bytes;
    }

    fn on_done(&mut self, really_deleted: bool, elapsed_secs: f64) {
        self.really_deleted = really_deleted;
        self.elapsed_secs = elapsed_secs;
        self.bar.finish_and_clear();
    }
}
