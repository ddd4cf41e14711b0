use std::collections::HashSet;

use anyhow::{anyhow, bail, Result};
use scour::common::ScourError;
use scour::engine::{CleanEngine, UnitReport};
use scour::runner::{
    LogTag, OptionSelection, ProgressSink, ProgressUpdate, RunRequest, StepResult, Worker,
};

/// Engine that records the order of processed units and can be told to
/// fail specific ones
#[derive(Default)]
struct ScriptedEngine {
    processed: Vec<String>,
    fail_units: HashSet<String>,
    fail_prepare: bool,
    bytes_per_unit: u64,
}

fn unit_label(operation: &str, option: Option<&str>) -> String {
    match option {
        Some(opt) => format!("{}.{}", operation, opt),
        None => operation.to_string(),
    }
}

impl CleanEngine for ScriptedEngine {
    fn prepare(&mut self, _request: &RunRequest) -> Result<()> {
        if self.fail_prepare {
            bail!("engine rejected the request");
        }
        Ok(())
    }

    fn process(
        &mut self,
        operation: &str,
        option: Option<&str>,
        _really_delete: bool,
    ) -> Result<UnitReport> {
        let label = unit_label(operation, option);
        self.processed.push(label.clone());
        if self.fail_units.contains(&label) {
            return Err(anyhow!("boom"));
        }
        Ok(UnitReport {
            bytes: self.bytes_per_unit,
            lines: vec![format!("processed {}", label)],
        })
    }
}

#[derive(Debug, PartialEq)]
enum Event {
    Progress(ProgressUpdate),
    Log(String, bool),
    Item(String, Option<String>, u64),
    Total(u64),
    Done(bool, bool),
}

#[derive(Default)]
struct RecordingSink {
    events: Vec<Event>,
}

impl RecordingSink {
    fn done_count(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, Event::Done(..)))
            .count()
    }
}

impl ProgressSink for RecordingSink {
    fn on_progress(&mut self, update: ProgressUpdate) {
        self.events.push(Event::Progress(update));
    }
    fn on_log(&mut self, text: &str, tag: Option<LogTag>) {
        self.events
            .push(Event::Log(text.to_string(), tag == Some(LogTag::Error)));
    }
    fn on_item_size(&mut self, operation: &str, option: Option<&str>, bytes: u64) {
        self.events.push(Event::Item(
            operation.to_string(),
            option.map(str::to_string),
            bytes,
        ));
    }
    fn on_total_size(&mut self, bytes: u64) {
        self.events.push(Event::Total(bytes));
    }
    fn on_done(&mut self, really_deleted: bool, elapsed_secs: f64) {
        self.events
            .push(Event::Done(really_deleted, elapsed_secs >= 0.0));
    }
}

fn request(entries: &[(&str, &[&str])]) -> RunRequest {
    let mut request = RunRequest::new();
    for (op, options) in entries {
        request.insert(
            *op,
            OptionSelection::Options(options.iter().map(|o| o.to_string()).collect()),
        );
    }
    request
}

fn drain(worker: &mut Worker<'_>, sink: &mut RecordingSink) -> usize {
    let mut calls = 0;
    loop {
        calls += 1;
        if worker.advance(sink) == StepResult::Done {
            return calls;
        }
    }
}

// ─── construction ────────────────────────────────────────────────────────────

#[test]
fn test_empty_request_fails_fast() {
    let mut engine = ScriptedEngine::default();
    let result = Worker::new(&RunRequest::new(), false, &mut engine);
    assert!(matches!(result, Err(ScourError::NoOperationsSelected)));
    assert!(engine.processed.is_empty());
}

#[test]
fn test_engine_rejection_fails_construction() {
    let mut engine = ScriptedEngine {
        fail_prepare: true,
        ..Default::default()
    };
    let result = Worker::new(&request(&[("cache", &["tmp"])]), false, &mut engine);
    assert!(matches!(
        result,
        Err(ScourError::RunnerConstructionFailed(_))
    ));
}

// ─── stepping ────────────────────────────────────────────────────────────────

#[test]
fn test_units_run_in_deterministic_order() {
    let req = request(&[("zz", &["a"][..]), ("aa", &["x", "y"][..])]);

    let mut first_order = Vec::new();
    for _ in 0..2 {
        let mut engine = ScriptedEngine {
            bytes_per_unit: 10,
            ..Default::default()
        };
        let mut sink = RecordingSink::default();
        let mut worker = Worker::new(&req, false, &mut engine).unwrap();
        let calls = drain(&mut worker, &mut sink);

        assert_eq!(calls, 3, "one advance per unit");
        assert_eq!(engine.processed, vec!["aa.x", "aa.y", "zz.a"]);
        if first_order.is_empty() {
            first_order = engine.processed.clone();
        } else {
            assert_eq!(engine.processed, first_order);
        }
        assert_eq!(sink.done_count(), 1);
    }
}

#[test]
fn test_advance_reports_sizes_and_totals() {
    let mut engine = ScriptedEngine {
        bytes_per_unit: 100,
        ..Default::default()
    };
    let mut sink = RecordingSink::default();
    let req = request(&[("cache", &["tmp", "logs"])]);
    let mut worker = Worker::new(&req, false, &mut engine).unwrap();
    drain(&mut worker, &mut sink);

    assert!(sink.events.contains(&Event::Item(
        "cache".to_string(),
        Some("tmp".to_string()),
        100
    )));
    // Operation running total after the second unit
    assert!(sink
        .events
        .contains(&Event::Item("cache".to_string(), None, 200)));
    assert!(sink.events.contains(&Event::Total(200)));
    assert_eq!(worker.total_bytes(), 200);

    // Final fraction reaches 1.0
    assert!(sink
        .events
        .contains(&Event::Progress(ProgressUpdate::Fraction(1.0))));
}

#[test]
fn test_whole_operation_sentinel_is_one_unit() {
    let mut req = RunRequest::new();
    req.insert("trash", OptionSelection::Whole);
    let mut engine = ScriptedEngine {
        bytes_per_unit: 7,
        ..Default::default()
    };
    let mut sink = RecordingSink::default();
    let mut worker = Worker::new(&req, false, &mut engine).unwrap();
    let calls = drain(&mut worker, &mut sink);

    assert_eq!(calls, 1);
    assert_eq!(engine.processed, vec!["trash"]);
    assert!(sink
        .events
        .contains(&Event::Item("trash".to_string(), None, 7)));
}

#[test]
fn test_zero_units_completes_on_first_advance() {
    // Selected operation with no selected options: nothing to do
    let req = request(&[("cache", &[])]);
    let mut engine = ScriptedEngine::default();
    let mut sink = RecordingSink::default();
    let mut worker = Worker::new(&req, false, &mut engine).unwrap();

    assert_eq!(worker.unit_count(), 0);
    assert_eq!(worker.advance(&mut sink), StepResult::Done);
    assert!(engine.processed.is_empty());
    assert_eq!(
        sink.events[0],
        Event::Progress(ProgressUpdate::Fraction(1.0))
    );
    assert_eq!(sink.done_count(), 1);
}

#[test]
fn test_done_carries_really_delete_flag() {
    for really_delete in [false, true] {
        let mut engine = ScriptedEngine::default();
        let mut sink = RecordingSink::default();
        let req = request(&[("cache", &["tmp"])]);
        let mut worker = Worker::new(&req, really_delete, &mut engine).unwrap();
        drain(&mut worker, &mut sink);
        assert!(sink.events.contains(&Event::Done(really_delete, true)));
    }
}

// ─── failure handling ────────────────────────────────────────────────────────

#[test]
fn test_failed_unit_is_logged_and_run_continues() {
    let mut engine = ScriptedEngine {
        bytes_per_unit: 10,
        fail_units: ["cache.tmp".to_string()].into(),
        ..Default::default()
    };
    let mut sink = RecordingSink::default();
    let req = request(&[("cache", &["tmp", "logs"])]);
    let mut worker = Worker::new(&req, false, &mut engine).unwrap();
    drain(&mut worker, &mut sink);

    assert_eq!(worker.error_count(), 1);
    assert!(sink
        .events
        .iter()
        .any(|e| matches!(e, Event::Log(text, true) if text.contains("cache.tmp"))));
    // The failed unit contributes no bytes, the surviving one does
    assert_eq!(worker.total_bytes(), 10);
    assert_eq!(sink.done_count(), 1);
    assert_eq!(engine.processed, vec!["cache.tmp", "cache.logs"]);
}

// ─── cancellation ────────────────────────────────────────────────────────────

#[test]
fn test_abort_stops_before_next_unit() {
    let mut engine = ScriptedEngine {
        bytes_per_unit: 10,
        ..Default::default()
    };
    let mut sink = RecordingSink::default();
    let req = request(&[("cache", &["a", "b", "c"])]);
    let mut worker = Worker::new(&req, false, &mut engine).unwrap();

    assert_eq!(worker.advance(&mut sink), StepResult::Continue);
    worker.abort();
    let events_at_abort = sink.events.len();

    assert_eq!(worker.advance(&mut sink), StepResult::Done);
    assert!(worker.is_aborted());

    // After the abort point: only the completion signal, no more
    // per-unit progress or size callbacks
    let tail = &sink.events[events_at_abort..];
    assert!(!tail
        .iter()
        .any(|e| matches!(e, Event::Item(..) | Event::Progress(_) | Event::Total(_))));
    assert_eq!(sink.done_count(), 1);

    // Further advances stay Done without new callbacks
    assert_eq!(worker.advance(&mut sink), StepResult::Done);
    assert_eq!(sink.done_count(), 1);
    assert_eq!(engine.processed, vec!["cache.a"], "no further units start");
}
