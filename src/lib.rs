//! # Scour
//!
//! A selection-driven, preview-first system cleanup core.
//!
//! Scour keeps a tree of cleanup operations and their options, mirrors
//! every checkbox into a persisted store, and runs preview or delete
//! passes as a cooperative state machine the host advances one unit of
//! work at a time. It features:
//!
//! - **Tri-state selection tree**: an operation is checked exactly when
//!   one of its options is, re-derived on every toggle
//! - **Warning-gated toggles**: enabling a risky option asks first, and
//!   a declined prompt reverts cleanly
//! - **Cooperative runs**: `advance()` does one unit and yields, so any
//!   event loop stays responsive and can abort between units
//! - **Preview by default**: the same run machinery measures without
//!   deleting until explicitly told otherwise
//! - **Graceful degradation**: bad catalog entries are skipped, failed
//!   units are logged and counted, the run keeps going

pub mod catalog;
pub mod cli;
pub mod common;
pub mod confirm;
pub mod engine;
pub mod runner;
pub mod selection;
