use tracing::{debug, warn};

use super::store::SelectionStore;
use crate::catalog::{Catalog, OperationEntry};
use crate::confirm::ConfirmationGate;

/// Checkbox state for one option
#[derive(Debug, Clone)]
pub struct OptionNode {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub warning: Option<String>,
    pub checked: bool,
}

impl OptionNode {
    fn describe(&self) -> &str {
        self.description.as_deref().unwrap_or(&self.name)
    }

    fn active_warning(&self) -> Option<&str> {
        self.warning.as_deref().filter(|w| !w.trim().is_empty())
    }
}

/// Checkbox state for one operation and its options
#[derive(Debug, Clone)]
pub struct OperationNode {
    pub id: String,
    pub name: String,
    pub checked: bool,
    pub options: Vec<OptionNode>,
}

impl OperationNode {
    pub fn option(&self, option_id: &str) -> Option<&OptionNode> {
        self.options.iter().find(|o| o.id == option_id)
    }

    fn derived_checked(&self) -> bool {
        self.options.iter().any(|o| o.checked)
    }
}

/// Result of a toggle request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// State changed (or was confirmed) and persisted
    Applied,
    /// The confirmation gate rejected the change; state reverted
    Declined,
    /// No such operation/option in the tree
    NotFound,
}

/// Selected options of one operation in a run snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionSelection {
    /// Operation has no sub-options; process it as a whole
    Whole,
    /// Explicitly selected option ids, in tree order
    Options(Vec<String>),
}

/// In-memory mirror of catalog × selection store with tri-state
/// propagation.
///
/// The parent flag of every operation is derived as an OR over its
/// options and re-applied after every resolved toggle, so the tree
/// never exposes an inconsistent parent/child combination.
#[derive(Debug, Clone, Default)]
pub struct SelectionTree {
    operations: Vec<OperationNode>,
    hidden: Vec<String>,
}

impl SelectionTree {
    /// Build the tree from the catalog and persisted flags.
    ///
    /// Operations with zero options are not selectable and are skipped.
    /// Operations matching `hide` are skipped and recorded for
    /// diagnostics. Malformed entries are logged and skipped rather
    /// than aborting the population.
    pub fn build<F>(catalog: &Catalog, store: &dyn SelectionStore, hide: F) -> Self
    where
        F: Fn(&OperationEntry) -> bool,
    {
        let mut operations = Vec::new();
        let mut hidden = Vec::new();

        for entry in catalog.operations() {
            if entry.options.is_empty() {
                debug!(operation = %entry.id, "skipping operation without options");
                continue;
            }
            if let Err(e) = entry.validate() {
                warn!(error = %e, "skipping invalid catalog entry");
                continue;
            }
            if hide(entry) {
                hidden.push(entry.id.clone());
                continue;
            }

            let options: Vec<OptionNode> = entry
                .options
                .iter()
                .map(|opt| OptionNode {
                    id: opt.id.clone(),
                    name: opt.name.clone(),
                    description: opt.description.clone(),
                    warning: opt.warning.clone(),
                    checked: store.get(&entry.id, Some(&opt.id)).unwrap_or(false),
                })
                .collect();

            operations.push(OperationNode {
                id: entry.id.clone(),
                name: entry.name.clone(),
                checked: store.get(&entry.id, None).unwrap_or(false),
                options,
            });
        }

        if !hidden.is_empty() {
            debug!(count = hidden.len(), ids = ?hidden, "automatically hid operations");
        }

        Self { operations, hidden }
    }

    /// Operations in sorted-id order
    pub fn operations(&self) -> &[OperationNode] {
        &self.operations
    }

    /// Ids of operations hidden during the last build
    pub fn hidden(&self) -> &[String] {
        &self.hidden
    }

    pub fn operation(&self, id: &str) -> Option<&OperationNode> {
        self.operations.iter().find(|op| op.id == id)
    }

    /// Set an operation's flag and force every option to match.
    ///
    /// Operation-level toggles never trigger warnings; each affected
    /// flag is persisted immediately.
    pub fn toggle_operation(
        &mut self,
        operation_id: &str,
        checked: bool,
        store: &mut dyn SelectionStore,
    ) -> ToggleOutcome {
        let Some(op) = self.operations.iter_mut().find(|o| o.id == operation_id) else {
            return ToggleOutcome::NotFound;
        };

        for opt in &mut op.options {
            opt.checked = checked;
        }
        op.checked = checked;

        let option_ids: Vec<String> = op.options.iter().map(|o| o.id.clone()).collect();
        let op_id = op.id.clone();
        for opt_id in &option_ids {
            store.set(&op_id, Some(opt_id), checked);
        }
        store.set(&op_id, None, checked);

        ToggleOutcome::Applied
    }

    /// Set one option's flag, asking the gate first when enabling a
    /// warned option.
    ///
    /// A declined confirmation reverts the pending change without
    /// persisting the option. The parent flag is re-derived after every
    /// resolved toggle, declines included.
    pub fn toggle_option(
        &mut self,
        operation_id: &str,
        option_id: &str,
        checked: bool,
        store: &mut dyn SelectionStore,
        gate: &dyn ConfirmationGate,
    ) -> ToggleOutcome {
        let Some(op_idx) = self.operations.iter().position(|o| o.id == operation_id) else {
            return ToggleOutcome::NotFound;
        };
        let Some(opt_idx) = self.operations[op_idx]
            .options
            .iter()
            .position(|o| o.id == option_id)
        else {
            return ToggleOutcome::NotFound;
        };

        // The warning fires only on the unchecked -> checked transition.
        if checked && !self.operations[op_idx].options[opt_idx].checked {
            let op = &self.operations[op_idx];
            let opt = &op.options[opt_idx];
            if let Some(warning) = opt.active_warning() {
                if !gate.confirm_warning(&op.name, opt.describe(), warning) {
                    self.reconcile_parent(op_idx, store, false);
                    return ToggleOutcome::Declined;
                }
            }
        }

        self.operations[op_idx].options[opt_idx].checked = checked;
        store.set(operation_id, Some(option_id), checked);
        self.reconcile_parent(op_idx, store, true);
        ToggleOutcome::Applied
    }

    /// Re-apply the OR-reduction invariant for one operation. When
    /// `persist_unchanged` is false the store write is skipped if the
    /// derived value already matches, keeping declined toggles free of
    /// store churn.
    fn reconcile_parent(
        &mut self,
        op_idx: usize,
        store: &mut dyn SelectionStore,
        persist_unchanged: bool,
    ) {
        let op = &mut self.operations[op_idx];
        if op.options.is_empty() {
            return;
        }
        let derived = op.derived_checked();
        let changed = op.checked != derived;
        op.checked = derived;
        if changed || persist_unchanged {
            let id = op.id.clone();
            store.set(&id, None, derived);
        }
    }

    /// Ids of currently checked operations, in tree order
    pub fn selected_operations(&self) -> Vec<String> {
        self.operations
            .iter()
            .filter(|op| op.checked)
            .map(|op| op.id.clone())
            .collect()
    }

    /// Selected options of one operation, or `None` for an unknown id
    pub fn selected_options(&self, operation_id: &str) -> Option<OptionSelection> {
        let op = self.operation(operation_id)?;
        if op.options.is_empty() {
            return Some(OptionSelection::Whole);
        }
        Some(OptionSelection::Options(
            op.options
                .iter()
                .filter(|o| o.checked)
                .map(|o| o.id.clone())
                .collect(),
        ))
    }
}
