pub mod store;
pub mod tree;

pub use store::{FileStore, MemoryStore, SelectionStore};
pub use tree::{OperationNode, OptionNode, OptionSelection, SelectionTree, ToggleOutcome};
