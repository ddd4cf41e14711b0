pub mod loader;
pub mod model;

pub use loader::load_catalog;
pub use model::{expand_tilde, Catalog, OperationEntry, OptionEntry};
