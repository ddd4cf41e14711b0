pub mod config;
pub mod errors;
pub mod format;

pub use config::Settings;
pub use errors::ScourError;
