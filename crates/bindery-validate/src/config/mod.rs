//! Configuration Module
//!
//! File and environment configuration for bindery, allowing projects to
//! tune validation via `bindery.toml` and `BINDERY_*` variables.

mod file_config;
mod loader;

pub use file_config::{FileConfig, LoggingConfig};
pub use loader::{ConfigLoader, CONFIG_ENV_PREFIX, DEFAULT_CONFIG_FILENAME};
