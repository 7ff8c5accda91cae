//! Configuration loader
//!
//! Merges defaults, an optional TOML file and environment variables with
//! Figment.

use crate::config::FileConfig;
use crate::logging::{log_config_loaded, parse_log_level};
use crate::{Result, Severity, ValidationError};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use std::path::{Path, PathBuf};

/// Prefix of configuration environment variables
pub const CONFIG_ENV_PREFIX: &str = "BINDERY";

/// File looked up in the working directory when no path is given
pub const DEFAULT_CONFIG_FILENAME: &str = "bindery.toml";

/// Configuration loader service
#[derive(Clone)]
pub struct ConfigLoader {
    /// Configuration file path
    config_path: Option<PathBuf>,

    /// Environment prefix
    env_prefix: String,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Create a new configuration loader with default settings
    pub fn new() -> Self {
        Self {
            config_path: None,
            env_prefix: CONFIG_ENV_PREFIX.to_string(),
        }
    }

    /// Set the configuration file path
    pub fn with_config_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Set the environment variable prefix
    pub fn with_env_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// Load configuration from all sources
    ///
    /// Configuration sources are merged in this order (later sources override earlier):
    /// 1. Default values from `FileConfig::default()`
    /// 2. TOML configuration file (if exists)
    /// 3. Environment variables with prefix, sections split on `__`
    ///    (e.g., `BINDERY_VALIDATION__NULLABLE_VALIDATION=warning`)
    pub fn load(&self) -> Result<FileConfig> {
        let mut figment = Figment::new().merge(Serialized::defaults(FileConfig::default()));

        let path = self
            .config_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILENAME));
        if path.exists() {
            figment = figment.merge(Toml::file(&path));
            log_config_loaded(&path, true);
        } else if self.config_path.is_some() {
            log_config_loaded(&path, false);
        }

        figment = figment.merge(Env::prefixed(&format!("{}_", self.env_prefix)).split("__"));

        let config: FileConfig = figment
            .extract()
            .map_err(|e| ValidationError::Config(format!("Failed to extract configuration: {e}")))?;

        self.validate_config(&config)?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save_to_file<P: AsRef<Path>>(&self, config: &FileConfig, path: P) -> Result<()> {
        let toml_string = toml::to_string_pretty(config)?;
        std::fs::write(path.as_ref(), toml_string)?;
        Ok(())
    }

    /// Get the configured file path
    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }

    /// Validate configuration values
    fn validate_config(&self, config: &FileConfig) -> Result<()> {
        if config.validation.nullable_validation == Severity::Info {
            return Err(ValidationError::Config(
                "nullable_validation must be Error or Warning".to_string(),
            ));
        }
        parse_log_level(&config.logging.level)?;
        Ok(())
    }
}
