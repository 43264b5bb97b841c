//! Configuration loading from embedded defaults, an optional file, and
//! environment variables, in precedence order (spec §6).

use crate::domain::error::{Error, Result};
use config::{Config as ConfigBuilder, Environment, FileFormat};
use std::path::Path;
use validator::Validate;

use super::types::Config;

/// Embedded default configuration. Compiled into the binary so defaults
/// are available regardless of the process's working directory.
const DEFAULT_CONFIG_TOML: &str = include_str!("../../../config/default.toml");

/// Returns the embedded default config TOML, exposed for tests that verify
/// defaults parse and validate cleanly.
pub fn get_default_config_toml() -> &'static str {
    DEFAULT_CONFIG_TOML
}

/// Loads `Config` by layering embedded defaults, an optional TOML file, and
/// `CODEINDEX__`-prefixed environment variables.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConfigLoader;

impl ConfigLoader {
    /// Create a new loader.
    pub fn new() -> Self {
        Self
    }

    /// Load using only embedded defaults and environment overrides.
    pub fn load(&self) -> Result<Config> {
        self.build(None)
    }

    /// Load, layering `path` over the embedded defaults if it exists.
    pub fn load_with_file(&self, path: &Path) -> Result<Config> {
        self.build(Some(path))
    }

    fn build(&self, path: Option<&Path>) -> Result<Config> {
        let mut builder = ConfigBuilder::builder()
            .add_source(config::File::from_str(DEFAULT_CONFIG_TOML, FileFormat::Toml));

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(false));
        }

        builder = builder.add_source(
            Environment::with_prefix("CODEINDEX")
                .separator("__")
                .try_parsing(true),
        );

        let built = builder
            .build()
            .map_err(|e| Error::configuration(format!("failed to build configuration: {e}")))?;

        let config: Config = built
            .try_deserialize()
            .map_err(|e| Error::configuration(format!("failed to deserialize configuration: {e}")))?;

        config
            .validate()
            .map_err(|e| Error::configuration(format!("configuration validation failed: {e}")))?;

        Ok(config)
    }
}
