//! Layered preferences for Ease MD.
//!
//! Layers, lowest first:
//!
//!     defaults/ease.default.toml   embedded at build time
//!     ease.toml files              optional or required, in call order
//!     EASE_* environment vars      e.g. EASE_DRAFT_DELAY_MS=900
//!     overrides                    typed values from the CLI
//!
//! The merged table goes through [`Preferences::from_value_lenient`], so a bad
//! value for one key falls back to that key's default. Only unreadable or
//! malformed required files are errors.

pub mod preferences;

pub use config::ConfigError;
pub use preferences::{ImageInsertRule, Preferences};

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File, FileFormat, Map, ValueKind};
use std::path::Path;

const DEFAULT_TOML: &str = include_str!("../defaults/ease.default.toml");

/// Prefix for environment overrides.
pub const ENV_PREFIX: &str = "EASE";

#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    fn layer(mut self, path: &Path, required: bool) -> Self {
        tracing::debug!(path = %path.display(), required, "layering config file");
        let source = File::from(path).format(FileFormat::Toml).required(required);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layer a TOML file that must exist.
    pub fn with_file(self, path: impl AsRef<Path>) -> Self {
        self.layer(path.as_ref(), true)
    }

    /// Layer a TOML file if it exists.
    pub fn with_optional_file(self, path: impl AsRef<Path>) -> Self {
        self.layer(path.as_ref(), false)
    }

    /// Layer `EASE_*` variables from the process environment.
    pub fn with_env(self) -> Self {
        self.with_env_source(None)
    }

    /// Like [`Loader::with_env`], reading from `vars` instead of the process
    /// environment when given.
    pub fn with_env_source(mut self, vars: Option<Map<String, String>>) -> Self {
        let env = Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .try_parsing(true)
            .source(vars);
        self.builder = self.builder.add_source(env);
        self
    }

    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    pub fn build(self) -> Result<Preferences, ConfigError> {
        let value: serde_json::Value = self.builder.build()?.try_deserialize()?;
        Ok(Preferences::from_value_lenient(&value))
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// The embedded defaults alone.
pub fn load_defaults() -> Result<Preferences, ConfigError> {
    Loader::new().build()
}
