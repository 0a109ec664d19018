//! Configuration loader for the tagshift CLI.
//!
//! `defaults/tagshift.default.toml` is embedded into the binary. A user file
//! and command-line overrides are layered on top via [`Loader`] before
//! deserializing into [`TagshiftConfig`].

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use serde::Deserialize;
use std::path::Path;
use tagshift_codegen::Settings;
use tagshift_parser::Limits;
use tagshift_rules::{NamedRule, RuleSet};

const DEFAULT_TOML: &str = include_str!("../defaults/tagshift.default.toml");

#[derive(Debug, Clone, Deserialize)]
pub struct TagshiftConfig {
    pub output: Settings,
    pub limits: Limits,
    #[serde(default)]
    pub rules: Vec<NamedRule>,
}

impl TagshiftConfig {
    pub fn rule_set(&self) -> RuleSet {
        self.rules.iter().cloned().collect()
    }
}

/// Layers user overrides over the built-in defaults.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    /// Start a loader seeded with the embedded defaults.
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Layer a configuration file. A missing file is an error.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(true);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Apply a single key/value override (e.g. `output.indent`).
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    pub fn build(self) -> Result<TagshiftConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}
