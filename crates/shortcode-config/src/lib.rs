//! Configuration loading for the shortcode engine.
//!
//! Parses `shortcode.toml` files with serde and discovers them in the
//! current directory or its parents.
//!
//! ```toml
//! [parser]
//! unclosed_tags = "standalone"   # or "literal" (default)
//! escapes = true
//!
//! [directory]
//! active = "${SHORTCODE_ACTIVE:-default}"
//! instances = ["default", "emails"]
//! ```
//!
//! ## Environment Variable Expansion
//!
//! Strings in `[directory]` support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default

mod expand;

use serde::Deserialize;
use shortcode::{DEFAULT_IDENTIFIER, ParserDirectory, ParserOptions};
use std::path::{Path, PathBuf};

/// Configuration filename to search for.
pub const CONFIG_FILENAME: &str = "shortcode.toml";

/// Shortcode engine configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Parser behavior for every instance.
    pub parser: ParserOptions,
    /// Named instances and the active identifier.
    pub directory: DirectoryConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// `[directory]` section.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DirectoryConfig {
    /// Identifier resolved by `get_active`.
    pub active: String,
    /// Instances to create up front.
    pub instances: Vec<String>,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            active: DEFAULT_IDENTIFIER.to_owned(),
            instances: Vec::new(),
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`directory.active`").
        field: String,
        /// Error message (e.g., "${`SHORTCODE_ACTIVE`} not set").
        message: String,
    },
}

impl Config {
    /// Load configuration.
    ///
    /// If `config_path` is provided, loads from that file. Otherwise searches
    /// for `shortcode.toml` in the current directory and its parents, and
    /// falls back to defaults when none is found.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, or if reading,
    /// parsing, expansion or validation fails.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            return Self::load_from_file(path);
        }

        let discovered = std::env::current_dir()
            .ok()
            .and_then(|cwd| discover_config(&cwd));
        match discovered {
            Some(path) => Self::load_from_file(&path),
            None => {
                tracing::debug!("No {CONFIG_FILENAME} found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Load configuration from a specific file.
    ///
    /// # Errors
    ///
    /// Returns error if reading, parsing, expansion or validation fails.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config = Self::from_toml(&content)?;
        config.config_path = Some(path.to_path_buf());

        tracing::debug!(path = %path.display(), "Loaded shortcode configuration");
        Ok(config)
    }

    /// Parse configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns error if parsing, expansion or validation fails.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let mut config: Self = toml::from_str(content)?;
        config.expand_env_vars()?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Called automatically after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.directory.active.trim().is_empty() {
            return Err(ConfigError::Validation(
                "directory.active cannot be blank".to_owned(),
            ));
        }

        for (i, identifier) in self.directory.instances.iter().enumerate() {
            if identifier.is_empty() {
                return Err(ConfigError::Validation(format!(
                    "directory.instances[{i}] cannot be empty"
                )));
            }
        }

        Ok(())
    }

    /// Parser options for every instance.
    #[must_use]
    pub fn parser_options(&self) -> ParserOptions {
        self.parser
    }

    /// Build a directory with the configured options, pre-created
    /// instances and active identifier.
    ///
    /// # Panics
    ///
    /// Panics if the directory's internal locks are poisoned.
    #[must_use]
    pub fn build_directory(&self) -> ParserDirectory {
        let directory = ParserDirectory::with_options(self.parser);
        for identifier in &self.directory.instances {
            let _ = directory.get(identifier);
        }
        directory.set_active(self.directory.active.as_str());
        directory
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        expand::expand_in_place(&mut self.directory.active, "directory.active")?;

        for (i, identifier) in self.directory.instances.iter_mut().enumerate() {
            expand::expand_in_place(identifier, &format!("directory.instances[{i}]"))?;
        }

        Ok(())
    }
}

/// Search for the config file in `start` and its parents.
fn discover_config(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(CONFIG_FILENAME))
        .find(|candidate| candidate.exists())
}
