//! Application configuration management.
//!
//! Settings are layered with `figment`, lowest priority first:
//!
//! 1. Built-in defaults
//! 2. TOML file (`--config PATH`, or the platform config directory)
//! 3. Environment variables prefixed with `DUPRESOLVE_` (`__` for nesting,
//!    e.g. `DUPRESOLVE_DELETE__PERMANENT=true`)
//! 4. Command-line flags, applied by the caller
//!
//! ```toml
//! [rules]
//! keep_patterns = ["print|phone|sdcard|rsync|iphoto"]
//! delete_patterns = ["^Unsorted"]
//! case_sensitive = false
//!
//! [report]
//! section = "DUPlicate files"
//!
//! [delete]
//! permanent = false
//! ```

use std::io;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cli::Cli;
use crate::duplicates::report::DUPLICATE_SECTION;
use crate::duplicates::rules::{DEFAULT_DELETE_PATTERN, DEFAULT_KEEP_PATTERN};

/// Prefix for environment overrides.
pub const ENV_PREFIX: &str = "DUPRESOLVE_";

/// Fatal configuration and I/O setup errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Neither input source was given.
    #[error("no input specified (use --report or --actions)")]
    NoInput,

    /// Both input sources were given.
    #[error("expected exactly one input option (--report or --actions)")]
    ConflictingInputs,

    /// A rule pattern is not a valid regular expression.
    #[error("invalid rule pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// The configuration could not be loaded or extracted.
    #[error("failed to load configuration: {0}")]
    Load(#[from] Box<figment::Error>),

    /// The input could not be read.
    #[error("failed to read {path}: {source}")]
    InputRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The output could not be written.
    #[error("failed to write {path}: {source}")]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Parameters of the suggestion rule chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    /// Paths matching any of these are kept.
    pub keep_patterns: Vec<String>,
    /// Paths matching any of these are deleted.
    pub delete_patterns: Vec<String>,
    /// Match patterns case-sensitively.
    pub case_sensitive: bool,
    /// Enable the directory specificity rule.
    pub specificity: bool,
    /// Enable the single-unknown rule.
    pub single: bool,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            keep_patterns: vec![DEFAULT_KEEP_PATTERN.to_string()],
            delete_patterns: vec![DEFAULT_DELETE_PATTERN.to_string()],
            case_sensitive: false,
            specificity: true,
            single: true,
        }
    }
}

/// Report reading settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Label of the section that lists duplicates.
    pub section: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            section: DUPLICATE_SECTION.to_string(),
        }
    }
}

/// Delete behaviour.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeleteConfig {
    /// Remove files permanently instead of moving them to the trash.
    pub permanent: bool,
}

/// Application configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Suggestion rules.
    pub rules: RulesConfig,
    /// Report reading.
    pub report: ReportConfig,
    /// Deletion.
    pub delete: DeleteConfig,
}

impl Config {
    /// Load the layered configuration.
    ///
    /// `path` overrides the platform default file. A missing default file is
    /// skipped; a missing explicit file is an error.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or a value has the
    /// wrong type.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut figment = Self::figment();

        match path {
            Some(path) => {
                if !path.is_file() {
                    return Err(ConfigError::InputRead {
                        path: path.to_path_buf(),
                        source: io::Error::new(io::ErrorKind::NotFound, "config file not found"),
                    });
                }
                figment = figment.merge(Toml::file(path));
            }
            None => {
                if let Some(default) = Self::config_path() {
                    log::debug!("Looking for config at {}", default.display());
                    figment = figment.merge(Toml::file(default));
                }
            }
        }

        figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .map_err(|e| ConfigError::Load(Box::new(e)))
    }

    /// Apply command-line overrides on top of the loaded layers.
    ///
    /// Patterns given on the command line are appended to the configured ones.
    pub fn apply_cli(&mut self, cli: &Cli) {
        self.rules
            .keep_patterns
            .extend(cli.keep_patterns.iter().cloned());
        self.rules
            .delete_patterns
            .extend(cli.delete_patterns.iter().cloned());
        if cli.case_sensitive {
            self.rules.case_sensitive = true;
        }
        if cli.permanent {
            self.delete.permanent = true;
        }
    }

    /// Defaults only, as a figment for further layering.
    #[must_use]
    pub fn figment() -> Figment {
        Figment::from(Serialized::defaults(Self::default()))
    }

    /// Default platform-specific configuration path.
    #[must_use]
    pub fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "dupresolve", "dupresolve")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }
}
