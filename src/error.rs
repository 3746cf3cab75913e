//! Error types for argconf.
//!
//! Errors are split by the phase that raises them so callers can tell a
//! broken declaration (fix the call site) from bad runtime input (report and
//! retry).

use std::collections::BTreeSet;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while declaring groups and settings.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DeclarationError {
    #[error("Duplicate group: {0}")]
    DuplicateGroup(String),

    #[error("Missing default value for setting: {0}")]
    MissingDefault(String),

    #[error("Cannot resolve setting name from {0:?}; pair the short flag with a long flag or set a destination name")]
    CannotResolveName(Vec<String>),

    #[error("No name source: provide an identifier or a destination name")]
    NoNameSource,

    #[error("Invalid identifier(s): {0:?}")]
    InvalidIdentifier(Vec<String>),

    #[error("Setting '{name}' already declared in group '{group}'")]
    DuplicateSetting { name: String, group: String },

    #[error("Flag '{flag}' already used by setting '{owner}'")]
    DuplicateFlag { flag: String, owner: String },

    #[error("Reserved name: {0}")]
    ReservedName(String),

    #[error("Cannot coerce default {value} of setting '{name}' to {target}")]
    Coercion {
        name: String,
        value: String,
        target: String,
    },

    #[error("Configuration already materialized; reset before declaring '{0}'")]
    Frozen(String),

    #[error("Unknown group: {0}")]
    UnknownGroup(String),
}

/// Errors raised while applying overrides.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum UpdateError {
    #[error("Some configuration options are not recognized: {}", join_keys(.0))]
    Unrecognized(BTreeSet<String>),
}

impl UpdateError {
    /// Keys that matched no declared setting.
    pub fn unrecognized(&self) -> &BTreeSet<String> {
        match self {
            UpdateError::Unrecognized(keys) => keys,
        }
    }
}

fn join_keys(keys: &BTreeSet<String>) -> String {
    keys.iter().cloned().collect::<Vec<_>>().join(", ")
}

/// Errors raised while saving or loading configuration files.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("Nothing to save. Add some values to the config.")]
    NothingToSave,

    #[error("Setting '{name}' in group '{group}' holds {value}, which {format} cannot represent")]
    NonFiniteFloat {
        group: String,
        name: String,
        value: f64,
        format: &'static str,
    },

    #[error("Config file I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("YAML codec error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON codec error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML encode error: {0}")]
    TomlEncode(#[from] toml::ser::Error),

    #[error("TOML decode error: {0}")]
    TomlDecode(#[from] toml::de::Error),
}

/// Coarse error category, for callers that only need to branch on phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Declaration,
    Update,
    Persistence,
    Cli,
    Logging,
}

/// Top-level error returned by [`crate::ConfigParser`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Declaration error: {0}")]
    Declaration(#[from] DeclarationError),

    #[error("Update error: {0}")]
    Update(#[from] UpdateError),

    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),

    #[error("{0}")]
    Cli(#[from] clap::Error),

    #[error("Parsed value lookup failed: {0}")]
    Matches(#[from] clap::parser::MatchesError),

    #[error("Logging error: {0}")]
    Logging(String),
}

impl ConfigError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ConfigError::Declaration(_) => ErrorKind::Declaration,
            ConfigError::Update(_) => ErrorKind::Update,
            ConfigError::Persistence(_) => ErrorKind::Persistence,
            ConfigError::Cli(_) | ConfigError::Matches(_) => ErrorKind::Cli,
            ConfigError::Logging(_) => ErrorKind::Logging,
        }
    }
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::Logging(err.to_string())
    }
}
