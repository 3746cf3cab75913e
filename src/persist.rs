//! Persistence: encode/decode configurations and read/write them from disk.
//!
//! The file's top-level keys are group ids and each group maps setting names
//! to scalars. YAML is the default format; JSON and TOML are picked by
//! extension.

use crate::error::PersistenceError;
use crate::store::{Configuration, Settings};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::info;

/// Supported file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    #[default]
    Yaml,
    Json,
    Toml,
}

impl Format {
    /// Pick the format from the path's extension; unknown extensions are YAML.
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .as_deref()
        {
            Some("json") => Format::Json,
            Some("toml") => Format::Toml,
            _ => Format::Yaml,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Format::Yaml => "yaml",
            Format::Json => "json",
            Format::Toml => "toml",
        }
    }
}

/// Serialize `config` to text.
///
/// TOML has no null, so null settings are left out; loading restores them
/// from the declared defaults.
pub fn encode(config: &Configuration, format: Format) -> Result<String, PersistenceError> {
    if config.is_empty() {
        return Err(PersistenceError::NothingToSave);
    }
    let text = match format {
        Format::Yaml => serde_yaml::to_string(config)?,
        Format::Json => {
            reject_non_finite(config, format)?;
            serde_json::to_string_pretty(config)?
        }
        Format::Toml => {
            let without_nulls: BTreeMap<&String, BTreeMap<&String, &crate::Value>> = config
                .groups()
                .map(|(group, settings)| {
                    let kept = settings.iter().filter(|(_, value)| !value.is_null()).collect();
                    (group, kept)
                })
                .collect();
            toml::to_string_pretty(&without_nulls)?
        }
    };
    Ok(text)
}

// serde_json writes inf and NaN as null, which would load back as the default.
fn reject_non_finite(config: &Configuration, format: Format) -> Result<(), PersistenceError> {
    for (group, settings) in config.groups() {
        for (name, value) in settings {
            if let Some(x) = value.as_f64().filter(|x| !x.is_finite()) {
                return Err(PersistenceError::NonFiniteFloat {
                    group: group.clone(),
                    name: name.clone(),
                    value: x,
                    format: format.as_str(),
                });
            }
        }
    }
    Ok(())
}

/// Parse text into a configuration.
pub fn decode(text: &str, format: Format) -> Result<Configuration, PersistenceError> {
    let groups: BTreeMap<String, Option<Settings>> = match format {
        Format::Yaml => serde_yaml::from_str(text)?,
        Format::Json => serde_json::from_str(text)?,
        Format::Toml => toml::from_str(text)?,
    };
    // An empty group is written by YAML as a bare key.
    let groups: BTreeMap<String, Settings> = groups
        .into_iter()
        .map(|(group, settings)| (group, settings.unwrap_or_default()))
        .collect();
    Ok(groups.into())
}

/// Write `config` to `path` in the format its extension implies.
pub fn save(config: &Configuration, path: &Path) -> Result<(), PersistenceError> {
    save_as(config, path, Format::from_path(path))
}

pub fn save_as(config: &Configuration, path: &Path, format: Format) -> Result<(), PersistenceError> {
    // Encode first so an empty or unencodable configuration never touches the file.
    let text = encode(config, format)?;
    std::fs::write(path, text).map_err(|source| PersistenceError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), format = format.as_str(), "Saved configuration");
    Ok(())
}

/// Read the configuration stored at `path`.
pub fn load(path: &Path) -> Result<Configuration, PersistenceError> {
    let format = Format::from_path(path);
    let text = std::fs::read_to_string(path).map_err(|source| PersistenceError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let config = decode(&text, format)?;
    info!(path = %path.display(), format = format.as_str(), "Loaded configuration");
    Ok(config)
}
