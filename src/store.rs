//! Configuration store: default snapshot, live overrides, merge and diff.

use crate::error::{DeclarationError, UpdateError};
use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Settings of one group, keyed by setting name.
pub type Settings = BTreeMap<String, Value>;

/// Group id → settings.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Configuration(BTreeMap<String, Settings>);

impl Configuration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn group(&self, id: &str) -> Option<&Settings> {
        self.0.get(id)
    }

    pub fn get(&self, group: &str, name: &str) -> Option<&Value> {
        self.0.get(group).and_then(|settings| settings.get(name))
    }

    /// Look a setting up by bare name in whichever group holds it.
    pub fn lookup(&self, name: &str) -> Option<&Value> {
        self.0.values().find_map(|settings| settings.get(name))
    }

    pub fn groups(&self) -> impl Iterator<Item = (&String, &Settings)> {
        self.0.iter()
    }

    pub fn contains_setting(&self, name: &str) -> bool {
        self.0.values().any(|settings| settings.contains_key(name))
    }

    /// Merge every group into one name → value mapping. Later groups win on
    /// repeated names.
    pub fn flatten(&self) -> BTreeMap<String, Value> {
        self.0
            .values()
            .flat_map(|settings| settings.iter())
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect()
    }

    pub fn insert(&mut self, group: &str, name: &str, value: Value) {
        self.0
            .entry(group.to_string())
            .or_default()
            .insert(name.to_string(), value);
    }

    /// Write non-null overrides onto every group holding the key.
    fn apply(&mut self, overrides: &BTreeMap<String, Value>) {
        for settings in self.0.values_mut() {
            for (key, value) in overrides {
                if value.is_null() {
                    continue;
                }
                if let Some(slot) = settings.get_mut(key) {
                    *slot = value.clone();
                }
            }
        }
    }
}

impl From<BTreeMap<String, Settings>> for Configuration {
    fn from(groups: BTreeMap<String, Settings>) -> Self {
        Self(groups)
    }
}

impl From<Configuration> for BTreeMap<String, Settings> {
    fn from(config: Configuration) -> Self {
        config.0
    }
}

/// One setting whose live value differs from its default.
#[derive(Debug, Clone, PartialEq)]
pub struct SettingChange {
    pub group: String,
    pub name: String,
    pub default: Value,
    pub current: Value,
}

#[derive(Debug, Clone, PartialEq)]
enum StoreState {
    /// No override applied yet; reads fall back to the defaults.
    Unparsed,
    /// Live configuration, same shape as the defaults.
    Parsed(Configuration),
}

/// Owns the default configuration and the live one.
#[derive(Debug, Clone)]
pub struct ConfigurationStore {
    defaults: Configuration,
    state: StoreState,
}

impl Default for ConfigurationStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigurationStore {
    pub fn new() -> Self {
        Self {
            defaults: Configuration::new(),
            state: StoreState::Unparsed,
        }
    }

    pub fn is_parsed(&self) -> bool {
        matches!(self.state, StoreState::Parsed(_))
    }

    /// Record a declared default. Last write wins for a repeated name.
    pub fn add_default(&mut self, group: &str, name: &str, value: Value) -> Result<(), DeclarationError> {
        if self.is_parsed() {
            return Err(DeclarationError::Frozen(name.to_string()));
        }
        self.defaults.insert(group, name, value);
        Ok(())
    }

    pub fn get_default(&self) -> Configuration {
        self.defaults.clone()
    }

    /// The authoritative configuration, without copying.
    pub fn current(&self) -> &Configuration {
        match &self.state {
            StoreState::Unparsed => &self.defaults,
            StoreState::Parsed(current) => current,
        }
    }

    pub fn get(&self) -> Configuration {
        self.current().clone()
    }

    pub fn reset(&mut self) {
        debug!("Configuration reset to defaults");
        self.state = StoreState::Unparsed;
    }

    /// Apply overrides keyed by bare setting name.
    ///
    /// Null values keep the existing value. Keys matching no declared setting
    /// fail the whole call before anything is written.
    pub fn update<I, K>(&mut self, overrides: I) -> Result<(), UpdateError>
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        let overrides = collect_overrides(overrides);
        self.validate(&overrides)?;
        self.apply(&overrides);
        Ok(())
    }

    /// Reset to defaults, then apply `overrides`. On failure the store is
    /// left exactly as it was.
    pub fn replace<I, K>(&mut self, overrides: I) -> Result<(), UpdateError>
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        let overrides = collect_overrides(overrides);
        self.validate(&overrides)?;
        self.reset();
        self.apply(&overrides);
        Ok(())
    }

    /// Settings whose live value differs from the default, in group order.
    pub fn diff(&self) -> Vec<SettingChange> {
        let current = self.current();
        let mut changes = Vec::new();
        for (group, settings) in self.defaults.groups() {
            for (name, default) in settings {
                let Some(live) = current.get(group, name) else {
                    continue;
                };
                if live != default {
                    changes.push(SettingChange {
                        group: group.clone(),
                        name: name.clone(),
                        default: default.clone(),
                        current: live.clone(),
                    });
                }
            }
        }
        changes
    }

    fn validate(&self, overrides: &BTreeMap<String, Value>) -> Result<(), UpdateError> {
        let unrecognized: BTreeSet<String> = overrides
            .keys()
            .filter(|key| !self.defaults.contains_setting(key))
            .cloned()
            .collect();
        if unrecognized.is_empty() {
            Ok(())
        } else {
            debug!(keys = ?unrecognized, "Rejected update with unrecognized options");
            Err(UpdateError::Unrecognized(unrecognized))
        }
    }

    fn apply(&mut self, overrides: &BTreeMap<String, Value>) {
        if let StoreState::Unparsed = self.state {
            self.state = StoreState::Parsed(self.defaults.clone());
        }
        if let StoreState::Parsed(current) = &mut self.state {
            current.apply(overrides);
        }
        debug!(count = overrides.len(), "Applied configuration overrides");
    }
}

fn collect_overrides<I, K>(overrides: I) -> BTreeMap<String, Value>
where
    I: IntoIterator<Item = (K, Value)>,
    K: Into<String>,
{
    overrides.into_iter().map(|(k, v)| (k.into(), v)).collect()
}
