//! Terminal rendering of configurations and diffs.

use crate::persist::{self, Format};
use crate::store::{Configuration, SettingChange};
use crate::error::PersistenceError;
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;

/// Render the settings that differ from their defaults as a table.
pub fn format_diff_table(changes: &[SettingChange]) -> String {
    if changes.is_empty() {
        return "All settings at their defaults.\n".to_string();
    }
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Group", "Setting", "Default", "Current"]);
    for change in changes {
        table.add_row(vec![
            change.group.clone(),
            change.name.clone(),
            change.default.to_string(),
            change.current.to_string(),
        ]);
    }
    format!("{}\n", table)
}

/// YAML rendering of a configuration, as it would be saved.
pub fn format_config_yaml(config: &Configuration) -> Result<String, PersistenceError> {
    persist::encode(config, Format::Yaml)
}
