//! Config command implementation.

use crate::cli::ConfigAction;
use crate::config::Settings;
use anyhow::Result;
use std::path::PathBuf;

/// Run the config command. `explicit` is the `--config` path, if any.
pub fn run_config(action: &ConfigAction, settings: &Settings, explicit: Option<&PathBuf>) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let toml_str = toml::to_string_pretty(settings)
                .map_err(|e| anyhow::anyhow!("Failed to serialize config: {}", e))?;
            println!("{}", toml_str);
        }

        ConfigAction::Path => {
            let config_path = explicit.cloned().unwrap_or_else(Settings::default_config_path);
            println!("{}", config_path.display());
        }
    }

    Ok(())
}
