//! Settings parser for .droid-screen/config.toml

use super::types::Settings;
use dscreen_core::prelude::*;
use std::path::{Path, PathBuf};

const CONFIG_FILENAME: &str = "config.toml";
const CONFIG_DIR: &str = ".droid-screen";
const APP_DIR: &str = "droid-screen";

/// Path of the per-user config file, if the platform has a config directory
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILENAME))
}

/// Load settings for `base_path`.
///
/// `.droid-screen/config.toml` under `base_path` wins over the per-user
/// file. Missing or invalid files fall back to defaults.
pub fn load_settings(base_path: &Path) -> Settings {
    let local_path = base_path.join(CONFIG_DIR).join(CONFIG_FILENAME);
    if let Some(settings) = load_settings_file(&local_path) {
        return settings;
    }

    if let Some(settings) = user_config_path().and_then(|path| load_settings_file(&path)) {
        return settings;
    }

    debug!("No usable config file, using defaults");
    Settings::default()
}

/// Load one settings file, returning `None` if it is missing or invalid
pub fn load_settings_file(config_path: &Path) -> Option<Settings> {
    if !config_path.exists() {
        debug!("No config file at {:?}", config_path);
        return None;
    }

    match std::fs::read_to_string(config_path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(settings) => {
                debug!("Loaded settings from {:?}", config_path);
                Some(settings)
            }
            Err(e) => {
                warn!("Failed to parse {:?}: {}", config_path, e);
                None
            }
        },
        Err(e) => {
            warn!("Failed to read {:?}: {}", config_path, e);
            None
        }
    }
}

/// Create `.droid-screen/config.toml` with default content if missing
pub fn init_config_dir(base_path: &Path) -> Result<()> {
    let config_dir = base_path.join(CONFIG_DIR);

    if !config_dir.exists() {
        std::fs::create_dir_all(&config_dir)
            .map_err(|e| Error::config(format!("Failed to create {} dir: {}", CONFIG_DIR, e)))?;
    }

    let config_path = config_dir.join(CONFIG_FILENAME);
    if !config_path.exists() {
        let default_content = r#"# droid-screen Configuration

# Language for the device table: english, swedish, german
language = "english"

[adb]
path = "adb"
timeout_secs = 10

[monitor]
poll_interval_ms = 2000
show_on_connect = false
"#;
        std::fs::write(&config_path, default_content)
            .map_err(|e| Error::config(format!("Failed to write config.toml: {}", e)))?;
        info!("Created default config at {:?}", config_path);
    }

    Ok(())
}

/// Save settings to .droid-screen/config.toml under `base_path`
pub fn save_settings(base_path: &Path, settings: &Settings) -> Result<()> {
    let config_dir = base_path.join(CONFIG_DIR);

    if !config_dir.exists() {
        std::fs::create_dir_all(&config_dir)
            .map_err(|e| Error::config(format!("Failed to create {} dir: {}", CONFIG_DIR, e)))?;
    }

    let config_path = config_dir.join(CONFIG_FILENAME);
    let temp_path = config_dir.join(".config.toml.tmp");

    let content = toml::to_string_pretty(settings)
        .map_err(|e| Error::config(format!("Failed to serialize settings: {}", e)))?;
    let full_content = format!("# droid-screen Configuration\n\n{}", content);

    // Atomic write: write to temp, then rename
    std::fs::write(&temp_path, &full_content)
        .map_err(|e| Error::config(format!("Failed to write temp file: {}", e)))?;

    std::fs::rename(&temp_path, &config_path)
        .map_err(|e| Error::config(format!("Failed to rename temp file: {}", e)))?;

    info!("Saved settings to {:?}", config_path);
    Ok(())
}
