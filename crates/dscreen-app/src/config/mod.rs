//! Configuration file parsing for droid-screen
//!
//! Supports:
//! - `.droid-screen/config.toml` - Per-directory settings
//! - `<config_dir>/droid-screen/config.toml` - User settings

pub mod settings;
pub mod types;

pub use settings::{
    init_config_dir, load_settings, load_settings_file, save_settings, user_config_path,
};
pub use types::*;
