//! Configuration types for droid-screen
//!
//! Defines:
//! - `Settings` - Global application settings
//! - `AdbSettings`, `MonitorSettings` - Sub-sections

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::labels::DEFAULT_LANGUAGE;

/// Application settings (.droid-screen/config.toml)
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Settings {
    /// Language for the device table headers
    #[serde(default = "default_language")]
    pub language: String,

    #[serde(default)]
    pub adb: AdbSettings,

    #[serde(default)]
    pub monitor: MonitorSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            language: default_language(),
            adb: AdbSettings::default(),
            monitor: MonitorSettings::default(),
        }
    }
}

fn default_language() -> String {
    DEFAULT_LANGUAGE.to_string()
}

/// adb settings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AdbSettings {
    /// adb command or absolute path
    #[serde(default = "default_adb_path")]
    pub path: String,

    /// Timeout for a single `adb devices` call
    #[serde(default = "default_adb_timeout")]
    pub timeout_secs: u64,
}

impl Default for AdbSettings {
    fn default() -> Self {
        Self {
            path: default_adb_path(),
            timeout_secs: default_adb_timeout(),
        }
    }
}

impl AdbSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

fn default_adb_path() -> String {
    "adb".to_string()
}

fn default_adb_timeout() -> u64 {
    10
}

/// Device monitor settings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct MonitorSettings {
    /// Delay between device polls
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,

    /// Show newly connected devices immediately
    #[serde(default)]
    pub show_on_connect: bool,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval(),
            show_on_connect: false,
        }
    }
}

impl MonitorSettings {
    /// Poll interval, clamped to at least 100ms
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(100))
    }
}

fn default_poll_interval() -> u64 {
    2000
}
