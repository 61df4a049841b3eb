//! Locating the `adb` binary
//!
//! The configured command is tried first, then the copies shipped in the
//! Android SDK's `platform-tools` directory.

use std::process::Stdio;
use tokio::process::Command;

/// Cached availability of the adb tool
#[derive(Debug, Clone, Default)]
pub struct ToolAvailability {
    /// Whether a working `adb` was found
    pub adb: bool,

    /// Path to the adb command if found
    pub adb_path: Option<String>,
}

impl ToolAvailability {
    /// Check tool availability (run once at startup)
    pub async fn check(configured: &str) -> Self {
        for path in Self::get_adb_paths(configured) {
            if Command::new(&path)
                .arg("version")
                .stdin(Stdio::null())
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .status()
                .await
                .map(|s| s.success())
                .inspect_err(|e| tracing::debug!("adb check failed for {}: {}", path, e))
                .unwrap_or(false)
            {
                tracing::info!("Using adb at {}", path);
                return Self {
                    adb: true,
                    adb_path: Some(path),
                };
            }
        }

        Self::default()
    }

    /// Get list of paths to try for the adb command
    fn get_adb_paths(configured: &str) -> Vec<String> {
        let mut paths = Vec::new();

        // Resolve bare command names against PATH
        match which::which(configured) {
            Ok(resolved) => paths.push(resolved.to_string_lossy().to_string()),
            Err(_) => paths.push(configured.to_string()),
        }

        for var in ["ANDROID_HOME", "ANDROID_SDK_ROOT"] {
            if let Ok(sdk) = std::env::var(var) {
                let candidate = format!("{}/platform-tools/adb", sdk);
                if !paths.contains(&candidate) {
                    paths.push(candidate);
                }
            }
        }

        paths
    }

    /// The adb command to run, falling back to the configured one
    pub fn adb_command<'a>(&'a self, configured: &'a str) -> &'a str {
        self.adb_path.as_deref().unwrap_or(configured)
    }

    /// Get user-friendly message for unavailable Android tools
    pub fn adb_unavailable_message(&self) -> Option<&'static str> {
        if self.adb {
            None
        } else {
            Some("adb not found. Install Android platform-tools or set ANDROID_HOME.")
        }
    }
}
