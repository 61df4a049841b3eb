//! droid-screen Library
//!
//! Tracks connected Android devices and drives their screen-mirroring
//! sessions. The `dscreen` binary runs headless and reports the device
//! table as JSON events.

// Module declarations
pub mod headless;

use std::path::Path;

use dscreen_core::prelude::*;

// Re-export main entry points
pub use headless::{render_table, run_headless, HeadlessEvent, HeadlessOptions};

/// Install error reporting and logging, then run the headless monitor
pub async fn run(base_path: &Path, options: HeadlessOptions) -> Result<()> {
    color_eyre::install()
        .map_err(|e| Error::config(format!("Failed to install error reporting: {}", e)))?;

    // Initialize logging (to file, since stdout carries JSON events)
    dscreen_core::logging::init()?;

    run_headless(base_path, options).await
}
