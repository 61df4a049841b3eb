//! Headless mode - JSON event output
//!
//! The `dscreen` binary has no UI of its own. It prints structured JSON
//! events to stdout so that scripts (or a separate UI process) can follow
//! the device table.
//!
//! # Event Format
//!
//! Events are output as NDJSON (newline-delimited JSON), one event per line.
//! Each event has an "event" field indicating its type, along with event-specific data.
//!
//! # Example Output
//!
//! ```json
//! {"event":"device_added","name":"Pixel 7","serial":"R58M123ABC","kind":"device","state":"device","timestamp":1704700001000}
//! {"event":"table_reset","rows":1,"timestamp":1704700001001}
//! {"event":"session_started","device":"Pixel 7","serial":"R58M123ABC","timestamp":1704700002000}
//! {"event":"cell_updated","row":0,"column":"visible","value":true,"timestamp":1704700002001}
//! ```

pub mod runner;
pub mod table;

use chrono::Utc;
use dscreen_app::{CellValue, Column, DeviceRow};
use dscreen_core::DeviceKind;
use serde::Serialize;
use std::io::{self, Write};
use tracing::error;

pub use runner::{run_headless, HeadlessOptions};
pub use table::render_table;

/// Events emitted in headless mode
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum HeadlessEvent {
    /// Device appeared in the registry
    DeviceAdded {
        name: String,
        serial: String,
        kind: DeviceKind,
        state: String,
        timestamp: i64,
    },

    /// Device left the registry
    DeviceRemoved {
        name: String,
        serial: String,
        timestamp: i64,
    },

    /// Registry membership/order changed
    TableReset { rows: usize, timestamp: i64 },

    /// A single cell changed
    CellUpdated {
        row: usize,
        column: Column,
        value: CellValue,
        timestamp: i64,
    },

    /// Mirroring session started for a device
    SessionStarted {
        device: String,
        serial: String,
        timestamp: i64,
    },

    /// Mirroring session stopped for a device
    SessionStopped {
        device: String,
        serial: String,
        timestamp: i64,
    },

    /// Error occurred
    Error {
        message: String,
        fatal: bool,
        timestamp: i64,
    },
}

impl HeadlessEvent {
    /// Emit this event to stdout as JSON
    pub fn emit(&self) {
        let json = match serde_json::to_string(self) {
            Ok(json) => json,
            Err(e) => {
                error!("Failed to serialize headless event: {}", e);
                return;
            }
        };

        // Write to stdout with newline (NDJSON format)
        let mut stdout = io::stdout().lock();
        if let Err(e) = writeln!(stdout, "{}", json) {
            error!("Failed to write headless event to stdout: {}", e);
            return;
        }

        // Flush to ensure immediate output
        if let Err(e) = stdout.flush() {
            error!("Failed to flush headless stdout: {}", e);
        }
    }

    /// Get current timestamp in milliseconds
    fn now() -> i64 {
        Utc::now().timestamp_millis()
    }

    // ─────────────────────────────────────────────────────────
    // Convenience constructors
    // ─────────────────────────────────────────────────────────

    pub fn device_added(row: &DeviceRow) -> Self {
        Self::DeviceAdded {
            name: row.name.clone(),
            serial: row.serial_number.clone(),
            kind: row.kind,
            state: row.connection_state.clone(),
            timestamp: Self::now(),
        }
    }

    pub fn device_removed(row: &DeviceRow) -> Self {
        Self::DeviceRemoved {
            name: row.name.clone(),
            serial: row.serial_number.clone(),
            timestamp: Self::now(),
        }
    }

    pub fn table_reset(rows: usize) -> Self {
        Self::TableReset {
            rows,
            timestamp: Self::now(),
        }
    }

    pub fn cell_updated(row: usize, column: Column, value: CellValue) -> Self {
        Self::CellUpdated {
            row,
            column,
            value,
            timestamp: Self::now(),
        }
    }

    pub fn session_started(device: &str, serial: &str) -> Self {
        Self::SessionStarted {
            device: device.to_string(),
            serial: serial.to_string(),
            timestamp: Self::now(),
        }
    }

    pub fn session_stopped(device: &str, serial: &str) -> Self {
        Self::SessionStopped {
            device: device.to_string(),
            serial: serial.to_string(),
            timestamp: Self::now(),
        }
    }

    pub fn error(message: String, fatal: bool) -> Self {
        Self::Error {
            message,
            fatal,
            timestamp: Self::now(),
        }
    }
}
