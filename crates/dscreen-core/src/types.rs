//! Domain types shared across droid-screen crates

use serde::{Deserialize, Serialize};
use std::fmt;

/// Serial prefix adb assigns to emulator instances (`emulator-5554`)
pub const EMULATOR_SERIAL_PREFIX: &str = "emulator-";

/// Whether a tracked device is a physical handset or an emulator
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceKind {
    Emulator,
    Device,
}

impl DeviceKind {
    /// Derive the kind from an adb serial number
    pub fn from_serial(serial: &str) -> Self {
        if serial.starts_with(EMULATOR_SERIAL_PREFIX) {
            DeviceKind::Emulator
        } else {
            DeviceKind::Device
        }
    }

    /// Short code shown in the device table
    pub fn code(&self) -> &'static str {
        match self {
            DeviceKind::Emulator => "EMU",
            DeviceKind::Device => "DEV",
        }
    }

    /// Label key for the kind's full name
    pub fn label_key(&self) -> &'static str {
        match self {
            DeviceKind::Emulator => "emulator",
            DeviceKind::Device => "device",
        }
    }

    pub fn is_emulator(&self) -> bool {
        matches!(self, DeviceKind::Emulator)
    }
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
