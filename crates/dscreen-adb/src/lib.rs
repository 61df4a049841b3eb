//! # dscreen-adb - adb Device Discovery
//!
//! Runs the Android Debug Bridge to find connected devices and emulators.
//!
//! Depends on [`dscreen_core`] for domain types and error handling.
//!
//! ## Public API
//!
//! ### Device Discovery
//! - [`AdbDevice`] - A device row from `adb devices -l`
//! - [`discover_devices()`] - List connected devices
//! - [`parse_devices_output()`] - Parse captured `adb devices -l` output
//!
//! ### Platform Utilities
//! - [`ToolAvailability`] - Locate a working `adb` binary

pub mod devices;
#[cfg(any(test, feature = "test-helpers"))]
pub mod test_utils;
pub mod tool_availability;

// Public API re-exports
pub use devices::{
    discover_devices, discover_devices_with_timeout, parse_devices_output, AdbDevice,
    DeviceDiscoveryResult, DEVICES_TIMEOUT,
};
pub use tool_availability::ToolAvailability;
