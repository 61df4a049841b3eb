//! Test utilities for adb types
//!
//! Provides helper functions for creating test AdbDevice objects.

use super::AdbDevice;

/// Creates an online test device with a model name.
///
/// # Arguments
/// * `serial` - adb serial number (`emulator-` prefix makes an emulator)
/// * `model` - Model as adb reports it (underscores for spaces)
pub fn test_adb_device(serial: &str, model: &str) -> AdbDevice {
    test_adb_device_with_state(serial, model, "device")
}

/// Creates a test device with an explicit connection state.
pub fn test_adb_device_with_state(serial: &str, model: &str, state: &str) -> AdbDevice {
    AdbDevice {
        serial: serial.to_string(),
        state: state.to_string(),
        model: Some(model.to_string()),
    }
}
