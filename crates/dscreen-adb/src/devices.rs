//! Device discovery using the `adb devices -l` command

use dscreen_core::prelude::*;
use dscreen_core::DeviceKind;
use serde::Serialize;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;

/// Default timeout for adb devices command
pub const DEVICES_TIMEOUT: Duration = Duration::from_secs(10);

/// Header line printed by `adb devices`
const LIST_HEADER: &str = "List of devices attached";

/// A device as reported by `adb devices -l`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdbDevice {
    /// adb serial number (`emulator-5554`, `R58M123ABC`, `10.0.0.5:5555`)
    pub serial: String,

    /// Connection state (`device`, `offline`, `unauthorized`, `recovery`, ...)
    pub state: String,

    /// `model:` qualifier, only present for authorized devices
    pub model: Option<String>,
}

impl AdbDevice {
    /// Whether adb considers this device an emulator
    pub fn is_emulator(&self) -> bool {
        self.kind().is_emulator()
    }

    pub fn kind(&self) -> DeviceKind {
        DeviceKind::from_serial(&self.serial)
    }

    /// Human-readable name: the model with underscores spaced out, or the
    /// serial when adb does not report a model (e.g. unauthorized devices)
    pub fn display_name(&self) -> String {
        match self.model.as_deref() {
            Some(model) if !model.is_empty() => model.replace('_', " "),
            _ => self.serial.clone(),
        }
    }

    /// Whether the device is online and authorized
    pub fn is_online(&self) -> bool {
        self.state == "device"
    }
}

/// Result of device discovery
#[derive(Debug, Clone)]
pub struct DeviceDiscoveryResult {
    /// List of discovered devices
    pub devices: Vec<AdbDevice>,

    /// Any warning message from adb
    pub warning: Option<String>,

    /// Time taken to discover devices
    pub elapsed: Duration,
}

/// Discover connected devices using `adb devices -l`
pub async fn discover_devices(adb: &str) -> Result<DeviceDiscoveryResult> {
    discover_devices_with_timeout(adb, DEVICES_TIMEOUT).await
}

/// Discover devices with a custom timeout
pub async fn discover_devices_with_timeout(
    adb: &str,
    timeout_duration: Duration,
) -> Result<DeviceDiscoveryResult> {
    let start = std::time::Instant::now();

    debug!("Discovering adb devices with {}", adb);

    let output = timeout(timeout_duration, run_adb_devices(adb))
        .await
        .map_err(|_| Error::process("Device discovery timed out"))??;

    let elapsed = start.elapsed();
    let devices = parse_devices_output(&output.stdout);

    let warning = if output.stderr.is_empty() {
        None
    } else {
        Some(output.stderr.clone())
    };

    debug!("Discovered {} devices in {:?}", devices.len(), elapsed);

    Ok(DeviceDiscoveryResult {
        devices,
        warning,
        elapsed,
    })
}

/// Run adb devices command
async fn run_adb_devices(adb: &str) -> Result<AdbOutput> {
    let output = Command::new(adb)
        .args(["devices", "-l"])
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::AdbNotFound
            } else {
                Error::process(format!("Failed to run adb devices: {}", e))
            }
        })?;

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();

    trace!("adb devices stdout: {}", stdout);
    if !stderr.is_empty() {
        debug!("adb devices stderr: {}", stderr);
    }

    if !output.status.success() {
        return Err(Error::process(format!(
            "adb devices failed with exit code {:?}: {}",
            output.status.code(),
            stderr.trim()
        )));
    }

    Ok(AdbOutput { stdout, stderr })
}

struct AdbOutput {
    stdout: String,
    stderr: String,
}

/// Parse the output of `adb devices -l`
///
/// Lines that are not device rows (the header, `* daemon ...` notices,
/// blank lines) are skipped.
pub fn parse_devices_output(output: &str) -> Vec<AdbDevice> {
    output.lines().filter_map(parse_device_line).collect()
}

fn parse_device_line(line: &str) -> Option<AdbDevice> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('*') || line.starts_with(LIST_HEADER) {
        return None;
    }

    let mut tokens = line.split_whitespace();
    let serial = tokens.next()?;
    let state = tokens.next()?;

    // Other qualifiers (product:, device:, usb:, transport_id:) are ignored
    let model = tokens
        .filter_map(|token| token.split_once(':'))
        .find(|(key, _)| *key == "model")
        .map(|(_, value)| value.to_string());

    Some(AdbDevice {
        serial: serial.to_string(),
        state: state.to_string(),
        model,
    })
}
