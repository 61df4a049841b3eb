//! Screen-mirroring session lifecycle
//!
//! The registry drives sessions through [`SessionController`]: `start` when
//! a device becomes visible, `stop` when it is hidden or removed.

use std::collections::BTreeSet;
use std::sync::{Mutex, PoisonError};

use dscreen_core::prelude::*;

use crate::record::DeviceRecord;

/// Starts and stops a device's capture session.
///
/// Calls are synchronous from the registry's point of view. An `Err` means
/// the transition did not happen and the registry leaves the visibility
/// flag unchanged. `stop` is only called for a device whose session was
/// started.
#[cfg_attr(test, mockall::automock)]
pub trait SessionController: Send + Sync {
    fn start(&self, device: &DeviceRecord) -> Result<()>;

    fn stop(&self, device: &DeviceRecord) -> Result<()>;
}

/// Session controller that only tracks which devices are mirrored.
///
/// Used where no screen retrieval backend is wired in (headless mode, tests).
#[derive(Debug, Default)]
pub struct TracingSessions {
    active: Mutex<BTreeSet<String>>,
}

impl TracingSessions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serial numbers of devices with an active session, sorted
    pub fn active(&self) -> Vec<String> {
        self.active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .cloned()
            .collect()
    }

    pub fn is_active(&self, serial: &str) -> bool {
        self.active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(serial)
    }
}

impl SessionController for TracingSessions {
    fn start(&self, device: &DeviceRecord) -> Result<()> {
        let inserted = self
            .active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(device.serial_number().to_string());
        if !inserted {
            return Err(Error::session_start(
                device.name(),
                "session already running",
            ));
        }
        info!(
            "Session started for {} [{}]",
            device.name(),
            device.serial_number()
        );
        Ok(())
    }

    fn stop(&self, device: &DeviceRecord) -> Result<()> {
        let removed = self
            .active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(device.serial_number());
        if !removed {
            return Err(Error::session_stop(device.name(), "no session running"));
        }
        info!(
            "Session stopped for {} [{}]",
            device.name(),
            device.serial_number()
        );
        Ok(())
    }
}
