//! A single tracked device and its observable state

use std::cmp::Ordering;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::sync::{PoisonError, RwLock};

use dscreen_core::DeviceKind;
use serde::Serialize;

/// One physical or virtual device known to the registry.
///
/// Identity (`name`, `kind`, `serial_number`) is fixed at creation. The
/// connection state is written by the device monitor; the visibility flag
/// is written only by [`DeviceRegistry`](crate::DeviceRegistry).
#[derive(Debug)]
pub struct DeviceRecord {
    name: String,
    kind: DeviceKind,
    serial_number: String,
    connection_state: RwLock<String>,
    visible: AtomicBool,
}

impl DeviceRecord {
    /// Create a hidden record, deriving the kind from the serial number
    pub fn new(
        name: impl Into<String>,
        serial_number: impl Into<String>,
        connection_state: impl Into<String>,
    ) -> Self {
        let serial_number = serial_number.into();
        let kind = DeviceKind::from_serial(&serial_number);
        Self::with_kind(name, kind, serial_number, connection_state)
    }

    /// Create a hidden record with an explicit kind
    pub fn with_kind(
        name: impl Into<String>,
        kind: DeviceKind,
        serial_number: impl Into<String>,
        connection_state: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            serial_number: serial_number.into(),
            connection_state: RwLock::new(connection_state.into()),
            visible: AtomicBool::new(false),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> DeviceKind {
        self.kind
    }

    pub fn is_emulator(&self) -> bool {
        self.kind.is_emulator()
    }

    pub fn serial_number(&self) -> &str {
        &self.serial_number
    }

    pub fn connection_state(&self) -> String {
        self.connection_state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Update the connection state reported by adb.
    ///
    /// Returns `true` if the value changed. Observers are not notified;
    /// call [`DeviceRegistry::refresh`](crate::DeviceRegistry::refresh) afterwards.
    pub fn set_connection_state(&self, state: impl Into<String>) -> bool {
        let state = state.into();
        let mut current = self
            .connection_state
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if *current == state {
            return false;
        }
        *current = state;
        true
    }

    /// Whether the device's mirroring window is shown
    pub fn is_visible(&self) -> bool {
        self.visible.load(AtomicOrdering::Acquire)
    }

    pub(crate) fn mark_visible(&self, visible: bool) {
        self.visible.store(visible, AtomicOrdering::Release);
    }

    /// Registry sort order: name, then serial number, then kind
    pub fn sort_cmp(&self, other: &Self) -> Ordering {
        self.name
            .cmp(&other.name)
            .then_with(|| self.serial_number.cmp(&other.serial_number))
            .then_with(|| self.kind.cmp(&other.kind))
    }

    /// Copy of the record's current state
    pub fn snapshot(&self) -> DeviceRow {
        DeviceRow {
            name: self.name.clone(),
            kind: self.kind,
            serial_number: self.serial_number.clone(),
            connection_state: self.connection_state(),
            visible: self.is_visible(),
        }
    }
}

/// Point-in-time copy of a [`DeviceRecord`] handed to readers
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceRow {
    pub name: String,
    pub kind: DeviceKind,
    pub serial_number: String,
    pub connection_state: String,
    pub visible: bool,
}
