//! Sorted, thread-safe registry of known devices
//!
//! [`DeviceRegistry`] owns the device sequence. Every mutation (`add`,
//! `remove`, `remove_all`, `set_visible`) runs under one write guard.
//! Listeners are notified after that guard is released, so they may read
//! the registry, but the delivery lock taken before the mutation is held
//! until every listener has returned. No other mutation can land between a
//! change and its notification: a row index in an event still names the
//! device that changed, and events arrive in commit order.
//!
//! Visibility drives the session lifecycle: hidden→visible calls
//! [`SessionController::start`], visible→hidden calls
//! [`SessionController::stop`], and the flag is only committed once the
//! controller returns `Ok`. Removing a visible device stops its session
//! first.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use dscreen_core::prelude::*;
use tokio::sync::mpsc;

use crate::columns::{CellValue, Column, ColumnKind};
use crate::labels::{LabelLookup, LanguageTable};
use crate::notify::{ChangeListener, RegistryEvent};
use crate::record::{DeviceRecord, DeviceRow};
use crate::session::SessionController;

/// Registry of devices shown in the device table.
///
/// Session controllers and listeners may read the registry but must not
/// call its mutating methods; `start`/`stop` run under the write guard and
/// listeners run under the delivery lock.
pub struct DeviceRegistry {
    devices: RwLock<Vec<Arc<DeviceRecord>>>,
    delivery: Mutex<()>,
    sessions: Arc<dyn SessionController>,
    labels: Arc<dyn LabelLookup>,
    language: String,
    listeners: RwLock<Vec<Arc<dyn ChangeListener>>>,
}

impl fmt::Debug for DeviceRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceRegistry")
            .field("devices", &self.read_devices().len())
            .field("language", &self.language)
            .field("listeners", &self.read_listeners().len())
            .finish()
    }
}

impl DeviceRegistry {
    /// Create an empty registry with a resolved label lookup
    pub fn new(
        sessions: Arc<dyn SessionController>,
        labels: Arc<dyn LabelLookup>,
        language: impl Into<String>,
    ) -> Self {
        Self {
            devices: RwLock::new(Vec::new()),
            delivery: Mutex::new(()),
            sessions,
            labels,
            language: language.into(),
            listeners: RwLock::new(Vec::new()),
        }
    }

    /// Create an empty registry using the bundled label table for `language`
    pub fn for_language(sessions: Arc<dyn SessionController>, language: &str) -> Self {
        let table = LanguageTable::load(language);
        let language = table.language().to_string();
        Self::new(sessions, Arc::new(table), language)
    }

    /// Language the column headers are resolved in
    pub fn language(&self) -> &str {
        &self.language
    }

    // ─────────────────────────────────────────────────────────────────────
    // Listeners
    // ─────────────────────────────────────────────────────────────────────

    pub fn add_listener(&self, listener: Arc<dyn ChangeListener>) {
        self.listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(listener);
    }

    /// Register a channel listener and return its receiving end
    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<RegistryEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.add_listener(Arc::new(tx));
        rx
    }

    fn notify(&self, event: RegistryEvent) {
        let listeners: Vec<_> = self.read_listeners().iter().cloned().collect();
        trace!("Registry event {:?} to {} listeners", event, listeners.len());
        for listener in listeners {
            listener.on_change(event);
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Membership
    // ─────────────────────────────────────────────────────────────────────

    /// Insert a device and re-sort the table.
    ///
    /// Fails with [`Error::DuplicateDevice`] if a device with the same name
    /// is already registered.
    pub fn add(&self, record: impl Into<Arc<DeviceRecord>>) -> Result<Arc<DeviceRecord>> {
        let record = record.into();
        let _delivery = self.lock_delivery();
        let rows = {
            let mut devices = self.write_devices();
            if devices.iter().any(|d| d.name() == record.name()) {
                return Err(Error::duplicate_device(record.name()));
            }
            devices.push(Arc::clone(&record));
            devices.sort_by(|a, b| a.sort_cmp(b));
            devices.len()
        };

        debug!(
            "Added device {} [{}] ({} rows)",
            record.name(),
            record.serial_number(),
            rows
        );
        self.notify(RegistryEvent::Reset { rows });
        Ok(record)
    }

    /// Remove a device by identity.
    ///
    /// A visible device has its session stopped first; if that fails the
    /// device stays registered and the error is returned. Returns whether
    /// the device was present.
    pub fn remove(&self, record: &Arc<DeviceRecord>) -> Result<bool> {
        let _delivery = self.lock_delivery();
        let (removed, rows) = {
            let mut devices = self.write_devices();
            match devices.iter().position(|d| Arc::ptr_eq(d, record)) {
                Some(pos) => {
                    if record.is_visible() {
                        self.sessions.stop(record)?;
                        record.mark_visible(false);
                    }
                    devices.remove(pos);
                    (true, devices.len())
                }
                None => (false, devices.len()),
            }
        };

        if removed {
            debug!(
                "Removed device {} [{}] ({} rows)",
                record.name(),
                record.serial_number(),
                rows
            );
        }
        self.notify(RegistryEvent::Reset { rows });
        Ok(removed)
    }

    /// Remove every device, stopping active sessions.
    ///
    /// Stop failures are logged and do not keep a device registered.
    /// Returns the number of devices removed.
    pub fn remove_all(&self) -> usize {
        let _delivery = self.lock_delivery();
        let removed = {
            let mut devices = self.write_devices();
            for record in devices.iter().filter(|d| d.is_visible()) {
                if let Err(e) = self.sessions.stop(record) {
                    warn!("Failed to stop session for {}: {}", record.name(), e);
                }
                record.mark_visible(false);
            }
            let removed = devices.len();
            devices.clear();
            removed
        };

        debug!("Removed all {} devices", removed);
        self.notify(RegistryEvent::Reset { rows: 0 });
        removed
    }

    /// Tell listeners to re-read everything, e.g. after connection states
    /// were updated in place
    pub fn refresh(&self) {
        let _delivery = self.lock_delivery();
        let rows = self.read_devices().len();
        self.notify(RegistryEvent::Reset { rows });
    }

    // ─────────────────────────────────────────────────────────────────────
    // Lookup
    // ─────────────────────────────────────────────────────────────────────

    /// Find a device by name
    pub fn get(&self, name: &str) -> Option<Arc<DeviceRecord>> {
        self.read_devices()
            .iter()
            .find(|d| d.name() == name)
            .cloned()
    }

    /// Find a device by adb serial number
    pub fn find_by_serial(&self, serial: &str) -> Option<Arc<DeviceRecord>> {
        self.read_devices()
            .iter()
            .find(|d| d.serial_number() == serial)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.read_devices().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read_devices().is_empty()
    }

    /// The device at `row`
    pub fn at(&self, row: usize) -> Result<Arc<DeviceRecord>> {
        let devices = self.read_devices();
        devices
            .get(row)
            .cloned()
            .ok_or_else(|| Error::row_out_of_range(row, devices.len()))
    }

    /// Shared handles to all devices, in table order
    pub fn records(&self) -> Vec<Arc<DeviceRecord>> {
        self.read_devices().clone()
    }

    /// Copies of all rows, in table order
    pub fn snapshot(&self) -> Vec<DeviceRow> {
        self.read_devices().iter().map(|d| d.snapshot()).collect()
    }

    // ─────────────────────────────────────────────────────────────────────
    // Table projection
    // ─────────────────────────────────────────────────────────────────────

    pub fn column_count(&self) -> usize {
        Column::COUNT
    }

    /// Localized header text for a column
    pub fn column_name(&self, column: usize) -> Result<String> {
        Ok(self.labels.lookup(Column::from_index(column)?.key()))
    }

    /// Localized text for any label key, e.g. a [`DeviceKind::label_key`]
    ///
    /// [`DeviceKind::label_key`]: dscreen_core::DeviceKind::label_key
    pub fn label(&self, key: &str) -> String {
        self.labels.lookup(key)
    }

    /// Localized header texts for all columns
    pub fn column_names(&self) -> Vec<String> {
        Column::ALL
            .iter()
            .map(|c| self.labels.lookup(c.key()))
            .collect()
    }

    pub fn column_kind(&self, column: usize) -> Result<ColumnKind> {
        Ok(Column::from_index(column)?.kind())
    }

    pub fn is_cell_editable(&self, _row: usize, column: usize) -> bool {
        Column::from_index(column)
            .map(Column::is_editable)
            .unwrap_or(false)
    }

    pub fn value_at(&self, row: usize, column: usize) -> Result<CellValue> {
        let column = Column::from_index(column)?;
        let devices = self.read_devices();
        let record = devices
            .get(row)
            .ok_or_else(|| Error::row_out_of_range(row, devices.len()))?;
        Ok(column.value(record))
    }

    /// Generic cell edit entry point; only the visibility column accepts edits
    pub fn set_value_at(&self, row: usize, column: usize, value: CellValue) -> Result<()> {
        let column = Column::from_index(column)?;
        if !column.is_editable() {
            return Err(Error::NotEditable {
                column: column.key(),
            });
        }
        let visible = value
            .as_flag()
            .ok_or_else(|| Error::invalid_value(column.key(), "expected a flag"))?;
        self.set_visible(row, visible)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Visibility
    // ─────────────────────────────────────────────────────────────────────

    /// Show or hide the device at `row`, starting or stopping its session.
    ///
    /// Setting the current value again is a no-op for the session but still
    /// emits a cell update.
    pub fn set_visible(&self, row: usize, visible: bool) -> Result<()> {
        let _delivery = self.lock_delivery();
        {
            let devices = self.write_devices();
            let record = devices
                .get(row)
                .ok_or_else(|| Error::row_out_of_range(row, devices.len()))?;
            self.transition(record, visible)?;
        }

        self.notify(RegistryEvent::CellUpdated {
            row,
            column: Column::Visible,
        });
        Ok(())
    }

    /// Show or hide a device by identity. Returns the row it was found at.
    pub fn set_device_visible(&self, record: &Arc<DeviceRecord>, visible: bool) -> Result<usize> {
        let _delivery = self.lock_delivery();
        let row = {
            let devices = self.write_devices();
            let row = devices
                .iter()
                .position(|d| Arc::ptr_eq(d, record))
                .ok_or_else(|| Error::unknown_device(record.name()))?;
            self.transition(record, visible)?;
            row
        };

        self.notify(RegistryEvent::CellUpdated {
            row,
            column: Column::Visible,
        });
        Ok(row)
    }

    /// Apply a visibility change. Caller holds the write guard.
    fn transition(&self, record: &DeviceRecord, visible: bool) -> Result<()> {
        match (record.is_visible(), visible) {
            (false, true) => {
                self.sessions.start(record)?;
                record.mark_visible(true);
                info!("Showing {} [{}]", record.name(), record.serial_number());
            }
            (true, false) => {
                self.sessions.stop(record)?;
                record.mark_visible(false);
                info!("Hiding {} [{}]", record.name(), record.serial_number());
            }
            _ => {
                trace!("{} already visible={}", record.name(), visible);
            }
        }
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────
    // Guards
    // ─────────────────────────────────────────────────────────────────────

    /// Serializes mutations with their notifications. Taken before the
    /// devices write guard.
    fn lock_delivery(&self) -> MutexGuard<'_, ()> {
        self.delivery.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn read_devices(&self) -> RwLockReadGuard<'_, Vec<Arc<DeviceRecord>>> {
        self.devices.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_devices(&self) -> RwLockWriteGuard<'_, Vec<Arc<DeviceRecord>>> {
        self.devices.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn read_listeners(&self) -> RwLockReadGuard<'_, Vec<Arc<dyn ChangeListener>>> {
        self.listeners.read().unwrap_or_else(PoisonError::into_inner)
    }
}
