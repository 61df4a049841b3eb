//! Keeps the registry in sync with `adb devices`
//!
//! [`reconcile`] applies one discovery result to the registry;
//! [`DeviceMonitor`] polls adb and reconciles until shut down.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use dscreen_adb::{discover_devices_with_timeout, AdbDevice};
use dscreen_core::prelude::*;
use tokio::sync::watch;

use crate::config::Settings;
use crate::record::DeviceRecord;
use crate::registry::DeviceRegistry;

/// What a reconcile pass changed
#[derive(Debug, Default)]
pub struct ReconcileSummary {
    /// Newly registered devices
    pub added: Vec<Arc<DeviceRecord>>,

    /// Serial numbers of devices that disappeared and were removed
    pub removed: Vec<String>,

    /// Number of known devices whose connection state changed
    pub updated: usize,
}

impl ReconcileSummary {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.updated == 0
    }
}

/// Apply one `adb devices` result to the registry.
///
/// Devices that vanished are removed (stopping their session), known ones
/// get their connection state updated, and new serials are added. A new
/// device whose name is already taken is registered as `"name (serial)"`.
pub fn reconcile(registry: &DeviceRegistry, discovered: &[AdbDevice]) -> ReconcileSummary {
    let mut summary = ReconcileSummary::default();
    let present: HashSet<&str> = discovered.iter().map(|d| d.serial.as_str()).collect();

    for record in registry.records() {
        if present.contains(record.serial_number()) {
            continue;
        }
        match registry.remove(&record) {
            Ok(true) => {
                info!("Device disconnected: {} [{}]", record.name(), record.serial_number());
                summary.removed.push(record.serial_number().to_string());
            }
            Ok(false) => {}
            Err(e) => warn!("Keeping {} after failed removal: {}", record.name(), e),
        }
    }

    for device in discovered {
        if let Some(record) = registry.find_by_serial(&device.serial) {
            if record.set_connection_state(device.state.as_str()) {
                debug!("{} is now {}", record.name(), device.state);
                summary.updated += 1;
            }
            continue;
        }

        let mut name = device.display_name();
        if registry.get(&name).is_some() {
            name = format!("{} ({})", name, device.serial);
        }

        let record = DeviceRecord::with_kind(
            name,
            device.kind(),
            device.serial.as_str(),
            device.state.as_str(),
        );
        match registry.add(record) {
            Ok(record) => {
                info!("Device connected: {} [{}]", record.name(), record.serial_number());
                summary.added.push(record);
            }
            Err(e) => warn!("Skipping device {}: {}", device.serial, e),
        }
    }

    if summary.updated > 0 {
        registry.refresh();
    }

    summary
}

/// Newly added records whose device is online and authorized; only those
/// can be mirrored
fn online_records<'a>(
    added: &'a [Arc<DeviceRecord>],
    discovered: &'a [AdbDevice],
) -> impl Iterator<Item = &'a Arc<DeviceRecord>> {
    added.iter().filter(move |record| {
        discovered
            .iter()
            .any(|d| d.serial == record.serial_number() && d.is_online())
    })
}

/// Polls adb and keeps a [`DeviceRegistry`] up to date
#[derive(Debug, Clone)]
pub struct DeviceMonitor {
    registry: Arc<DeviceRegistry>,
    adb: String,
    timeout: Duration,
    poll_interval: Duration,
    show_on_connect: bool,
}

impl DeviceMonitor {
    pub fn new(registry: Arc<DeviceRegistry>, settings: &Settings) -> Self {
        Self {
            registry,
            adb: settings.adb.path.clone(),
            timeout: settings.adb.timeout(),
            poll_interval: settings.monitor.poll_interval(),
            show_on_connect: settings.monitor.show_on_connect,
        }
    }

    /// Override the adb command, e.g. with a path found by `ToolAvailability`
    pub fn with_adb_command(mut self, adb: impl Into<String>) -> Self {
        self.adb = adb.into();
        self
    }

    pub fn with_show_on_connect(mut self, show: bool) -> Self {
        self.show_on_connect = show;
        self
    }

    pub fn registry(&self) -> &Arc<DeviceRegistry> {
        &self.registry
    }

    /// Run discovery once and reconcile the registry
    pub async fn poll_once(&self) -> Result<ReconcileSummary> {
        let discovery = discover_devices_with_timeout(&self.adb, self.timeout).await?;
        trace!(
            "adb listed {} devices in {:?}",
            discovery.devices.len(),
            discovery.elapsed
        );
        if let Some(warning) = discovery.warning.as_deref() {
            debug!("adb warning: {}", warning.trim());
        }

        // Session start/stop may block
        let registry = Arc::clone(&self.registry);
        let show_on_connect = self.show_on_connect;
        tokio::task::spawn_blocking(move || {
            let summary = reconcile(&registry, &discovery.devices);
            if show_on_connect {
                for record in online_records(&summary.added, &discovery.devices) {
                    if let Err(e) = registry.set_device_visible(record, true) {
                        warn!("Failed to show {}: {}", record.name(), e);
                    }
                }
            }
            summary
        })
        .await
        .map_err(|e| Error::process(format!("Reconcile task failed: {}", e)))
    }

    /// Poll until `shutdown` becomes `true`.
    ///
    /// A missing adb binary ends the loop with an error; other discovery
    /// failures are logged and retried on the next tick.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) -> Result<()> {
        let mut interval = tokio::time::interval(self.poll_interval);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        info!("Device monitor polling every {:?}", self.poll_interval);

        loop {
            if *shutdown.borrow() {
                break;
            }

            tokio::select! {
                _ = interval.tick() => {
                    match self.poll_once().await {
                        Ok(summary) if !summary.is_empty() => debug!(
                            "Reconciled: {} added, {} removed, {} updated",
                            summary.added.len(),
                            summary.removed.len(),
                            summary.updated
                        ),
                        Ok(_) => {}
                        Err(e) if e.is_fatal() => return Err(e),
                        Err(e) => warn!("Device poll failed: {}", e),
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }

        info!("Device monitor stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::TracingSessions;
    use dscreen_adb::test_utils::{test_adb_device, test_adb_device_with_state};

    fn registry() -> (Arc<DeviceRegistry>, Arc<TracingSessions>) {
        let sessions = Arc::new(TracingSessions::new());
        let registry = Arc::new(DeviceRegistry::for_language(sessions.clone(), "english"));
        (registry, sessions)
    }

    #[test]
    fn test_reconcile_adds_new_devices() {
        let (registry, _) = registry();
        let discovered = vec![
            test_adb_device("R58M123ABC", "Pixel_7"),
            test_adb_device("emulator-5554", "sdk_gphone64_x86_64"),
        ];

        let summary = reconcile(&registry, &discovered);

        assert_eq!(summary.added.len(), 2);
        assert_eq!(registry.len(), 2);
        let pixel = registry.get("Pixel 7").unwrap();
        assert!(!pixel.is_emulator());
        assert!(registry.get("sdk gphone64 x86 64").unwrap().is_emulator());
    }

    #[test]
    fn test_reconcile_is_idempotent() {
        let (registry, _) = registry();
        let discovered = vec![test_adb_device("SN1", "Pixel_7")];

        reconcile(&registry, &discovered);
        let summary = reconcile(&registry, &discovered);

        assert!(summary.is_empty());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_reconcile_updates_connection_state() {
        let (registry, _) = registry();
        let mut rx = registry.subscribe();
        reconcile(&registry, &[test_adb_device_with_state("SN1", "Pixel_7", "offline")]);

        let summary = reconcile(&registry, &[test_adb_device("SN1", "Pixel_7")]);

        assert_eq!(summary.updated, 1);
        assert_eq!(registry.get("Pixel 7").unwrap().connection_state(), "device");
        // add, then refresh
        assert!(rx.try_recv().is_ok());
        assert!(rx.try_recv().is_ok());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_reconcile_removes_and_stops_vanished_devices() {
        let (registry, sessions) = registry();
        reconcile(&registry, &[test_adb_device("SN1", "Pixel_7")]);
        registry.set_visible(0, true).unwrap();
        assert!(sessions.is_active("SN1"));

        let summary = reconcile(&registry, &[]);

        assert_eq!(summary.removed, vec!["SN1".to_string()]);
        assert!(registry.is_empty());
        assert!(!sessions.is_active("SN1"));
    }

    #[test]
    fn test_reconcile_disambiguates_same_model() {
        let (registry, _) = registry();
        let discovered = vec![
            test_adb_device("SN1", "Pixel_7"),
            test_adb_device("SN2", "Pixel_7"),
        ];

        reconcile(&registry, &discovered);

        assert_eq!(registry.len(), 2);
        assert!(registry.get("Pixel 7").is_some());
        assert_eq!(
            registry.get("Pixel 7 (SN2)").unwrap().serial_number(),
            "SN2"
        );
    }

    #[test]
    fn test_online_records_skip_unauthorized() {
        let (registry, _) = registry();
        let discovered = vec![
            test_adb_device("SN1", "Pixel_7"),
            test_adb_device_with_state("SN2", "Galaxy", "unauthorized"),
        ];

        let summary = reconcile(&registry, &discovered);
        let online: Vec<_> = online_records(&summary.added, &discovered)
            .map(|r| r.serial_number().to_string())
            .collect();

        assert_eq!(summary.added.len(), 2);
        assert_eq!(online, vec!["SN1"]);
    }

    #[tokio::test]
    async fn test_run_stops_on_shutdown() {
        let (registry, _) = registry();
        let monitor = DeviceMonitor::new(registry, &Settings::default())
            .with_adb_command("/nonexistent/adb");
        let (tx, rx) = watch::channel(true);

        monitor.run(rx).await.unwrap();
        drop(tx);
    }

    #[tokio::test]
    async fn test_run_fails_without_adb() {
        let (registry, _) = registry();
        let monitor = DeviceMonitor::new(registry, &Settings::default())
            .with_adb_command("/nonexistent/adb");
        let (_tx, rx) = watch::channel(false);

        let err = monitor.run(rx).await.unwrap_err();
        assert!(matches!(err, Error::AdbNotFound));
    }

    #[test]
    fn test_monitor_uses_settings() {
        let (registry, _) = registry();
        let mut settings = Settings::default();
        settings.monitor.show_on_connect = true;

        let monitor = DeviceMonitor::new(registry.clone(), &settings).with_show_on_connect(false);

        assert!(!monitor.show_on_connect);
        assert_eq!(monitor.adb, "adb");
        assert!(Arc::ptr_eq(monitor.registry(), &registry));
    }
}
