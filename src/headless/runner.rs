//! Headless mode runner - device monitor loop without a UI
//!
//! Wires settings, adb discovery, the device registry and a session
//! controller together, and turns registry change notifications into
//! [`HeadlessEvent`]s on stdout.

use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError, Weak};

use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info, trace, warn};

use dscreen_app::config::{load_settings, Settings};
use dscreen_app::{
    ChangeListener, DeviceMonitor, DeviceRecord, DeviceRegistry, DeviceRow, RegistryEvent,
    SessionController, ToolAvailability, TracingSessions,
};
use dscreen_core::prelude::*;

use super::table::render_table;
use super::HeadlessEvent;

/// Command line overrides applied on top of the loaded settings
#[derive(Debug, Clone, Default)]
pub struct HeadlessOptions {
    /// Run a single discovery pass, print the table and exit
    pub once: bool,

    /// Show every device as soon as it connects
    pub show_all: bool,

    /// Label language for the table headers
    pub language: Option<String>,

    /// adb command or path
    pub adb: Option<String>,
}

impl HeadlessOptions {
    /// Apply the overrides to `settings`
    pub fn apply(&self, settings: &mut Settings) {
        if let Some(language) = &self.language {
            settings.language = language.clone();
        }
        if let Some(adb) = &self.adb {
            settings.adb.path = adb.clone();
        }
        if self.show_all {
            settings.monitor.show_on_connect = true;
        }
    }
}

/// Session controller that reports each transition as a headless event
#[derive(Debug)]
struct HeadlessSessions {
    inner: TracingSessions,
    events: mpsc::UnboundedSender<HeadlessEvent>,
}

impl HeadlessSessions {
    fn new(events: mpsc::UnboundedSender<HeadlessEvent>) -> Self {
        Self {
            inner: TracingSessions::new(),
            events,
        }
    }

    fn send(&self, event: HeadlessEvent) {
        if self.events.send(event).is_err() {
            trace!("Headless event receiver dropped");
        }
    }
}

impl SessionController for HeadlessSessions {
    fn start(&self, device: &DeviceRecord) -> Result<()> {
        self.inner.start(device)?;
        self.send(HeadlessEvent::session_started(device.name(), device.serial_number()));
        Ok(())
    }

    fn stop(&self, device: &DeviceRecord) -> Result<()> {
        self.inner.stop(device)?;
        self.send(HeadlessEvent::session_stopped(device.name(), device.serial_number()));
        Ok(())
    }
}

/// Run in headless mode - output JSON events on stdout
pub async fn run_headless(base_path: &Path, options: HeadlessOptions) -> Result<()> {
    info!("═══════════════════════════════════════════════════════");
    info!("droid-screen starting in HEADLESS mode");
    info!("Config base: {}", base_path.display());
    info!("═══════════════════════════════════════════════════════");

    let mut settings = load_settings(base_path);
    options.apply(&mut settings);

    let tools = ToolAvailability::check(&settings.adb.path).await;
    if let Some(message) = tools.adb_unavailable_message() {
        HeadlessEvent::error(message.to_string(), true).emit();
        return Err(Error::AdbNotFound);
    }

    // Session and table events share one queue, in commit order
    let (events_tx, mut events) = mpsc::unbounded_channel();
    let sessions: Arc<dyn SessionController> = Arc::new(HeadlessSessions::new(events_tx.clone()));
    let registry = Arc::new(DeviceRegistry::for_language(sessions, &settings.language));
    TableTracker::attach(&registry, events_tx);

    let monitor = DeviceMonitor::new(Arc::clone(&registry), &settings)
        .with_adb_command(tools.adb_command(&settings.adb.path));

    let result = if options.once {
        run_once(&monitor, &mut events).await
    } else {
        headless_event_loop(&monitor, &mut events).await
    };

    // Shutdown: stop every remaining session
    let removed = registry.remove_all();
    debug!("Removed {} devices on shutdown", removed);
    drain_events(&mut events);

    if let Err(e) = &result {
        HeadlessEvent::error(e.to_string(), e.is_fatal()).emit();
    }

    info!("droid-screen headless mode exiting");
    result
}

/// Single discovery pass, then print the table
async fn run_once(
    monitor: &DeviceMonitor,
    events: &mut mpsc::UnboundedReceiver<HeadlessEvent>,
) -> Result<()> {
    let summary = monitor.poll_once().await?;
    info!(
        "Discovered {} devices ({} added)",
        monitor.registry().len(),
        summary.added.len()
    );

    drain_events(events);
    eprint!("{}", render_table(monitor.registry()));
    Ok(())
}

/// Main headless event loop
async fn headless_event_loop(
    monitor: &DeviceMonitor,
    events: &mut mpsc::UnboundedReceiver<HeadlessEvent>,
) -> Result<()> {
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let mut monitor_task = tokio::spawn({
        let monitor = monitor.clone();
        async move { monitor.run(shutdown_rx).await }
    });

    let mut monitor_finished = false;
    let result = loop {
        tokio::select! {
            Some(event) = events.recv() => event.emit(),
            signal = tokio::signal::ctrl_c() => {
                if let Err(e) = signal {
                    warn!("Failed to listen for Ctrl-C: {}", e);
                }
                info!("Shutdown requested");
                break Ok(());
            }
            joined = &mut monitor_task => {
                monitor_finished = true;
                break match joined {
                    Ok(result) => result,
                    Err(e) => Err(Error::process(format!("Monitor task failed: {}", e))),
                };
            }
        }
    };

    if let Err(e) = shutdown_tx.send(true) {
        debug!("Monitor already gone at shutdown: {}", e);
    }
    if !monitor_finished {
        match monitor_task.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!("Monitor ended with error during shutdown: {}", e),
            Err(e) => error!("Monitor task failed during shutdown: {}", e),
        }
    }

    drain_events(events);
    result
}

/// Emit every event already queued
fn drain_events(events: &mut mpsc::UnboundedReceiver<HeadlessEvent>) {
    while let Ok(event) = events.try_recv() {
        event.emit();
    }
}

/// Turns registry notifications into headless events.
///
/// Runs as a registry listener, so rows are resolved while the change is
/// being delivered and no other mutation can reorder the table first.
/// `Reset` only says "re-read everything": the tracker keeps the last
/// reported rows and diffs them by serial number to report which devices
/// came and went.
struct TableTracker {
    registry: Weak<DeviceRegistry>,
    rows: Mutex<Vec<DeviceRow>>,
    events: mpsc::UnboundedSender<HeadlessEvent>,
}

impl TableTracker {
    /// Register a tracker on `registry` that sends to `events`
    fn attach(registry: &Arc<DeviceRegistry>, events: mpsc::UnboundedSender<HeadlessEvent>) {
        registry.add_listener(Arc::new(Self {
            registry: Arc::downgrade(registry),
            rows: Mutex::new(Vec::new()),
            events,
        }));
    }

    fn send(&self, event: HeadlessEvent) {
        if self.events.send(event).is_err() {
            trace!("Headless event receiver dropped");
        }
    }
}

impl ChangeListener for TableTracker {
    fn on_change(&self, event: RegistryEvent) {
        let Some(registry) = self.registry.upgrade() else {
            return;
        };
        match event {
            RegistryEvent::Reset { rows } => {
                let current = registry.snapshot();
                let mut previous = self.rows.lock().unwrap_or_else(PoisonError::into_inner);
                for removed in previous.iter().filter(|old| !contains(&current, old)) {
                    self.send(HeadlessEvent::device_removed(removed));
                }
                for added in current.iter().filter(|new| !contains(&previous, new)) {
                    self.send(HeadlessEvent::device_added(added));
                }
                self.send(HeadlessEvent::table_reset(rows));
                *previous = current;
            }
            RegistryEvent::CellUpdated { row, column } => {
                match registry.value_at(row, column.index()) {
                    Ok(value) => self.send(HeadlessEvent::cell_updated(row, column, value)),
                    Err(e) => debug!("Skipping cell update: {}", e),
                }
            }
        }
    }
}

fn contains(rows: &[DeviceRow], row: &DeviceRow) -> bool {
    rows.iter().any(|r| r.serial_number == row.serial_number)
}
