//! Integration tests for the device registry, monitor reconcile and config

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

use tempfile::TempDir;

use dscreen_adb::test_utils::{test_adb_device, test_adb_device_with_state};
use dscreen_app::config::{load_settings, save_settings, Settings};
use dscreen_app::{
    reconcile, CellValue, Column, DeviceRecord, DeviceRegistry, RegistryEvent, SessionController,
    TracingSessions,
};
use dscreen_core::{DeviceKind, Error, Result};

/// Counts start/stop calls per device name
#[derive(Default)]
struct CountingSessions {
    starts: Mutex<Vec<String>>,
    stops: Mutex<Vec<String>>,
    total: AtomicUsize,
}

impl SessionController for CountingSessions {
    fn start(&self, device: &DeviceRecord) -> Result<()> {
        self.starts.lock().unwrap().push(device.name().to_string());
        self.total.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn stop(&self, device: &DeviceRecord) -> Result<()> {
        self.stops.lock().unwrap().push(device.name().to_string());
        self.total.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

fn counting_registry() -> (Arc<DeviceRegistry>, Arc<CountingSessions>) {
    let sessions = Arc::new(CountingSessions::default());
    let registry = Arc::new(DeviceRegistry::for_language(sessions.clone(), "english"));
    (registry, sessions)
}

#[test]
fn test_pixel_and_emulator_scenario() {
    let (registry, sessions) = counting_registry();

    registry
        .add(DeviceRecord::with_kind("Pixel", DeviceKind::Device, "SN1", "device"))
        .unwrap();
    registry
        .add(DeviceRecord::with_kind("Emu1", DeviceKind::Emulator, "SN2", "device"))
        .unwrap();

    let names: Vec<_> = registry.snapshot().into_iter().map(|r| r.name).collect();
    assert_eq!(names, vec!["Emu1", "Pixel"]);

    registry.set_value_at(0, 4, CellValue::Flag(true)).unwrap();
    assert_eq!(*sessions.starts.lock().unwrap(), vec!["Emu1".to_string()]);
    assert_eq!(registry.value_at(0, 4).unwrap(), CellValue::Flag(true));

    registry.set_value_at(0, 4, CellValue::Flag(true)).unwrap();
    assert_eq!(sessions.starts.lock().unwrap().len(), 1);

    registry.set_value_at(0, 4, CellValue::Flag(false)).unwrap();
    assert_eq!(*sessions.stops.lock().unwrap(), vec!["Emu1".to_string()]);
    assert_eq!(registry.value_at(0, 4).unwrap(), CellValue::Flag(false));
}

#[test]
fn test_concurrent_adds_keep_every_device_once() {
    let (registry, _) = counting_registry();
    let threads = 8;
    let per_thread = 25;

    let handles: Vec<_> = (0..threads)
        .map(|t| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || {
                for i in 0..per_thread {
                    let name = format!("device-{:02}-{:02}", t, i);
                    registry
                        .add(DeviceRecord::new(name, format!("SN{}-{}", t, i), "device"))
                        .unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let rows = registry.snapshot();
    assert_eq!(rows.len(), threads * per_thread);

    let unique: HashSet<_> = rows.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(unique.len(), rows.len());

    let mut sorted = rows.clone();
    sorted.sort_by(|a, b| a.name.cmp(&b.name));
    assert_eq!(rows, sorted);
}

#[test]
fn test_concurrent_adds_and_removes_keep_size() {
    let (registry, _) = counting_registry();
    let threads = 6;
    let per_thread = 30;

    // Every third device is removed again by the thread that added it
    let handles: Vec<_> = (0..threads)
        .map(|t| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || {
                let mut removed = 0;
                for i in 0..per_thread {
                    let name = format!("device-{:02}-{:02}", t, i);
                    let record = registry
                        .add(DeviceRecord::new(name, format!("SN{}-{}", t, i), "device"))
                        .unwrap();
                    if i % 3 == 0 {
                        assert!(registry.remove(&record).unwrap());
                        removed += 1;
                    }
                }
                removed
            })
        })
        .collect();
    let removed: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();

    let rows = registry.snapshot();
    assert_eq!(rows.len(), threads * per_thread - removed);
    assert_eq!(registry.len(), rows.len());

    let unique: HashSet<_> = rows.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(unique.len(), rows.len());

    let mut sorted = rows.clone();
    sorted.sort_by(|a, b| a.name.cmp(&b.name));
    assert_eq!(rows, sorted);
}

#[test]
fn test_remove_all_races_adds() {
    let (registry, _) = counting_registry();

    let adders: Vec<_> = (0..4)
        .map(|t| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || {
                for i in 0..25 {
                    registry
                        .add(DeviceRecord::new(
                            format!("device-{}-{:02}", t, i),
                            format!("SN{}-{}", t, i),
                            "device",
                        ))
                        .unwrap();
                }
            })
        })
        .collect();
    let clearer = {
        let registry = Arc::clone(&registry);
        thread::spawn(move || (0..10).map(|_| registry.remove_all()).sum::<usize>())
    };

    for handle in adders {
        handle.join().unwrap();
    }
    let cleared = clearer.join().unwrap();

    assert_eq!(registry.len(), 100 - cleared);
    let rows = registry.snapshot();
    let mut sorted = rows.clone();
    sorted.sort_by(|a, b| a.name.cmp(&b.name));
    assert_eq!(rows, sorted);
}

#[test]
fn test_concurrent_duplicate_names_admit_exactly_one() {
    let (registry, _) = counting_registry();

    let handles: Vec<_> = (0..8)
        .map(|t| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || {
                registry
                    .add(DeviceRecord::new("Pixel", format!("SN{}", t), "device"))
                    .is_ok()
            })
        })
        .collect();
    let admitted = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .filter(|ok| *ok)
        .count();

    assert_eq!(admitted, 1);
    assert_eq!(registry.len(), 1);
}

#[test]
fn test_concurrent_toggles_start_once_per_transition() {
    let (registry, sessions) = counting_registry();
    registry
        .add(DeviceRecord::new("Pixel", "SN1", "device"))
        .unwrap();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || registry.set_visible(0, true).unwrap())
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(sessions.starts.lock().unwrap().len(), 1);
    assert!(registry.at(0).unwrap().is_visible());
}

#[test]
fn test_remove_all_stops_visible_devices() {
    let (registry, sessions) = counting_registry();
    registry
        .add(DeviceRecord::new("Pixel", "SN1", "device"))
        .unwrap();
    registry
        .add(DeviceRecord::new("Emu1", "emulator-5554", "device"))
        .unwrap();
    registry.set_visible(1, true).unwrap();

    assert_eq!(registry.remove_all(), 2);

    assert!(registry.is_empty());
    assert!(registry.get("Pixel").is_none());
    assert_eq!(*sessions.stops.lock().unwrap(), vec!["Pixel".to_string()]);
}

#[test]
fn test_out_of_range_and_read_only_columns() {
    let (registry, sessions) = counting_registry();
    registry
        .add(DeviceRecord::new("Pixel", "SN1", "device"))
        .unwrap();

    assert!(matches!(
        registry.set_visible(1, true),
        Err(Error::RowOutOfRange { row: 1, rows: 1 })
    ));
    assert!(matches!(
        registry.set_value_at(0, Column::Name.index(), CellValue::Text("x".into())),
        Err(Error::NotEditable { .. })
    ));
    assert!(matches!(
        registry.set_value_at(0, Column::Visible.index(), CellValue::Text("yes".into())),
        Err(Error::InvalidValue { .. })
    ));
    assert_eq!(sessions.total.load(Ordering::SeqCst), 0);
}

#[test]
fn test_reconcile_tracks_devices_across_polls() {
    let sessions = Arc::new(TracingSessions::new());
    let registry = DeviceRegistry::for_language(sessions.clone(), "english");
    let mut events = registry.subscribe();

    reconcile(
        &registry,
        &[
            test_adb_device("R58M123ABC", "Pixel_7"),
            test_adb_device_with_state("emulator-5554", "sdk_gphone64", "offline"),
        ],
    );
    assert_eq!(registry.len(), 2);
    assert_eq!(
        registry.value_at(0, Column::Type.index()).unwrap(),
        CellValue::Text("DEV".to_string())
    );

    registry.set_visible(0, true).unwrap();
    assert!(sessions.is_active("R58M123ABC"));

    let summary = reconcile(&registry, &[test_adb_device("emulator-5554", "sdk_gphone64")]);

    assert_eq!(summary.removed, vec!["R58M123ABC".to_string()]);
    assert_eq!(summary.updated, 1);
    assert!(!sessions.is_active("R58M123ABC"));
    assert_eq!(
        registry.value_at(0, Column::State.index()).unwrap(),
        CellValue::Text("device".to_string())
    );

    let mut resets = 0;
    while let Ok(event) = events.try_recv() {
        if matches!(event, RegistryEvent::Reset { .. }) {
            resets += 1;
        }
    }
    // two adds, one removal, one refresh
    assert_eq!(resets, 4);
}

#[test]
fn test_saved_language_drives_headers() {
    let temp = TempDir::new().unwrap();
    let mut settings = Settings::default();
    settings.language = "german".to_string();
    save_settings(temp.path(), &settings).unwrap();

    let loaded = load_settings(temp.path());
    let registry = DeviceRegistry::for_language(Arc::new(TracingSessions::new()), &loaded.language);

    assert_eq!(registry.language(), "german");
    assert_ne!(registry.column_names(), {
        let english = DeviceRegistry::for_language(Arc::new(TracingSessions::new()), "english");
        english.column_names()
    });
}
