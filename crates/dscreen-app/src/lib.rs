//! dscreen-app - Device registry and session orchestration for droid-screen
//!
//! This crate owns the sorted device registry and its table projection,
//! the visibility-driven session lifecycle, change notifications, label
//! tables, configuration loading and the adb-backed device monitor.

pub mod columns;
pub mod config;
pub mod labels;
pub mod monitor;
pub mod notify;
pub mod record;
pub mod registry;
pub mod session;

// Re-export primary types
pub use columns::{CellValue, Column, ColumnDescriptor, ColumnKind, COLUMNS};
pub use labels::{LabelLookup, LanguageTable, DEFAULT_LANGUAGE};
pub use monitor::{reconcile, DeviceMonitor, ReconcileSummary};
pub use notify::{ChangeListener, RegistryEvent};
pub use record::{DeviceRecord, DeviceRow};
pub use registry::DeviceRegistry;
pub use session::{SessionController, TracingSessions};

// Re-export adb types for the binary
pub use dscreen_adb::{AdbDevice, ToolAvailability};
