//! Application error types with rich context

use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Application error types organized by layer/domain
#[derive(Debug, Error)]
pub enum Error {
    // ─────────────────────────────────────────────────────────────
    // Common/Infrastructure Errors
    // ─────────────────────────────────────────────────────────────
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ─────────────────────────────────────────────────────────────
    // Registry Errors
    // ─────────────────────────────────────────────────────────────
    #[error("Row {row} is out of range (registry has {rows} rows)")]
    RowOutOfRange { row: usize, rows: usize },

    #[error("Column {column} is out of range")]
    ColumnOutOfRange { column: usize },

    #[error("Column '{column}' is not editable")]
    NotEditable { column: &'static str },

    #[error("Invalid value for column '{column}': {message}")]
    InvalidValue {
        column: &'static str,
        message: String,
    },

    #[error("A device named '{name}' is already registered")]
    DuplicateDevice { name: String },

    #[error("Device '{name}' is not registered")]
    UnknownDevice { name: String },

    // ─────────────────────────────────────────────────────────────
    // Session Errors
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to start session for '{device}': {message}")]
    SessionStart { device: String, message: String },

    #[error("Failed to stop session for '{device}': {message}")]
    SessionStop { device: String, message: String },

    // ─────────────────────────────────────────────────────────────
    // adb Errors
    // ─────────────────────────────────────────────────────────────
    #[error("adb not found. Ensure 'adb' is in your PATH or set ANDROID_HOME.")]
    AdbNotFound,

    #[error("adb process error: {message}")]
    Process { message: String },

    // ─────────────────────────────────────────────────────────────
    // Configuration Errors
    // ─────────────────────────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },
}

// ─────────────────────────────────────────────────────────────────
// Convenience Constructors
// ─────────────────────────────────────────────────────────────────

impl Error {
    pub fn row_out_of_range(row: usize, rows: usize) -> Self {
        Self::RowOutOfRange { row, rows }
    }

    pub fn invalid_value(column: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            column,
            message: message.into(),
        }
    }

    pub fn duplicate_device(name: impl Into<String>) -> Self {
        Self::DuplicateDevice { name: name.into() }
    }

    pub fn unknown_device(name: impl Into<String>) -> Self {
        Self::UnknownDevice { name: name.into() }
    }

    pub fn session_start(device: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SessionStart {
            device: device.into(),
            message: message.into(),
        }
    }

    pub fn session_stop(device: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SessionStop {
            device: device.into(),
            message: message.into(),
        }
    }

    pub fn process(message: impl Into<String>) -> Self {
        Self::Process {
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Check if this is a recoverable error
    ///
    /// Recoverable errors leave the registry consistent; the caller may
    /// surface them and carry on.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::RowOutOfRange { .. }
                | Error::ColumnOutOfRange { .. }
                | Error::NotEditable { .. }
                | Error::InvalidValue { .. }
                | Error::DuplicateDevice { .. }
                | Error::UnknownDevice { .. }
                | Error::SessionStart { .. }
                | Error::SessionStop { .. }
                | Error::Process { .. }
        )
    }

    /// Check if this error should trigger application exit
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::AdbNotFound)
    }
}

// ─────────────────────────────────────────────────────────────────
// Error Context Extensions (for use with color-eyre)
// ─────────────────────────────────────────────────────────────────

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let err = e.into();
            tracing::error!("{}: {:?}", context.into(), err);
            err
        })
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| {
            let err = e.into();
            tracing::error!("{}: {:?}", f(), err);
            err
        })
    }
}
