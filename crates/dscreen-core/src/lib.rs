//! # dscreen-core - Core Domain Types
//!
//! Foundation crate for droid-screen. Provides domain types, error handling
//! and logging setup.
//!
//! This crate has **zero internal dependencies** -- it only depends on external
//! crates (serde, thiserror, tracing).
//!
//! ## Public API
//!
//! ### Domain Types (`types`)
//! - [`DeviceKind`] - Emulator vs physical device, derived from the adb serial
//!
//! ### Error Handling (`error`)
//! - [`Error`] - Custom error enum with `fatal` vs `recoverable` classification
//! - [`Result`] - Type alias for `std::result::Result<T, Error>`
//! - [`ResultExt`] - Extension trait for adding error context
//!
//! ### Logging (`logging`)
//! - [`logging::init()`] - File-based tracing subscriber controlled by `DSCREEN_LOG`
//!
//! ## Prelude
//!
//! Import commonly used types with:
//! ```rust
//! use dscreen_core::prelude::*;
//! ```

pub mod error;
pub mod logging;
pub mod prelude;
pub mod types;

// Re-export commonly used types at crate root for convenience
pub use error::{Error, Result, ResultExt};
pub use types::{DeviceKind, EMULATOR_SERIAL_PREFIX};
