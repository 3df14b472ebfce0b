//! `delay_log` provides a process-scoped logging facility where every record
//! carries the elapsed time since the facility started, written to a
//! size-bounded, automatically rotated log file.
//!
//! It offers:
//! - A [`LoggingFacility`] that owns the facility lifecycle: it records the
//!   start timestamp once, opens the rotating sink, and hands out logger
//!   handles. The facility is an explicit value passed by handle to call
//!   sites; there is no module-global state to initialize twice.
//! - [`Logger`] handles with severity-leveled emit methods
//!   ([`Logger::debug`], [`Logger::info`], [`Logger::warning`],
//!   [`Logger::error`], [`Logger::critical`]).
//! - A [`DelayContext`] supplying per-record contextual fields: the `delay`
//!   field is recomputed on every read, and unknown field names resolve to a
//!   placeholder instead of failing.
//! - A [`LineFormattingLayer`] that captures [`tracing`] events into the same
//!   rotating sink with the same line layout.
//!
//! Records are plain text with a fixed five-field layout:
//!
//! ```text
//! <delay, 15ch> - <logger name, 5ch> - <level, 8ch> - <message>
//! ```
//!
//! Rotated backups follow the conventional `<name>.log`, `<name>.log.1`,
//! `<name>.log.2`, … naming, with the oldest beyond the configured backup
//! count deleted on rotation.
//!
//! # Example
//!
//! ```no_run
//! use delay_log::{FacilityConfig, LoggingFacility};
//!
//! # fn main() -> Result<(), delay_log::LoggerError> {
//! let facility = LoggingFacility::initialize(FacilityConfig {
//!     name: "toto".to_string(),
//!     directory: "./logs".into(),
//!     max_bytes: 1024 * 1024,
//!     backup_count: 5,
//! })?;
//!
//! let logger = facility.logger("toto");
//! logger.debug(format_args!("i = {}", 5))?;
//!
//! // Optionally route `tracing` events into the same sink.
//! facility.init_global()?;
//! tracing::info!("startup complete");
//! # Ok(())
//! # }
//! ```

mod clock;
mod context;
mod facility;
mod layer;
mod rotation;

use std::path::PathBuf;

pub use self::{
    clock::{Clock, ManualClock, SystemClock},
    context::{DelayContext, PLACEHOLDER},
    facility::{Level, Logger, LoggingFacility},
    layer::LineFormattingLayer,
    rotation::RotatingFileWriter,
};

/// Configuration for a [`LoggingFacility`].
#[derive(Clone, Debug)]
pub struct FacilityConfig {
    /// Base name of the log file. The active file is `<name>.log` inside
    /// `directory`; rotated backups are `<name>.log.1`, `<name>.log.2`, ….
    ///
    /// Must be non-empty and must not contain path separators.
    pub name: String,

    /// Directory where log files are written. Created if it does not exist.
    pub directory: PathBuf,

    /// Size threshold in bytes at which the active file is rotated.
    /// A value of `0` disables rotation entirely.
    pub max_bytes: u64,

    /// Maximum number of rotated backup files retained. The oldest backup
    /// beyond this count is deleted on rotation. A value of `0` truncates
    /// the active file in place instead of keeping backups.
    pub backup_count: usize,
}

impl Default for FacilityConfig {
    fn default() -> Self {
        Self {
            name: "app".to_string(),
            directory: PathBuf::from("./logs"),
            max_bytes: 10 * 1024 * 1024,
            backup_count: 5,
        }
    }
}

/// Errors that can occur within the logging facility.
#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    /// Represents an error in configuration.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Represents an I/O failure while opening, writing, or rotating the
    /// log file.
    #[error("Log file I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Represents a failure to install the global `tracing` subscriber,
    /// typically because one is already installed.
    #[error("Failed to install global subscriber: {0}")]
    GlobalInit(#[from] tracing_subscriber::util::TryInitError),
}
