//! Facility lifecycle, logger handles, and the fixed line layout.

use std::{
    fmt,
    path::PathBuf,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use time::OffsetDateTime;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::{
    clock::{Clock, SystemClock},
    context::{format_delay, DelayContext},
    layer::LineFormattingLayer,
    rotation::RotatingFileWriter,
    FacilityConfig, LoggerError,
};

/// Severity of a log record.
///
/// The facility itself applies no threshold: everything down to
/// [`Level::Debug`] is written, and filtering is left to callers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    /// Detailed diagnostic information.
    Debug,
    /// Routine operational messages.
    Info,
    /// Something unexpected that the process can continue past.
    Warning,
    /// A failure of an individual operation.
    Error,
    /// A failure the process likely cannot continue past.
    Critical,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
            Self::Critical => "CRITICAL",
        };
        // `pad` honors width and alignment flags, which the line layout
        // relies on for the 8-character level column.
        f.pad(repr)
    }
}

/// Renders one record in the fixed five-field layout:
/// `<delay, 15ch> - <name, 5ch> - <level, 8ch> - <message>`.
///
/// Fields pad to the minimum column width and are never truncated.
pub(crate) fn format_line(
    delay: &str,
    name: &str,
    level: Level,
    message: &dyn fmt::Display,
) -> String {
    format!("{delay:<15} - {name:<5} - {level:<8} - {message}")
}

/// State shared between the facility, its logger handles, and the tracing
/// bridge layer: the start timestamp, the clock, and the serialized sink.
#[derive(Debug)]
pub(crate) struct Shared {
    started_at: OffsetDateTime,
    clock: Arc<dyn Clock>,
    sink: Mutex<RotatingFileWriter>,
}

impl Shared {
    fn sink(&self) -> MutexGuard<'_, RotatingFileWriter> {
        // A poisoned sink still holds a usable writer; logging should not
        // stay broken because an unrelated thread panicked mid-write.
        self.sink.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn delay(&self) -> String {
        format_delay(self.clock.now() - self.started_at)
    }

    pub(crate) fn write_line(&self, line: &str) -> std::io::Result<()> {
        self.sink().write_line(line)
    }
}

/// A process-scoped logging facility.
///
/// Construct one with [`LoggingFacility::initialize`] at process startup and
/// pass it by handle (it is cheaply cloneable) to every call site that needs
/// a [`Logger`]. Because the facility is an explicit value rather than
/// module-global state, constructing a second facility cannot duplicate the
/// sink of the first; each facility owns exactly one rotating sink.
#[derive(Clone, Debug)]
pub struct LoggingFacility {
    shared: Arc<Shared>,
}

impl LoggingFacility {
    /// Initializes the facility: records the start timestamp, validates the
    /// configuration, and opens the rotating sink.
    ///
    /// # Errors
    ///
    /// Returns [`LoggerError::Configuration`] for an empty name or a name
    /// containing path separators, and [`LoggerError::Io`] if the log
    /// directory or file cannot be created.
    pub fn initialize(config: FacilityConfig) -> Result<Self, LoggerError> {
        Self::initialize_with_clock(config, Arc::new(SystemClock))
    }

    /// Initializes the facility with an injected [`Clock`], making every
    /// delay computation deterministic. Intended for tests.
    ///
    /// # Errors
    ///
    /// Same as [`LoggingFacility::initialize`].
    pub fn initialize_with_clock(
        config: FacilityConfig,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, LoggerError> {
        if config.name.is_empty() {
            return Err(LoggerError::Configuration(
                "log file name must not be empty".to_string(),
            ));
        }
        if config.name.contains(['/', '\\']) {
            return Err(LoggerError::Configuration(format!(
                "log file name `{}` must not contain path separators",
                config.name
            )));
        }

        let started_at = clock.now();
        let sink = RotatingFileWriter::open(
            &config.directory,
            &config.name,
            config.max_bytes,
            config.backup_count,
        )?;

        Ok(Self {
            shared: Arc::new(Shared {
                started_at,
                clock,
                sink: Mutex::new(sink),
            }),
        })
    }

    /// Returns a named logger handle bound to this facility's sink.
    ///
    /// Requesting the same name repeatedly yields functionally equivalent
    /// handles: they write to the same sink with the same layout. Each
    /// handle carries its own [`DelayContext`] for ad-hoc attributes.
    pub fn logger(&self, name: impl Into<String>) -> Logger {
        Logger {
            name: name.into(),
            context: DelayContext::new(self.shared.started_at, Arc::clone(&self.shared.clock)),
            shared: Arc::clone(&self.shared),
        }
    }

    /// The instant the facility was initialized; delays are measured from
    /// this point.
    pub fn started_at(&self) -> OffsetDateTime {
        self.shared.started_at
    }

    /// Path of the facility's active log file.
    pub fn active_log_path(&self) -> PathBuf {
        self.shared.sink().path().to_path_buf()
    }

    /// Builds a [`LineFormattingLayer`] that routes `tracing` events into
    /// this facility's sink.
    ///
    /// Use this directly (with `tracing::subscriber::with_default`, or
    /// composed into a custom subscriber) when the global dispatcher is
    /// owned elsewhere.
    pub fn layer(&self) -> LineFormattingLayer {
        LineFormattingLayer::new(Arc::clone(&self.shared))
    }

    /// Installs this facility as the global `tracing` subscriber, accepting
    /// events down to the debug level.
    ///
    /// # Errors
    ///
    /// Returns [`LoggerError::GlobalInit`] if a global subscriber is already
    /// installed; the existing subscriber is left untouched.
    pub fn init_global(&self) -> Result<(), LoggerError> {
        tracing_subscriber::registry()
            .with(tracing_subscriber::filter::LevelFilter::DEBUG)
            .with(self.layer())
            .try_init()?;
        Ok(())
    }
}

/// An identifier-scoped logging handle issued by [`LoggingFacility::logger`].
///
/// Every emit resolves the `delay` field through the handle's
/// [`DelayContext`] at format time, then writes the formatted line to the
/// facility's rotating sink.
#[derive(Clone, Debug)]
pub struct Logger {
    name: String,
    context: DelayContext,
    shared: Arc<Shared>,
}

impl Logger {
    /// The name this handle was issued under.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The handle's contextual field set.
    pub fn context(&self) -> &DelayContext {
        &self.context
    }

    /// Mutable access to the contextual field set, for assigning ad-hoc
    /// attributes.
    pub fn context_mut(&mut self) -> &mut DelayContext {
        &mut self.context
    }

    /// Writes one record at the given level.
    ///
    /// Pass `format_args!(..)` for templated messages:
    /// `logger.log(Level::Debug, format_args!("i = {}", 5))`.
    ///
    /// # Errors
    ///
    /// Write and rotation failures surface to the caller; a record is never
    /// silently dropped.
    pub fn log(&self, level: Level, message: impl fmt::Display) -> Result<(), LoggerError> {
        let line = format_line(&self.context.delay(), &self.name, level, &message);
        self.shared.write_line(&line)?;
        Ok(())
    }

    /// Writes a record at [`Level::Debug`].
    ///
    /// # Errors
    ///
    /// See [`Logger::log`].
    pub fn debug(&self, message: impl fmt::Display) -> Result<(), LoggerError> {
        self.log(Level::Debug, message)
    }

    /// Writes a record at [`Level::Info`].
    ///
    /// # Errors
    ///
    /// See [`Logger::log`].
    pub fn info(&self, message: impl fmt::Display) -> Result<(), LoggerError> {
        self.log(Level::Info, message)
    }

    /// Writes a record at [`Level::Warning`].
    ///
    /// # Errors
    ///
    /// See [`Logger::log`].
    pub fn warning(&self, message: impl fmt::Display) -> Result<(), LoggerError> {
        self.log(Level::Warning, message)
    }

    /// Writes a record at [`Level::Error`].
    ///
    /// # Errors
    ///
    /// See [`Logger::log`].
    pub fn error(&self, message: impl fmt::Display) -> Result<(), LoggerError> {
        self.log(Level::Error, message)
    }

    /// Writes a record at [`Level::Critical`].
    ///
    /// # Errors
    ///
    /// See [`Logger::log`].
    pub fn critical(&self, message: impl fmt::Display) -> Result<(), LoggerError> {
        self.log(Level::Critical, message)
    }
}
