//! A [`tracing_subscriber::Layer`] that routes `tracing` events into the
//! facility's rotating sink.

use std::{fmt, sync::Arc};

use tracing::{
    field::{Field, Visit},
    Event, Subscriber,
};
use tracing_subscriber::{layer::Context, Layer};

use crate::facility::{format_line, Level, Shared};

/// A [`tracing_subscriber::Layer`] that renders events with the facility's
/// fixed-width line layout and writes them to its rotating sink.
///
/// The logical logger name is taken from a `logger` field on the event if
/// present, falling back to the last segment of the event's target. Levels
/// map onto the facility's: `ERROR` to [`Level::Error`], `WARN` to
/// [`Level::Warning`], `INFO` to [`Level::Info`], and both `DEBUG` and
/// `TRACE` to [`Level::Debug`].
///
/// Obtain one via [`LoggingFacility::layer`][crate::LoggingFacility::layer].
#[derive(Clone, Debug)]
pub struct LineFormattingLayer {
    shared: Arc<Shared>,
}

impl LineFormattingLayer {
    pub(crate) fn new(shared: Arc<Shared>) -> Self {
        Self { shared }
    }
}

/// Captures the `message` and `logger` fields of an event.
#[derive(Debug, Default)]
struct EventVisitor {
    message: Option<String>,
    logger: Option<String>,
}

impl Visit for EventVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        match field.name() {
            "message" => self.message = Some(value.to_string()),
            "logger" => self.logger = Some(value.to_string()),
            _ => (),
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        match field.name() {
            // Only use debug if `record_str()` hasn't set it
            "message" if self.message.is_none() => self.message = Some(format!("{value:?}")),
            "logger" if self.logger.is_none() => self.logger = Some(format!("{value:?}")),
            _ => (),
        }
    }
}

fn map_level(level: tracing::Level) -> Level {
    match level {
        tracing::Level::ERROR => Level::Error,
        tracing::Level::WARN => Level::Warning,
        tracing::Level::INFO => Level::Info,
        _ => Level::Debug,
    }
}

impl<S: Subscriber> Layer<S> for LineFormattingLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = EventVisitor::default();
        event.record(&mut visitor);

        let metadata = event.metadata();
        let name = visitor.logger.unwrap_or_else(|| {
            metadata
                .target()
                .rsplit("::")
                .next()
                .unwrap_or_else(|| metadata.target())
                .to_string()
        });
        let message = visitor
            .message
            .unwrap_or_else(|| metadata.target().to_string());

        let line = format_line(
            &self.shared.delay(),
            &name,
            map_level(*metadata.level()),
            &message,
        );
        // A layer has no error channel; failed writes are dropped here.
        let _ = self.shared.write_line(&line);
    }
}
