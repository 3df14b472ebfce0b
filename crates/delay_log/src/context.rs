//! Per-record contextual fields, chiefly the elapsed-time `delay` field.

use std::sync::Arc;

use time::OffsetDateTime;

use crate::clock::Clock;

/// Placeholder returned by [`DelayContext::get`] for field names that were
/// never assigned.
pub const PLACEHOLDER: &str = "?";

/// The reserved name of the computed elapsed-time field.
const DELAY_KEY: &str = "delay";

/// Supplies per-record contextual fields for a logger handle.
///
/// The `delay` field is never stored: it is recomputed on every read as the
/// time elapsed since the owning facility started. Any other field is an
/// ad-hoc attribute assigned via [`DelayContext::set`]; looking up a name
/// that was never assigned yields [`PLACEHOLDER`] rather than failing.
///
/// A context only exists with a start timestamp inside it, so there is no
/// way to observe a delay before the facility has been initialized.
#[derive(Clone, Debug)]
pub struct DelayContext {
    started_at: OffsetDateTime,
    clock: Arc<dyn Clock>,
    attributes: Vec<(String, String)>,
}

impl DelayContext {
    pub(crate) fn new(started_at: OffsetDateTime, clock: Arc<dyn Clock>) -> Self {
        Self {
            started_at,
            clock,
            attributes: Vec::new(),
        }
    }

    /// Renders the time elapsed since the facility started, in the
    /// `H:MM:SS.ffffff` form: hours unpadded, minutes and seconds two
    /// digits, six fractional digits. The fraction is omitted when the
    /// microsecond part is zero. Negative intervals clamp to zero.
    pub fn delay(&self) -> String {
        format_delay(self.clock.now() - self.started_at)
    }

    /// Resolves a field by name.
    ///
    /// `"delay"` resolves through [`DelayContext::delay`]; any other name
    /// returns the assigned attribute value, or [`PLACEHOLDER`] if the name
    /// was never assigned. Never fails.
    pub fn get(&self, name: &str) -> String {
        if name == DELAY_KEY {
            return self.delay();
        }
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map_or_else(|| PLACEHOLDER.to_string(), |(_, value)| value.clone())
    }

    /// Assigns an ad-hoc attribute, overwriting any previous value for the
    /// same name while preserving its position in assignment order.
    ///
    /// Assigning the reserved name `"delay"` is skipped with a warning.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        if name == DELAY_KEY {
            tracing::warn!("Attempting to assign the reserved field `delay`. Skipping.");
            return;
        }
        let value = value.into();
        if let Some(slot) = self.attributes.iter_mut().find(|(key, _)| *key == name) {
            slot.1 = value;
        } else {
            self.attributes.push((name, value));
        }
    }

    /// Yields every field name held by this context: `"delay"` first,
    /// followed by ad-hoc attributes in assignment order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(DELAY_KEY).chain(self.attributes.iter().map(|(key, _)| key.as_str()))
    }
}

/// Renders an elapsed duration as `H:MM:SS` with an optional six-digit
/// microsecond fraction.
pub(crate) fn format_delay(elapsed: time::Duration) -> String {
    let total_micros = elapsed.whole_microseconds().max(0);
    let total_seconds = total_micros / 1_000_000;
    let micros = total_micros % 1_000_000;

    let hours = total_seconds / 3600;
    let minutes = (total_seconds / 60) % 60;
    let seconds = total_seconds % 60;

    if micros == 0 {
        format!("{hours}:{minutes:02}:{seconds:02}")
    } else {
        format!("{hours}:{minutes:02}:{seconds:02}.{micros:06}")
    }
}
