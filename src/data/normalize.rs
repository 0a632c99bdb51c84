//! Normalization of reading payloads into a canonical [`Reading`].
//!
//! The backend answers `GET /leituras` in one of two shapes, and the two
//! consumers that were written against it disagree on where the most recent
//! element sits:
//!
//! | Shape                       | Assumed order        | Most recent |
//! |-----------------------------|----------------------|-------------|
//! | `{"leituras": [..]}`        | ascending            | last        |
//! | bare `[..]`                 | descending           | first       |
//!
//! Both assumptions are kept as found. With `limite=1` the list has a single
//! element and the distinction vanishes; with larger limits the two shapes
//! can yield different readings for the same underlying data. This is a
//! contract ambiguity on the backend side, not something to resolve here.
//!
//! Temperature, humidity and light are required. A backend that never
//! reports `luminosidade` (the stock sensor simulator posts no light value)
//! therefore fails every cycle with a parse error, and neither the dashboard
//! nor the overlay ever leaves its placeholder state, even though the
//! overlay does not display light.

use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use super::reading::Reading;
use crate::error::TelemetryError;
use crate::source::wire::{WireReading, WireTimestamp, READINGS_KEY};

/// Naive timestamp layouts accepted in addition to RFC 3339.
const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Which of the two accepted payload shapes a body uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadShape {
    /// `{"leituras": [...]}`, chronological ascending.
    Wrapped,
    /// A bare list, chronological descending.
    Bare,
}

impl PayloadShape {
    /// Classify a payload and borrow its reading list.
    pub fn detect(raw: &Value) -> Result<(Self, &[Value]), TelemetryError> {
        match raw {
            Value::Object(map) => match map.get(READINGS_KEY) {
                Some(Value::Array(items)) => Ok((PayloadShape::Wrapped, items.as_slice())),
                Some(_) => Err(TelemetryError::Parse(format!(
                    "`{}` is not a list",
                    READINGS_KEY
                ))),
                None => Err(TelemetryError::Parse(format!(
                    "object payload has no `{}` list",
                    READINGS_KEY
                ))),
            },
            Value::Array(items) => Ok((PayloadShape::Bare, items.as_slice())),
            _ => Err(TelemetryError::Parse(
                "payload is neither an object nor a list".to_string(),
            )),
        }
    }

    /// Pick the element this shape considers most recent.
    pub fn most_recent<'a>(&self, items: &'a [Value]) -> Option<&'a Value> {
        match self {
            PayloadShape::Wrapped => items.last(),
            PayloadShape::Bare => items.first(),
        }
    }
}

/// Convert a raw reading payload into the most recent canonical reading.
///
/// `received_at` stands in for the timestamp when the payload carries none
/// (or one that cannot be parsed).
///
/// Returns [`TelemetryError::EmptyData`] for an empty list and
/// [`TelemetryError::Parse`] when the shape or the selected element is
/// malformed.
pub fn normalize(raw: &Value, received_at: DateTime<Utc>) -> Result<Reading, TelemetryError> {
    let (shape, items) = PayloadShape::detect(raw)?;
    let item = shape.most_recent(items).ok_or(TelemetryError::EmptyData)?;
    let wire = WireReading::deserialize(item)?;
    Ok(to_reading(wire, received_at))
}

/// Map a decoded wire reading onto the canonical type.
pub fn to_reading(wire: WireReading, received_at: DateTime<Utc>) -> Reading {
    let timestamp = match wire.timestamp.as_ref() {
        Some(ts) => parse_timestamp(ts).unwrap_or_else(|| {
            debug!(?ts, "Unparseable reading timestamp, using receipt time");
            received_at
        }),
        None => received_at,
    };

    Reading {
        timestamp,
        temperature: wire.temperatura,
        humidity: wire.umidade,
        light: wire.luminosidade,
        air_quality: wire.air_quality(),
        led_active: wire.led_ativo.unwrap_or(false),
        faces_detected: wire.faces(),
    }
}

/// Parse a backend timestamp.
///
/// Offset-less strings are taken as the backend host's local time, which is
/// how the backend writes them.
pub fn parse_timestamp(ts: &WireTimestamp) -> Option<DateTime<Utc>> {
    match ts {
        WireTimestamp::Millis(ms) => DateTime::from_timestamp_millis(*ms),
        WireTimestamp::Text(s) => {
            let s = s.trim();
            if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
                return Some(dt.with_timezone(&Utc));
            }
            NAIVE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
                .and_then(|naive| Local.from_local_datetime(&naive).earliest())
                .map(|dt| dt.with_timezone(&Utc))
        }
    }
}
