use chrono::{DateTime, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;

/// One recorded price for a phone configuration at a point in time.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceObservation {
    pub model: String,
    pub color: String,
    pub ram: String,
    pub storage: String,
    pub price: Decimal,
    pub timestamp: NaiveDateTime,
}

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parse an observation timestamp.
///
/// Accepts ISO-8601 with or without offset, Athena's `YYYY-MM-DD HH:MM:SS.fff`
/// and bare dates (midnight). Offsets are dropped after parsing, keeping the
/// wall-clock time so the calendar date matches what the source wrote. The
/// offset is not stored, so `/api/data` renders such rows without it
/// (`2024-01-05T23:30:00+05:30` comes back as `2024-01-05T23:30:00`).
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_local());
    }

    for format in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(dt);
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

/// ISO-8601 rendering used by the API (`2024-01-01T10:00:00`, fraction only when present).
pub fn format_timestamp(timestamp: &NaiveDateTime) -> String {
    timestamp.format("%Y-%m-%dT%H:%M:%S%.f").to_string()
}
