//! Time and date utilities.
//!
//! All stored timestamps come from one [`TrackerClock`] pinned to a fixed UTC
//! offset (India Standard Time unless configured otherwise), so stored values
//! compare consistently no matter where the process runs.

use crate::error::{Result, TrackerError};
use chrono::{
    DateTime, FixedOffset, NaiveDate, NaiveDateTime, Offset, SecondsFormat, TimeZone, Utc,
};

/// Offset of India Standard Time from UTC, in seconds.
pub const IST_OFFSET_SECS: i32 = 5 * 3600 + 30 * 60;

/// Textual form accepted and produced for date fields.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Source of server-assigned timestamps in the configured timezone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackerClock {
    offset: FixedOffset,
}

impl Default for TrackerClock {
    fn default() -> Self {
        Self::ist()
    }
}

impl TrackerClock {
    /// Clock pinned to India Standard Time (UTC+05:30).
    #[must_use]
    pub fn ist() -> Self {
        Self {
            offset: FixedOffset::east_opt(IST_OFFSET_SECS).unwrap_or_else(|| Utc.fix()),
        }
    }

    #[must_use]
    pub const fn with_offset(offset: FixedOffset) -> Self {
        Self { offset }
    }

    #[must_use]
    pub const fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// Current instant in the configured timezone.
    #[must_use]
    pub fn now(&self) -> DateTime<FixedOffset> {
        Utc::now().with_timezone(&self.offset)
    }

    /// Render a timestamp for storage.
    ///
    /// Fixed-width microsecond precision keeps stored values sortable as text.
    #[must_use]
    pub fn to_storage(&self, at: DateTime<FixedOffset>) -> String {
        at.with_timezone(&self.offset)
            .to_rfc3339_opts(SecondsFormat::Micros, false)
    }

    /// Read back a stored timestamp, normalised to the configured timezone.
    ///
    /// Accepts RFC 3339 and SQLite's `YYYY-MM-DD HH:MM:SS` (read as local to
    /// the configured offset).
    ///
    /// # Errors
    ///
    /// Returns a validation error if the text is not a recognised timestamp.
    pub fn from_storage(&self, s: &str) -> Result<DateTime<FixedOffset>> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Ok(dt.with_timezone(&self.offset));
        }

        if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f") {
            if let Some(dt) = self.offset.from_local_datetime(&naive).single() {
                return Ok(dt);
            }
        }

        Err(TrackerError::validation(
            "timestamp",
            format!("unrecognised stored timestamp '{s}'"),
        ))
    }
}

/// Parse a configured offset such as `+05:30`, `-03:00`, `UTC` or `IST`.
///
/// # Errors
///
/// Returns a config error if the value is not a valid fixed offset.
pub fn parse_offset(value: &str) -> Result<FixedOffset> {
    let trimmed = value.trim();
    match trimmed.to_uppercase().as_str() {
        "IST" | "ASIA/KOLKATA" => return Ok(TrackerClock::ist().offset()),
        "UTC" | "Z" => return Ok(Utc.fix()),
        _ => {}
    }

    let invalid = || TrackerError::Config(format!("invalid timezone offset '{trimmed}'"));

    let (sign, rest) = match trimmed.as_bytes().first() {
        Some(b'+') => (1, &trimmed[1..]),
        Some(b'-') => (-1, &trimmed[1..]),
        _ => return Err(invalid()),
    };
    let (hours, minutes) = rest.split_once(':').unwrap_or((rest, "0"));
    let hours: i32 = hours.parse().map_err(|_| invalid())?;
    let minutes: i32 = minutes.parse().map_err(|_| invalid())?;
    if !(0..=23).contains(&hours) || !(0..=59).contains(&minutes) {
        return Err(invalid());
    }

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60)).ok_or_else(invalid)
}

/// Parse an optional `YYYY-MM-DD` due date from form input.
///
/// Empty input means "no due date".
///
/// # Errors
///
/// Returns a validation error with the user-facing message when the text is
/// not a calendar date in `YYYY-MM-DD` form.
pub fn parse_due_date(raw: Option<&str>) -> Result<Option<NaiveDate>> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };

    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .map(Some)
        .map_err(|_| TrackerError::validation("due_date", "Invalid due date format. Use YYYY-MM-DD."))
}

/// Render a date in the boundary format.
#[must_use]
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}
