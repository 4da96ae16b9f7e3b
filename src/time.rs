//! Date and Clock Utilities Module
//!
//! Provides day-of-year arithmetic, date parsing, and hour formatting.

use chrono::{Datelike, NaiveDate, Utc};
use chrono_english::{Dialect, parse_date_string};
use chrono_tz::Tz;
use iana_time_zone::get_timezone;

use crate::error::{Result, SunfitError};

// ===================== CONSTANTS =====================

/// Date the built-in reference observations were taken on.
pub const REFERENCE_DATE: &str = "2024-02-14";

// ===================== DAY OF YEAR =====================

/// Day-of-year with January 1 as day 1.
///
/// Counts whole days since December 31 of the previous year. Works on a pure
/// calendar date, so there is no midnight or DST drift to correct for.
pub fn day_of_year(date: NaiveDate) -> u32 {
    // Dec 31 is only missing below chrono's minimum year
    NaiveDate::from_ymd_opt(date.year() - 1, 12, 31)
        .map_or(date.ordinal(), |anchor| date.signed_duration_since(anchor).num_days() as u32)
}

// ===================== DATE PARSING =====================

/// Get the system's configured timezone.
///
/// Falls back to UTC if the system timezone cannot be determined.
pub fn system_timezone() -> Tz {
    get_timezone().ok().and_then(|s| s.parse().ok()).unwrap_or(Tz::UTC)
}

/// Parse a target date.
///
/// Accepts ISO `YYYY-MM-DD` first, then English expressions such as "today" or
/// "next friday", resolved against the current time in `tz`.
pub fn parse_date(s: &str, tz: Tz) -> Result<NaiveDate> {
    let trimmed = s.trim();
    if let Ok(d) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(d);
    }
    let anchor = Utc::now().with_timezone(&tz);
    parse_date_string(trimmed, anchor, Dialect::Us)
        .map(|dt| dt.date_naive())
        .map_err(|e| SunfitError::InvalidDate { input: s.to_string(), reason: e.to_string() })
}

// ===================== FORMATTING =====================

/// Format fractional hours as `H:MM` on a 24-hour clock.
///
/// Values outside [0, 24) wrap around the clock first. Minutes are truncated,
/// not rounded: 6.583 h is "6:34".
pub fn format_hour(hours: f64) -> String {
    let mut wrapped = hours.rem_euclid(24.0);
    // rem_euclid of a tiny negative value can round up to exactly 24.0
    if wrapped >= 24.0 {
        wrapped = 0.0;
    }
    let whole = wrapped.floor();
    let minutes = (((wrapped - whole) * 60.0).floor() as u32).min(59);
    format!("{}:{:02}", whole as u32, minutes)
}

/// Parse a clock reading such as "7:16" or "17,30" into fractional hours.
///
/// A bare number is taken as hours already.
pub fn parse_clock(s: &str) -> Option<f64> {
    let mut parts = s.trim().split([':', ',']);
    let h: f64 = parts.next()?.trim().parse().ok()?;
    let m: f64 = match parts.next() {
        Some(m) => m.trim().parse().ok()?,
        None => 0.0,
    };
    let sec: f64 = match parts.next() {
        Some(sec) => sec.trim().parse().ok()?,
        None => 0.0,
    };
    if parts.next().is_some()
        || !h.is_finite()
        || !(0.0..60.0).contains(&m)
        || !(0.0..60.0).contains(&sec)
    {
        return None;
    }
    Some(h + m / 60.0 + sec / 3600.0)
}

// ===================== TESTS =====================
