//! Current-time helpers and string renderings.

use chrono::{DateTime, FixedOffset, SecondsFormat, TimeZone, Utc};

/// HTTP-date layout, identical to what browsers emit for `toUTCString`.
const UTC_STRING_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// Current time rendered as an HTTP date (`Thu, 15 Oct 2026 09:30:00 GMT`).
pub fn current_time_utc() -> String {
    to_utc_string(&Utc::now())
}

/// Current time as RFC 3339 with millisecond precision and a `Z` suffix.
pub fn current_time_iso() -> String {
    to_iso_string(&Utc::now())
}

/// Milliseconds since the Unix epoch.
pub fn current_utc_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Minutes the given local time is *behind* UTC.
///
/// Follows the browser sign convention: UTC+02:00 yields `-120`.
pub fn utc_offset_minutes(date: &DateTime<FixedOffset>) -> i32 {
    -(date.offset().local_minus_utc() / 60)
}

pub fn to_utc_string<Tz: TimeZone>(date: &DateTime<Tz>) -> String {
    date.with_timezone(&Utc).format(UTC_STRING_FORMAT).to_string()
}

pub fn to_iso_string<Tz: TimeZone>(date: &DateTime<Tz>) -> String {
    date.with_timezone(&Utc)
        .to_rfc3339_opts(SecondsFormat::Millis, true)
}
