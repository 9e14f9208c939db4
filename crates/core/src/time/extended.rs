//! Date conversions and time-unit arithmetic.
//!
//! Unit conversions use a 4-week month and a 12-month year so every unit in a
//! [`TimeUnits`] is derived from the same millisecond count. `YEAR_IN_MS` is
//! the Gregorian average and is exported for callers that need calendar years.

use chrono::{DateTime, FixedOffset, Local, TimeZone, Utc};
use serde::Serialize;

pub const SECOND_IN_MS: i64 = 1_000;
pub const MINUTE_IN_MS: i64 = 60_000;
pub const HOUR_IN_MS: i64 = 3_600_000;
pub const DAY_IN_MS: i64 = 86_400_000;
pub const WEEK_IN_MS: i64 = 604_800_000;
pub const MONTH_IN_MS: i64 = 2_419_200_000;
pub const YEAR_IN_MS: i64 = 31_556_952_000;

/// Anything that can name a point in time.
#[derive(Debug, Clone, PartialEq)]
pub enum DateInput {
    DateTime(DateTime<FixedOffset>),
    /// RFC 3339 or RFC 2822 text.
    Text(String),
    /// Milliseconds since the Unix epoch.
    Millis(i64),
}

impl DateInput {
    /// Resolve to a concrete instant, or `None` when the input is unparsable
    /// or out of range.
    pub fn resolve(&self) -> Option<DateTime<FixedOffset>> {
        match self {
            DateInput::DateTime(dt) => Some(*dt),
            DateInput::Text(s) => {
                let s = s.trim();
                DateTime::parse_from_rfc3339(s)
                    .or_else(|_| DateTime::parse_from_rfc2822(s))
                    .ok()
            }
            DateInput::Millis(ms) => {
                DateTime::<Utc>::from_timestamp_millis(*ms).map(|dt| dt.fixed_offset())
            }
        }
    }
}

impl From<DateTime<FixedOffset>> for DateInput {
    fn from(value: DateTime<FixedOffset>) -> Self {
        Self::DateTime(value)
    }
}

impl From<DateTime<Utc>> for DateInput {
    fn from(value: DateTime<Utc>) -> Self {
        Self::DateTime(value.fixed_offset())
    }
}

impl From<DateTime<Local>> for DateInput {
    fn from(value: DateTime<Local>) -> Self {
        Self::DateTime(value.fixed_offset())
    }
}

impl From<&str> for DateInput {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for DateInput {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for DateInput {
    fn from(value: i64) -> Self {
        Self::Millis(value)
    }
}

/// Express an instant in the machine's local time zone.
pub fn to_local_time(date: impl Into<DateInput>) -> Option<DateTime<Local>> {
    date.into().resolve().map(|dt| dt.with_timezone(&Local))
}

/// Express an instant in UTC.
pub fn to_utc(date: impl Into<DateInput>) -> Option<DateTime<Utc>> {
    date.into().resolve().map(|dt| dt.with_timezone(&Utc))
}

/// A duration expressed in every supported unit at once.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TimeUnits {
    pub milliseconds: f64,
    pub seconds: f64,
    pub minutes: f64,
    pub hours: f64,
    pub days: f64,
    pub weeks: f64,
    pub months: f64,
    pub years: f64,
}

impl TimeUnits {
    pub fn from_millis(milliseconds: f64) -> Self {
        let seconds = milliseconds / SECOND_IN_MS as f64;
        let minutes = seconds / 60.0;
        let hours = minutes / 60.0;
        let days = hours / 24.0;
        let weeks = days / 7.0;
        let months = weeks / 4.0;
        let years = months / 12.0;

        Self {
            milliseconds,
            seconds,
            minutes,
            hours,
            days,
            weeks,
            months,
            years,
        }
    }
}

/// Elapsed time from `previous` to `recent` (negative when reversed).
pub fn difference<A: TimeZone, B: TimeZone>(recent: &DateTime<A>, previous: &DateTime<B>) -> TimeUnits {
    let ms = recent.timestamp_millis() - previous.timestamp_millis();
    TimeUnits::from_millis(ms as f64)
}

/// A quantity of some time unit, either numeric or as text.
#[derive(Debug, Clone, PartialEq)]
pub enum TimeUnit {
    Number(f64),
    Text(String),
}

impl TimeUnit {
    /// Numeric value; text is parsed and rounded to four decimal places.
    pub fn value(&self) -> Option<f64> {
        let n = match self {
            TimeUnit::Number(n) => *n,
            TimeUnit::Text(s) => {
                let parsed: f64 = s.trim().parse().ok()?;
                (parsed * 10_000.0).round() / 10_000.0
            }
        };
        n.is_finite().then_some(n)
    }
}

impl From<f64> for TimeUnit {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i64> for TimeUnit {
    fn from(value: i64) -> Self {
        Self::Number(value as f64)
    }
}

impl From<&str> for TimeUnit {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for TimeUnit {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

fn convert(
    amount: impl Into<TimeUnit>,
    unit_ms: f64,
    pin: fn(&mut TimeUnits, f64),
) -> Option<TimeUnits> {
    let value = amount.into().value()?;
    let mut units = TimeUnits::from_millis(value * unit_ms);
    // Keep the caller's own unit exact rather than round-tripped.
    pin(&mut units, value);
    Some(units)
}

pub fn convert_milliseconds(ms: impl Into<TimeUnit>) -> Option<TimeUnits> {
    convert(ms, 1.0, |u, v| u.milliseconds = v)
}

pub fn convert_seconds(sec: impl Into<TimeUnit>) -> Option<TimeUnits> {
    convert(sec, SECOND_IN_MS as f64, |u, v| u.seconds = v)
}

pub fn convert_minutes(min: impl Into<TimeUnit>) -> Option<TimeUnits> {
    convert(min, MINUTE_IN_MS as f64, |u, v| u.minutes = v)
}

pub fn convert_hours(hr: impl Into<TimeUnit>) -> Option<TimeUnits> {
    convert(hr, HOUR_IN_MS as f64, |u, v| u.hours = v)
}

pub fn convert_days(days: impl Into<TimeUnit>) -> Option<TimeUnits> {
    convert(days, DAY_IN_MS as f64, |u, v| u.days = v)
}

pub fn convert_weeks(weeks: impl Into<TimeUnit>) -> Option<TimeUnits> {
    convert(weeks, WEEK_IN_MS as f64, |u, v| u.weeks = v)
}

pub fn convert_months(mo: impl Into<TimeUnit>) -> Option<TimeUnits> {
    convert(mo, MONTH_IN_MS as f64, |u, v| u.months = v)
}

pub fn convert_years(yr: impl Into<TimeUnit>) -> Option<TimeUnits> {
    convert(yr, (MONTH_IN_MS * 12) as f64, |u, v| u.years = v)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn text_inputs_parse_as_rfc3339_or_rfc2822() {
        let a = to_utc("2024-03-09T14:05:07+02:00").unwrap();
        let b = to_utc("Sat, 09 Mar 2024 12:05:07 GMT").unwrap();
        assert_eq!(a, b);
        assert_eq!(a, Utc.with_ymd_and_hms(2024, 3, 9, 12, 5, 7).unwrap());
    }

    #[test]
    fn millis_input_is_epoch_based() {
        let dt = to_utc(86_400_000i64).unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(1970, 1, 2, 0, 0, 0).unwrap());
    }

    #[test]
    fn unparsable_input_yields_none() {
        assert!(to_utc("not a date").is_none());
        assert!(to_local_time("").is_none());
    }

    #[test]
    fn local_time_preserves_the_instant() {
        let utc = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let local = to_local_time(utc).unwrap();
        assert_eq!(local.timestamp_millis(), utc.timestamp_millis());
    }

    #[test]
    fn difference_spans_all_units() {
        let previous = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let recent = Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap();

        let diff = difference(&recent, &previous);
        assert_eq!(diff.milliseconds, (14 * DAY_IN_MS) as f64);
        assert_eq!(diff.days, 14.0);
        assert_eq!(diff.weeks, 2.0);
        assert_eq!(diff.months, 0.5);

        let reversed = difference(&previous, &recent);
        assert_eq!(reversed.days, -14.0);
    }

    #[test]
    fn convert_hours_fills_every_unit() {
        let units = convert_hours(2i64).unwrap();
        assert_eq!(units.hours, 2.0);
        assert_eq!(units.minutes, 120.0);
        assert_eq!(units.seconds, 7_200.0);
        assert_eq!(units.milliseconds, 7_200_000.0);
        assert_eq!(units.days, 2.0 / 24.0);
    }

    #[test]
    fn month_and_year_use_four_week_months() {
        let month = convert_months(1i64).unwrap();
        assert_eq!(month.weeks, 4.0);
        assert_eq!(month.days, 28.0);

        let year = convert_years(1i64).unwrap();
        assert_eq!(year.months, 12.0);
        assert_eq!(year.weeks, 48.0);
    }

    #[test]
    fn numeric_text_is_accepted_and_rounded() {
        let units = convert_minutes("1.500049").unwrap();
        assert_eq!(units.minutes, 1.5);
        assert_eq!(units.seconds, 90.0);

        assert_eq!(convert_years(" 1.5 ").unwrap().months, 18.0);
    }

    #[test]
    fn garbage_and_non_finite_inputs_yield_none() {
        assert!(convert_seconds("abc").is_none());
        assert!(convert_days(f64::NAN).is_none());
        assert!(convert_weeks(f64::INFINITY).is_none());
    }

    proptest! {
        #[test]
        fn seconds_and_millis_agree(ms in -1_000_000_000i64..1_000_000_000i64) {
            let units = convert_milliseconds(ms).unwrap();
            let back = convert_seconds(units.seconds).unwrap();
            prop_assert!((back.milliseconds - ms as f64).abs() < 1e-3);
        }
    }
}
