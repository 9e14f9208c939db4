//! Date/time helpers shared by the models and the HTTP client.

pub mod extended;
pub mod util;

pub use extended::{
    DAY_IN_MS, DateInput, HOUR_IN_MS, MINUTE_IN_MS, MONTH_IN_MS, SECOND_IN_MS, TimeUnit,
    TimeUnits, WEEK_IN_MS, YEAR_IN_MS, convert_days, convert_hours, convert_milliseconds,
    convert_minutes, convert_months, convert_seconds, convert_weeks, convert_years, difference,
    to_local_time, to_utc,
};
pub use util::{
    current_time_iso, current_time_utc, current_utc_millis, to_iso_string, to_utc_string,
    utc_offset_minutes,
};
