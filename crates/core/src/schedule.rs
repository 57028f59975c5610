//! Weekly opening-hours evaluation for centers.
//!
//! Times are compared as zero-padded 24-hour `HH:MM` strings in the facility's local time. The
//! caller supplies the reference instant; nothing here reads the clock or converts time zones.

use chrono::{Datelike, NaiveDateTime, Timelike, Weekday};
use serde::{Deserialize, Deserializer, Serialize};

/// One weekly opening range as sent by the centers API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub center_id: Option<u64>,
    /// English weekday name, e.g. `"Sunday"`.
    pub day: String,
    pub start_time: String,
    pub end_time: String,
    #[serde(default, deserialize_with = "bool_or_int")]
    pub is_active: bool,
}

impl Schedule {
    pub fn new(day: &str, start_time: &str, end_time: &str, is_active: bool) -> Self {
        Self {
            id: None,
            center_id: None,
            day: day.into(),
            start_time: start_time.into(),
            end_time: end_time.into(),
            is_active,
        }
    }

    fn applies_on(&self, weekday: Weekday) -> bool {
        self.is_active && self.day.trim().eq_ignore_ascii_case(weekday_name(weekday))
    }

    /// Normalised `(start, end)` pair, or `None` when either time is malformed.
    fn range(&self) -> Option<(String, String)> {
        Some((clock_time(&self.start_time)?, clock_time(&self.end_time)?))
    }
}

/// Laravel serialises booleans as `0`/`1` on some endpoints.
fn bool_or_int<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
        Text(String),
    }

    Ok(match Option::<Flag>::deserialize(deserializer)? {
        Some(Flag::Bool(b)) => b,
        Some(Flag::Int(n)) => n != 0,
        Some(Flag::Text(s)) => matches!(s.trim(), "1" | "true" | "True" | "TRUE"),
        None => false,
    })
}

/// Result of evaluating a center's schedules at one instant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScheduleStatus {
    pub open: bool,
    /// `"start – end"` for every active, well-formed range today, in source order.
    pub today_ranges: Vec<String>,
}

/// Canonical English weekday name.
pub fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// Normalise `HH:MM` or `HH:MM:SS` to `HH:MM`. Anything else is `None`.
fn clock_time(value: &str) -> Option<String> {
    let value = value.trim();
    let hhmm = match value.len() {
        5 => value,
        8 if value.as_bytes()[5] == b':' => &value[..5],
        _ => return None,
    };
    let bytes = hhmm.as_bytes();
    let digits_ok = [0, 1, 3, 4].iter().all(|&i| bytes[i].is_ascii_digit());
    if !digits_ok || bytes[2] != b':' {
        return None;
    }
    let hours: u32 = hhmm[..2].parse().ok()?;
    let minutes: u32 = hhmm[3..].parse().ok()?;
    (hours < 24 && minutes < 60).then(|| hhmm.to_string())
}

/// Whether any active range for `now`'s weekday contains `now` (both ends inclusive).
pub fn is_open_now(schedules: &[Schedule], now: NaiveDateTime) -> bool {
    let current = format!("{:02}:{:02}", now.hour(), now.minute());
    schedules
        .iter()
        .filter(|s| s.applies_on(now.weekday()))
        .filter_map(Schedule::range)
        .any(|(start, end)| start <= current && current <= end)
}

/// Display strings for today's active ranges, in source order.
pub fn today_ranges(schedules: &[Schedule], now: NaiveDateTime) -> Vec<String> {
    schedules
        .iter()
        .filter(|s| s.applies_on(now.weekday()))
        .filter_map(Schedule::range)
        .map(|(start, end)| format!("{start} – {end}"))
        .collect()
}

pub fn evaluate(schedules: &[Schedule], now: NaiveDateTime) -> ScheduleStatus {
    ScheduleStatus {
        open: is_open_now(schedules, now),
        today_ranges: today_ranges(schedules, now),
    }
}
