//! Date parsing shared by both targets.
use chrono::{DateTime, Datelike, NaiveDateTime, Timelike, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

/// The only profile recognised on untyped strings: `YYYY-MM-DDTHH:MM:SSZ`.
static STRICT_DATETIME: Lazy<Regex> =
    Lazy::new(|| {
        Regex::new(r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}Z$").expect("date pattern compiles")
    });

pub fn parse_strict(raw: &str) -> Option<DateTime<Utc>> {
    if !STRICT_DATETIME.is_match(raw) {
        return None;
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%SZ")
        .ok()
        .map(|naive| naive.and_utc())
}

pub fn is_strict_datetime(raw: &str) -> bool {
    parse_strict(raw).is_some()
}

/// Instant of an explicitly date-typed value: RFC 3339 text (normalised to
/// UTC) or integer epoch seconds.
pub fn parse_instant(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(raw) => DateTime::parse_from_rfc3339(raw.trim())
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
        Value::Number(n) => n.as_i64().and_then(|secs| DateTime::from_timestamp(secs, 0)),
        _ => None,
    }
}

/// Calendar fields of an instant, month 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Components {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
    pub nanosecond: u32,
}

impl Components {
    pub fn of(instant: &DateTime<Utc>) -> Self {
        Components {
            year: instant.year(),
            month: instant.month(),
            day: instant.day(),
            hour: instant.hour(),
            minute: instant.minute(),
            second: instant.second(),
            nanosecond: instant.nanosecond() % 1_000_000_000,
        }
    }

    pub fn millisecond(&self) -> u32 {
        self.nanosecond / 1_000_000
    }
}

/// Text shown inside an invalid-value marker.
pub fn display_raw(value: &Value) -> String {
    match value {
        Value::String(raw) => raw.clone(),
        other => other.to_string(),
    }
}

/// `/* invalid date: "x" */`, safe to embed in a block comment.
pub fn invalid_marker(what: &str, value: &Value) -> String {
    let quoted = Value::String(display_raw(value)).to_string();
    format!("/* invalid {what}: {} */", quoted.replace("*/", "* /"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn strict_profile_only() {
        assert!(is_strict_datetime("2023-01-01T00:00:00Z"));
        assert!(!is_strict_datetime("2023-01-01T00:00:00+02:00"));
        assert!(!is_strict_datetime("2023-01-01"));
        assert!(!is_strict_datetime("2023-13-01T00:00:00Z"));
    }

    #[test]
    fn explicit_dates_accept_offsets_and_epochs() {
        let shifted = parse_instant(&json!("2023-01-01T02:00:00+02:00")).unwrap();
        assert_eq!(shifted.timestamp(), 1_672_531_200);
        let epoch = parse_instant(&json!(1_672_531_200)).unwrap();
        assert_eq!(Components::of(&epoch).year, 2023);
        assert!(parse_instant(&json!("not-a-date")).is_none());
    }

    #[test]
    fn fractional_seconds_survive() {
        let instant = parse_instant(&json!("2024-02-29T12:30:45.250Z")).unwrap();
        let parts = Components::of(&instant);
        assert_eq!((parts.month, parts.day, parts.second), (2, 29, 45));
        assert_eq!(parts.millisecond(), 250);
    }

    #[test]
    fn markers_cannot_close_comments() {
        assert_eq!(invalid_marker("date", &json!("a*/b")), r#"/* invalid date: "a* /b" */"#);
    }
}
