//! Date/time parsing and token-based formatting
//!
//! Patterns use the tokens operators know from channel documentation
//! (`YYYY-MM-DD HH:mm:ss`) and also accept the common strftime aliases.
//!
//! Copyright (c) 2025 Channelmap Team
//! Licensed under the Apache-2.0 license

use super::coerce::excerpt;
use super::error::TransformError;
use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, NaiveDateTime, Offset, TimeZone, Timelike, Utc};
use serde_json::Value;

/// Output pattern used when a caller has none in mind
pub const DEFAULT_FORMAT: &str = "YYYY-MM-DD HH:mm:ss";

/// Recognized tokens, longest first so `YYYY` wins over `YY`
const TOKENS: &[(&str, Token)] = &[
    ("YYYY", Token::Year),
    ("SSS", Token::Millis),
    ("YY", Token::YearShort),
    ("MM", Token::Month),
    ("DD", Token::Day),
    ("HH", Token::Hour),
    ("mm", Token::Minute),
    ("ss", Token::Second),
    ("%Y", Token::Year),
    ("%y", Token::YearShort),
    ("%m", Token::Month),
    ("%d", Token::Day),
    ("%H", Token::Hour),
    ("%M", Token::Minute),
    ("%S", Token::Second),
    ("%%", Token::Percent),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token {
    Year,
    YearShort,
    Month,
    Day,
    Hour,
    Minute,
    Second,
    Millis,
    Percent,
}

impl Token {
    fn strftime(self) -> &'static str {
        match self {
            Token::Year => "%Y",
            Token::YearShort => "%y",
            Token::Month => "%m",
            Token::Day => "%d",
            Token::Hour => "%H",
            Token::Minute => "%M",
            Token::Second => "%S",
            Token::Millis => "%3f",
            Token::Percent => "%%",
        }
    }

    fn render(self, dt: &DateTime<FixedOffset>, out: &mut String) {
        let text = match self {
            Token::Year => format!("{:04}", dt.year()),
            Token::YearShort => format!("{:02}", dt.year().rem_euclid(100)),
            Token::Month => format!("{:02}", dt.month()),
            Token::Day => format!("{:02}", dt.day()),
            Token::Hour => format!("{:02}", dt.hour()),
            Token::Minute => format!("{:02}", dt.minute()),
            Token::Second => format!("{:02}", dt.second()),
            // Leap-second nanos exceed one second; clamp to keep three digits
            Token::Millis => format!("{:03}", (dt.nanosecond() / 1_000_000).min(999)),
            Token::Percent => "%".to_string(),
        };
        out.push_str(&text);
    }
}

/// Split a pattern into tokens and literal characters
fn scan(pattern: &str) -> Vec<Result<Token, char>> {
    let mut pieces = Vec::new();
    let mut rest = pattern;
    'outer: while let Some(ch) = rest.chars().next() {
        for (text, token) in TOKENS {
            if let Some(tail) = rest.strip_prefix(text) {
                pieces.push(Ok(*token));
                rest = tail;
                continue 'outer;
            }
        }
        pieces.push(Err(ch));
        rest = &rest[ch.len_utf8()..];
    }
    pieces
}

/// Render a date/time with a token pattern. Unknown text passes through.
pub fn format_date(dt: &DateTime<FixedOffset>, pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len() + 8);
    for piece in scan(pattern) {
        match piece {
            Ok(token) => token.render(dt, &mut out),
            Err(ch) => out.push(ch),
        }
    }
    out
}

/// Translate a token pattern into a chrono parse format
pub fn pattern_to_strftime(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len() + 8);
    for piece in scan(pattern) {
        match piece {
            Ok(token) => out.push_str(token.strftime()),
            Err('%') => out.push_str("%%"),
            Err(ch) => out.push(ch),
        }
    }
    out
}

/// Parse a JSON value into a date/time.
///
/// Numbers are Unix epoch seconds in UTC. Strings are tried as ISO-8601 first and
/// then with `hint` (a token pattern). Values without an offset are taken as UTC;
/// values with one keep it.
pub fn parse_date(value: &Value, hint: Option<&str>) -> Result<DateTime<FixedOffset>, TransformError> {
    match value {
        Value::Number(n) => n
            .as_f64()
            .and_then(from_epoch_seconds)
            .ok_or_else(|| {
                TransformError::coercion("datetime", excerpt(value), "epoch seconds out of range")
            }),
        Value::String(s) => {
            let text = s.trim();
            parse_iso(text)
                .or_else(|| hint.and_then(|pattern| parse_with_pattern(text, pattern)))
                .ok_or_else(|| {
                    let reason = match hint {
                        Some(pattern) => format!("not ISO-8601 and does not match {}", pattern),
                        None => "not an ISO-8601 date/time".to_string(),
                    };
                    TransformError::coercion("datetime", excerpt(value), reason)
                })
        }
        other => Err(TransformError::coercion(
            "datetime",
            excerpt(other),
            "expected a date string or epoch seconds",
        )),
    }
}

fn utc() -> FixedOffset {
    Utc.fix()
}

fn from_epoch_seconds(seconds: f64) -> Option<DateTime<FixedOffset>> {
    if !seconds.is_finite() || seconds.abs() > 1e15 {
        return None;
    }
    let whole = seconds.floor();
    let nanos = ((seconds - whole) * 1e9).round().min(999_999_999.0) as u32;
    DateTime::<Utc>::from_timestamp(whole as i64, nanos).map(|dt| dt.with_timezone(&utc()))
}

const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f%z",
];

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

fn parse_iso(text: &str) -> Option<DateTime<FixedOffset>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt);
    }

    let normalized = match text.strip_suffix(|c: char| c == 'Z' || c == 'z') {
        Some(head) => format!("{}+00:00", head),
        None => text.to_string(),
    };
    for format in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(&normalized, format) {
            return Some(dt);
        }
    }

    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Some(assume_utc(naive));
        }
    }

    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(assume_utc)
}

fn parse_with_pattern(text: &str, pattern: &str) -> Option<DateTime<FixedOffset>> {
    let format = pattern_to_strftime(pattern);
    if let Ok(dt) = DateTime::parse_from_str(text, &format) {
        return Some(dt);
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(text, &format) {
        return Some(assume_utc(naive));
    }
    NaiveDate::parse_from_str(text, &format)
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(assume_utc)
}

fn assume_utc(naive: NaiveDateTime) -> DateTime<FixedOffset> {
    utc().from_utc_datetime(&naive)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: Value) -> DateTime<FixedOffset> {
        parse_date(&value, None).unwrap()
    }

    #[test]
    fn test_iso_forms() {
        let dt = parse(json!("2024-03-15T09:30:00"));
        assert_eq!(format_date(&dt, DEFAULT_FORMAT), "2024-03-15 09:30:00");

        let dt = parse(json!("2024-03-15 09:30:00.250"));
        assert_eq!(format_date(&dt, "HH:mm:ss.SSS"), "09:30:00.250");

        let dt = parse(json!("2024-03-15"));
        assert_eq!(format_date(&dt, DEFAULT_FORMAT), "2024-03-15 00:00:00");

        let dt = parse(json!("2024-03-15T23:59:59Z"));
        assert_eq!(format_date(&dt, "YYYY/MM/DD"), "2024/03/15");

        let dt = parse(json!("2024-03-15 23:59:59Z"));
        assert_eq!(format_date(&dt, "HH:mm"), "23:59");
    }

    #[test]
    fn test_offset_keeps_wall_clock() {
        let dt = parse(json!("2024-03-15T09:30:00+08:00"));
        assert_eq!(format_date(&dt, DEFAULT_FORMAT), "2024-03-15 09:30:00");
        assert_eq!(dt.offset().local_minus_utc(), 8 * 3600);
    }

    #[test]
    fn test_epoch_seconds_are_utc() {
        let dt = parse(json!(0));
        assert_eq!(format_date(&dt, DEFAULT_FORMAT), "1970-01-01 00:00:00");

        let dt = parse(json!(1710495000.5));
        assert_eq!(format_date(&dt, "YYYY-MM-DD HH:mm:ss.SSS"), "2024-03-15 09:30:00.500");

        assert!(parse_date(&json!(1e20), None).is_err());
    }

    #[test]
    fn test_hint_format() {
        let value = json!("20240315093000");
        assert!(parse_date(&value, None).is_err());

        let dt = parse_date(&value, Some("YYYYMMDDHHmmss")).unwrap();
        assert_eq!(format_date(&dt, DEFAULT_FORMAT), "2024-03-15 09:30:00");

        let dt = parse_date(&json!("15/03/2024"), Some("DD/MM/YYYY")).unwrap();
        assert_eq!(format_date(&dt, "YYYY-MM-DD"), "2024-03-15");

        let dt = parse_date(&json!("15/03/2024 08:00"), Some("%d/%m/%Y %H:%M")).unwrap();
        assert_eq!(format_date(&dt, "HH:mm"), "08:00");
    }

    #[test]
    fn test_unparseable_inputs() {
        for bad in [json!("yesterday"), json!(true), Value::Null, json!({"t": 1})] {
            let err = parse_date(&bad, Some("YYYY-MM-DD")).unwrap_err();
            assert_eq!(err.kind(), "coercion");
        }
    }

    #[test]
    fn test_format_tokens_and_literals() {
        let dt = parse(json!("2009-07-04T05:06:07.089"));
        assert_eq!(format_date(&dt, "YY"), "09");
        assert_eq!(format_date(&dt, "%Y-%m-%d %H:%M:%S"), "2009-07-04 05:06:07");
        assert_eq!(format_date(&dt, "DD日 at HHh, 100%%"), "04日 at 05h, 100%");
        assert_eq!(format_date(&dt, "Q"), "Q");
        assert_eq!(format_date(&dt, ""), "");
    }

    #[test]
    fn test_pattern_to_strftime() {
        assert_eq!(pattern_to_strftime("YYYY-MM-DD HH:mm:ss"), "%Y-%m-%d %H:%M:%S");
        assert_eq!(pattern_to_strftime("HH:mm:ss.SSS"), "%H:%M:%S.%3f");
        assert_eq!(pattern_to_strftime("100% DD"), "100%% %d");
    }
}
