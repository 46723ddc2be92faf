//! Time normalization — heterogeneous spreadsheet time values to `HH:MM`.
//!
//! Sheets encodes times as a numeric fraction of a day; humans type anything
//! from "14:30" to "2:30 PM" to garbage. Every input maps to a string: the
//! canonical 24-hour `HH:MM` when a form matches, the trimmed original when
//! nothing does. No branch errors.

use chrono::NaiveTime;
use serde_json::Value;

/// Strict formats tried in order before the loose fallback.
const STRICT_FORMATS: [&str; 3] = ["%H:%M", "%I:%M %p", "%I:%M:%S %p"];

/// Normalize a raw cell value (numeric day-fraction or string).
pub fn normalize_value(value: &Value) -> String {
    match value {
        Value::Number(n) => n.as_f64().map(from_day_fraction).unwrap_or_default(),
        Value::String(s) => normalize(s),
        Value::Null => String::new(),
        other => normalize(&other.to_string()),
    }
}

/// Normalize a string time representation.
pub fn normalize(raw: &str) -> String {
    let trimmed = raw.trim();
    for fmt in STRICT_FORMATS {
        if let Ok(t) = NaiveTime::parse_from_str(trimmed, fmt) {
            return t.format("%H:%M").to_string();
        }
    }
    if let Some(hhmm) = leading_hhmm(trimmed) {
        return hhmm;
    }
    trimmed.to_string()
}

/// Convert a fraction of a 24-hour day into zero-padded `HH:MM`,
/// rounded to the nearest whole second. Clamped below midnight so the
/// result is always a valid clock time.
pub fn from_day_fraction(fraction: f64) -> String {
    let seconds = ((fraction * 86_400.0).round() as i64).min(86_399);
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    format!("{hours:02}:{minutes:02}")
}

/// Loose extraction of a leading `H:MM` / `HH:MM` pattern, hour zero-padded.
fn leading_hhmm(s: &str) -> Option<String> {
    let bytes = s.as_bytes();
    let mut digits = 0;
    while digits < 2 && bytes.get(digits).is_some_and(u8::is_ascii_digit) {
        digits += 1;
    }
    if digits == 0 || bytes.get(digits) != Some(&b':') {
        return None;
    }
    let m0 = bytes.get(digits + 1)?;
    let m1 = bytes.get(digits + 2)?;
    if !m0.is_ascii_digit() || !m1.is_ascii_digit() {
        return None;
    }
    let hour: u32 = s[..digits].parse().ok()?;
    Some(format!("{hour:02}:{}", &s[digits + 1..digits + 3]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_day_fraction() {
        assert_eq!(from_day_fraction(0.0), "00:00");
        assert_eq!(from_day_fraction(0.5), "12:00");
        assert_eq!(from_day_fraction(0.625), "15:00");
        // A fraction rounding up to midnight clamps to the last minute.
        assert_eq!(from_day_fraction(0.999_999), "23:59");
    }

    #[test]
    fn test_day_fraction_matches_rounded_seconds() {
        for f in [0.01, 0.25, 0.333, 0.4375, 0.75, 0.9] {
            let secs = (f * 86_400.0_f64).round() as i64;
            let expected = format!("{:02}:{:02}", secs / 3600, (secs % 3600) / 60);
            assert_eq!(from_day_fraction(f), expected);
        }
    }

    #[test]
    fn test_strict_formats() {
        assert_eq!(normalize("14:30"), "14:30");
        assert_eq!(normalize("2:30 PM"), "14:30");
        assert_eq!(normalize("02:30:15 PM"), "14:30");
        assert_eq!(normalize("12:00 AM"), "00:00");
        assert_eq!(normalize("  9:05  "), "09:05");
    }

    #[test]
    fn test_loose_extraction() {
        assert_eq!(normalize("14:30:00"), "14:30");
        assert_eq!(normalize("7:45 sharp"), "07:45");
    }

    #[test]
    fn test_fallback_identity() {
        assert_eq!(normalize("garbled"), "garbled");
        assert_eq!(normalize("  garbled  "), "garbled");
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn test_normalize_value() {
        assert_eq!(normalize_value(&json!(0.625)), "15:00");
        assert_eq!(normalize_value(&json!("2:30 PM")), "14:30");
        assert_eq!(normalize_value(&json!(null)), "");
    }
}
