//! Recognizers shared by type inference and materialization

use chrono::{DateTime, NaiveDate, NaiveDateTime};

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d"];

/// Parse a finite number
pub fn parse_number(value: &str) -> Option<f64> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    // `f64::from_str` also accepts "inf" and "NaN"
    value.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Map a boolean token (`true/false/1/0/yes/no/y/n`, any case)
pub fn parse_bool_token(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "y" => Some(true),
        "false" | "0" | "no" | "n" => Some(false),
        _ => None,
    }
}

/// Whether a value has the shape of a supported date.
///
/// Accepts `YYYY-MM-DD` (optionally followed by a time part), `MM/DD/YYYY`,
/// `YYYY/MM/DD` and a bare 4-digit year. Any other purely numeric value is
/// rejected so plain integers are not read as dates. A time part only counts
/// when [`parse_date`] can read it.
pub fn matches_date_pattern(value: &str) -> bool {
    let value = value.trim();
    let bytes = value.as_bytes();

    if bytes.is_empty() {
        return false;
    }
    if bytes.iter().all(u8::is_ascii_digit) {
        return bytes.len() == 4;
    }

    if is_iso_date_prefix(bytes) {
        return bytes.len() == 10 || parse_date(value).is_some();
    }
    is_slash_date(value)
}

/// Parse a value of one of the supported date shapes
pub fn parse_date(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();

    if value.len() == 4 && value.bytes().all(|b| b.is_ascii_digit()) {
        let year = value.parse::<i32>().ok()?;
        return NaiveDate::from_ymd_opt(year, 1, 1)?.and_hms_opt(0, 0, 0);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.naive_utc());
    }

    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Some(dt);
        }
    }

    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

fn is_iso_date_prefix(bytes: &[u8]) -> bool {
    if bytes.len() < 10 {
        return false;
    }
    let digits = |range: std::ops::Range<usize>| bytes[range].iter().all(u8::is_ascii_digit);

    digits(0..4)
        && bytes[4] == b'-'
        && digits(5..7)
        && bytes[7] == b'-'
        && digits(8..10)
        && (bytes.len() == 10 || matches!(bytes[10], b'T' | b' '))
}

fn is_slash_date(value: &str) -> bool {
    let parts: Vec<&str> = value.split('/').collect();
    if parts.len() != 3 || !parts.iter().all(|p| !p.is_empty() && p.bytes().all(|b| b.is_ascii_digit())) {
        return false;
    }

    let short = |p: &str| p.len() <= 2;
    // MM/DD/YYYY or YYYY/MM/DD
    (short(parts[0]) && short(parts[1]) && parts[2].len() == 4)
        || (parts[0].len() == 4 && short(parts[1]) && short(parts[2]))
}
