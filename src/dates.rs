use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::error::{Error, Result};
use crate::models::{DateOrdering, RawCell};

/// Textual layouts tried when delimited parsing does not apply.
const GENERIC_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%Y.%m.%d",
    "%d %b %Y",
    "%d %B %Y",
    "%b %d, %Y",
    "%B %d, %Y",
    "%b %d %Y",
    "%B %d %Y",
];

const GENERIC_DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M"];

/// Convert a raw date cell into a calendar date.
///
/// Numbers are spreadsheet serials; text is split on `/`, `-` or `.` and read
/// in the given day/month order. Returns `None` when the cell cannot be
/// resolved to a real calendar date.
pub fn normalize(cell: &RawCell, ordering: DateOrdering) -> Option<NaiveDate> {
    match cell {
        RawCell::Empty => None,
        RawCell::Number(serial) => excel_serial_to_date(*serial),
        RawCell::Text(raw) => parse_date_text(raw, ordering),
    }
}

/// Spreadsheet serial date. The epoch is 1899-12-30 to absorb the 1900 leap
/// year bug, so serial 1 is 1899-12-31. Fractional days are truncated.
pub fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() {
        return None;
    }
    let days = serial.trunc();
    if days.abs() > 3_000_000.0 {
        return None;
    }
    let base = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    base.checked_add_signed(chrono::Duration::days(days as i64))
}

pub fn parse_date_text(raw: &str, ordering: DateOrdering) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    let parts: Vec<&str> = raw.split(['/', '-', '.']).map(str::trim).collect();
    if parts.len() == 3 && !is_year_first(parts[0]) {
        return parse_ordered(&parts, ordering);
    }
    parse_generic(raw)
}

fn is_year_first(part: &str) -> bool {
    part.len() == 4 && part.chars().all(|c| c.is_ascii_digit())
}

fn parse_ordered(parts: &[&str], ordering: DateOrdering) -> Option<NaiveDate> {
    let a: u32 = parts[0].parse().ok()?;
    let b: u32 = parts[1].parse().ok()?;
    let y = match parts[2].parse::<i32>().ok()? {
        // Two-digit years are read as 19xx.
        y @ 0..=99 => 1900 + y,
        y => y,
    };
    let (d, m) = match ordering {
        DateOrdering::DayMonthYear => (a, b),
        DateOrdering::MonthDayYear => (b, a),
    };
    NaiveDate::from_ymd_opt(y, m, d)
}

/// Last-resort parse for layouts other than DMY/MDY.
fn parse_generic(raw: &str) -> Option<NaiveDate> {
    for fmt in GENERIC_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(raw, fmt) {
            return Some(d);
        }
    }
    for fmt in GENERIC_DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt.date());
        }
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }
    DateTime::parse_from_rfc2822(raw).ok().map(|dt| dt.date_naive())
}

/// Parse a user supplied `YYYY-MM-DD` reference date.
pub fn parse_iso(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| Error::InvalidDate(raw.to_string()))
}
