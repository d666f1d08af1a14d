use chrono::{DateTime, Datelike, Months, NaiveDate, NaiveDateTime};

use crate::error::{Error, Result};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parses the date strings found in the invoice store: plain `YYYY-MM-DD`,
/// RFC 3339 timestamps, or a naive `YYYY-MM-DDTHH:MM:SS`.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if let Ok(d) = NaiveDate::parse_from_str(s, DATE_FORMAT) {
        return Some(d);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|dt| dt.date())
}

pub fn format_date(d: NaiveDate) -> String {
    d.format(DATE_FORMAT).to_string()
}

/// Human readable form for tables, falls back to the raw string.
pub fn display_date(s: &str) -> String {
    match parse_date(s) {
        Some(d) => d.format("%d %b %Y").to_string(),
        None => s.to_string(),
    }
}

pub fn end_of_month(d: NaiveDate) -> NaiveDate {
    let first = d.with_day(1).unwrap_or(d);
    first
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .unwrap_or(d)
}

/// `YYYY-MM` of the month following `today`.
pub fn next_month(today: NaiveDate) -> String {
    let first = today.with_day(1).unwrap_or(today);
    let next = first.checked_add_months(Months::new(1)).unwrap_or(first);
    month_string(next)
}

pub fn month_string(d: NaiveDate) -> String {
    d.format("%Y-%m").to_string()
}

/// First day of a `YYYY-MM` month.
pub fn first_of_month(month: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(&format!("{}-01", month.trim()), DATE_FORMAT)
        .map_err(|_| Error::InvalidMonth(month.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_date_formats() {
        assert_eq!(parse_date("2024-02-01"), Some(ymd(2024, 2, 1)));
        assert_eq!(parse_date(" 2024-02-01 "), Some(ymd(2024, 2, 1)));
        assert_eq!(parse_date("2024-02-01T10:30:00.000Z"), Some(ymd(2024, 2, 1)));
        assert_eq!(parse_date("2024-02-01T10:30:00"), Some(ymd(2024, 2, 1)));
        assert_eq!(parse_date("yesterday"), None);
        assert_eq!(parse_date(""), None);
    }

    #[test]
    fn test_end_of_month() {
        assert_eq!(end_of_month(ymd(2024, 3, 1)), ymd(2024, 3, 31));
        assert_eq!(end_of_month(ymd(2024, 2, 14)), ymd(2024, 2, 29));
        assert_eq!(end_of_month(ymd(2023, 2, 28)), ymd(2023, 2, 28));
        assert_eq!(end_of_month(ymd(2024, 12, 5)), ymd(2024, 12, 31));
    }

    #[test]
    fn test_next_month_rolls_over_year() {
        assert_eq!(next_month(ymd(2024, 1, 31)), "2024-02");
        assert_eq!(next_month(ymd(2024, 12, 15)), "2025-01");
    }

    #[test]
    fn test_first_of_month() {
        assert_eq!(first_of_month("2024-03").unwrap(), ymd(2024, 3, 1));
        assert!(matches!(first_of_month("2024-13"), Err(Error::InvalidMonth(_))));
        assert!(first_of_month("March").is_err());
    }
}
