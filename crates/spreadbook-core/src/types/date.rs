//! Date type for trade and snapshot bookkeeping.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{CoreError, CoreResult};

/// A calendar date.
///
/// This is a newtype wrapper around `chrono::NaiveDate` providing the
/// calendar arithmetic leg resolution needs and ensuring type safety.
///
/// # Example
///
/// ```rust
/// use spreadbook_core::types::Date;
///
/// let date = Date::from_ymd(2025, 6, 15).unwrap();
/// let forward = date.add_years(5).unwrap();
/// assert_eq!(forward.year(), 2030);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Date(NaiveDate);

impl Date {
    /// Creates a new date from year, month, and day.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidDate` if the date is invalid.
    pub fn from_ymd(year: i32, month: u32, day: u32) -> CoreResult<Self> {
        NaiveDate::from_ymd_opt(year, month, day)
            .map(Date)
            .ok_or_else(|| CoreError::invalid_date(format!("{year}-{month:02}-{day:02}")))
    }

    /// Creates a date from an ISO 8601 string (YYYY-MM-DD).
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidDate` if the string is not a valid date.
    pub fn parse(s: &str) -> CoreResult<Self> {
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(Date)
            .map_err(|_| CoreError::invalid_date(format!("Cannot parse: {s}")))
    }

    /// Creates a date from a compact DDMMYY string (e.g. "130526" for
    /// 13 May 2026).
    ///
    /// Two-digit years of 90 and above resolve to the 1900s, all others to
    /// the 2000s.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidDate` if the string is not six digits or
    /// the resulting date does not exist.
    pub fn from_ddmmyy(s: &str) -> CoreResult<Self> {
        if s.len() != 6 || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(CoreError::invalid_date(format!(
                "Expected DDMMYY, got: {s}"
            )));
        }
        let day: u32 = s[0..2].parse().expect("digits checked above");
        let month: u32 = s[2..4].parse().expect("digits checked above");
        let yy: i32 = s[4..6].parse().expect("digits checked above");
        let year = if yy >= 90 { 1900 + yy } else { 2000 + yy };
        Self::from_ymd(year, month, day)
    }

    /// Returns today's date.
    #[must_use]
    pub fn today() -> Self {
        Date(chrono::Local::now().date_naive())
    }

    /// Returns the year component.
    #[must_use]
    pub fn year(&self) -> i32 {
        self.0.year()
    }

    /// Returns the month component (1-12).
    #[must_use]
    pub fn month(&self) -> u32 {
        self.0.month()
    }

    /// Returns the day component (1-31).
    #[must_use]
    pub fn day(&self) -> u32 {
        self.0.day()
    }

    /// Adds a number of days to the date.
    #[must_use]
    pub fn add_days(&self, days: i64) -> Self {
        Date(self.0 + chrono::Duration::days(days))
    }

    /// Adds a number of months to the date.
    ///
    /// If the resulting day would be invalid (e.g., Jan 31 + 1 month),
    /// it rolls back to the last valid day of the month.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidDate` if the result is out of range.
    pub fn add_months(&self, months: i32) -> CoreResult<Self> {
        let total_months = self.year() * 12 + self.month() as i32 - 1 + months;
        let new_year = total_months.div_euclid(12);
        let new_month = (total_months.rem_euclid(12) + 1) as u32;

        // Clamp day to valid range for new month
        let max_day = days_in_month(new_year, new_month);
        let new_day = self.day().min(max_day);

        Self::from_ymd(new_year, new_month, new_day)
    }

    /// Adds a number of years to the date.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidDate` if the result is invalid.
    pub fn add_years(&self, years: i32) -> CoreResult<Self> {
        let new_year = self.year() + years;
        let max_day = days_in_month(new_year, self.month());
        let new_day = self.day().min(max_day);

        Self::from_ymd(new_year, self.month(), new_day)
    }

    /// Calculates the number of calendar days between two dates.
    #[must_use]
    pub fn days_between(&self, other: &Date) -> i64 {
        (other.0 - self.0).num_days()
    }

    /// Returns the underlying `NaiveDate`.
    #[must_use]
    pub fn as_naive_date(&self) -> NaiveDate {
        self.0
    }
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

impl From<NaiveDate> for Date {
    fn from(d: NaiveDate) -> Self {
        Date(d)
    }
}

/// Returns the number of days in the given month.
fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if NaiveDate::from_ymd_opt(year, 2, 29).is_some() => 29,
        2 => 28,
        _ => unreachable!(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_ymd_valid() {
        let date = Date::from_ymd(2025, 6, 15).unwrap();
        assert_eq!(date.year(), 2025);
        assert_eq!(date.month(), 6);
        assert_eq!(date.day(), 15);
    }

    #[test]
    fn test_from_ymd_invalid() {
        assert!(Date::from_ymd(2025, 2, 30).is_err());
        assert!(Date::from_ymd(2025, 13, 1).is_err());
    }

    #[test]
    fn test_parse_iso() {
        let date = Date::parse("2025-01-31").unwrap();
        assert_eq!(date, Date::from_ymd(2025, 1, 31).unwrap());
        assert!(Date::parse("31/01/2025").is_err());
    }

    #[test]
    fn test_from_ddmmyy() {
        let date = Date::from_ddmmyy("130526").unwrap();
        assert_eq!(date, Date::from_ymd(2026, 5, 13).unwrap());
    }

    #[test]
    fn test_from_ddmmyy_century_pivot() {
        // 90-99 resolve to the 1990s, everything else to the 2000s
        assert_eq!(
            Date::from_ddmmyy("010195").unwrap(),
            Date::from_ymd(1995, 1, 1).unwrap()
        );
        assert_eq!(
            Date::from_ddmmyy("010189").unwrap(),
            Date::from_ymd(2089, 1, 1).unwrap()
        );
    }

    #[test]
    fn test_from_ddmmyy_rejects_malformed() {
        assert!(Date::from_ddmmyy("1305").is_err());
        assert!(Date::from_ddmmyy("13a526").is_err());
        assert!(Date::from_ddmmyy("320126").is_err());
    }

    #[test]
    fn test_add_days() {
        let date = Date::from_ymd(2025, 12, 30).unwrap();
        assert_eq!(date.add_days(2), Date::from_ymd(2026, 1, 1).unwrap());
    }

    #[test]
    fn test_add_months_clamps_to_month_end() {
        let date = Date::from_ymd(2025, 1, 31).unwrap();
        assert_eq!(
            date.add_months(1).unwrap(),
            Date::from_ymd(2025, 2, 28).unwrap()
        );
    }

    #[test]
    fn test_add_months_across_year() {
        let date = Date::from_ymd(2025, 11, 15).unwrap();
        assert_eq!(
            date.add_months(3).unwrap(),
            Date::from_ymd(2026, 2, 15).unwrap()
        );
        assert_eq!(
            date.add_months(-12).unwrap(),
            Date::from_ymd(2024, 11, 15).unwrap()
        );
    }

    #[test]
    fn test_add_years_leap_day() {
        let date = Date::from_ymd(2024, 2, 29).unwrap();
        assert_eq!(
            date.add_years(1).unwrap(),
            Date::from_ymd(2025, 2, 28).unwrap()
        );
    }

    #[test]
    fn test_days_between() {
        let a = Date::from_ymd(2025, 1, 1).unwrap();
        let b = Date::from_ymd(2025, 1, 31).unwrap();
        assert_eq!(a.days_between(&b), 30);
        assert_eq!(b.days_between(&a), -30);
    }

    #[test]
    fn test_ordering() {
        let a = Date::from_ymd(2025, 1, 1).unwrap();
        let b = Date::from_ymd(2025, 6, 1).unwrap();
        assert!(a < b);
    }

    #[test]
    fn test_serde_roundtrip() {
        let date = Date::from_ymd(2025, 6, 15).unwrap();
        let json = serde_json::to_string(&date).unwrap();
        assert_eq!(json, "\"2025-06-15\"");
        let back: Date = serde_json::from_str(&json).unwrap();
        assert_eq!(back, date);
    }
}
