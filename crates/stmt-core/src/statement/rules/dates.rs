//! Date parsing for statement tokens.
//!
//! Formats are tried in a fixed order and the first one that yields a real
//! calendar date wins:
//! 1. DD/MM/YYYY
//! 2. MM/DD/YYYY
//! 3. YYYY-MM-DD
//! 4. named-month text forms

use chrono::{Datelike, NaiveDate};

use super::patterns::{DATE_ISO, DATE_NAMED_DMY, DATE_NAMED_MDY, DATE_NUMERIC, TIME_SUFFIX};
use crate::models::config::NormalizationConfig;

/// Which format accepted a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateFormat {
    DayMonthYear,
    MonthDayYear,
    Iso,
    NamedMonth,
}

/// Date field parser.
#[derive(Debug, Clone)]
pub struct DateParser {
    two_digit_year_pivot: u32,
    min_year: i32,
    max_year: i32,
}

impl DateParser {
    pub fn new() -> Self {
        Self::from_config(&NormalizationConfig::default())
    }

    pub fn from_config(config: &NormalizationConfig) -> Self {
        Self {
            two_digit_year_pivot: config.two_digit_year_pivot,
            min_year: config.min_year,
            max_year: config.max_year,
        }
    }

    /// Parse a single date token.
    pub fn parse(&self, token: &str) -> Option<NaiveDate> {
        self.parse_with_format(token).map(|(date, _)| date)
    }

    /// Parse a single date token, reporting which format accepted it.
    pub fn parse_with_format(&self, token: &str) -> Option<(NaiveDate, DateFormat)> {
        let token = token.trim();
        let token = TIME_SUFFIX.replace(token, "");
        let token = token.trim();

        if let Some(caps) = DATE_NUMERIC.captures(token) {
            let first: u32 = caps[1].parse().ok()?;
            let second: u32 = caps[2].parse().ok()?;
            let year = self.expand_year(&caps[3])?;

            if let Some(date) = self.accept(year, second, first) {
                return Some((date, DateFormat::DayMonthYear));
            }
            if let Some(date) = self.accept(year, first, second) {
                return Some((date, DateFormat::MonthDayYear));
            }
            return None;
        }

        if let Some(caps) = DATE_ISO.captures(token) {
            let year: i32 = caps[1].parse().ok()?;
            let month: u32 = caps[2].parse().ok()?;
            let day: u32 = caps[3].parse().ok()?;
            return self.accept(year, month, day).map(|d| (d, DateFormat::Iso));
        }

        if let Some(caps) = DATE_NAMED_DMY.captures(token) {
            let day: u32 = caps[1].parse().ok()?;
            let month = month_from_name(&caps[2])?;
            let year = self.expand_year(&caps[3])?;
            return self.accept(year, month, day).map(|d| (d, DateFormat::NamedMonth));
        }

        if let Some(caps) = DATE_NAMED_MDY.captures(token) {
            let month = month_from_name(&caps[1])?;
            let day: u32 = caps[2].parse().ok()?;
            let year: i32 = caps[3].parse().ok()?;
            return self.accept(year, month, day).map(|d| (d, DateFormat::NamedMonth));
        }

        None
    }

    /// Whether a date falls inside the plausible year range.
    pub fn is_plausible(&self, date: NaiveDate) -> bool {
        (self.min_year..=self.max_year).contains(&date.year())
    }

    fn accept(&self, year: i32, month: u32, day: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(year, month, day).filter(|d| self.is_plausible(*d))
    }

    fn expand_year(&self, s: &str) -> Option<i32> {
        let year: i32 = s.parse().ok()?;
        if s.len() == 2 {
            // Two-digit year: pivot decides the century
            if year as u32 <= self.two_digit_year_pivot {
                Some(2000 + year)
            } else {
                Some(1900 + year)
            }
        } else {
            Some(year)
        }
    }
}

impl Default for DateParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Map an English month name or abbreviation to its number.
fn month_from_name(name: &str) -> Option<u32> {
    let name = name.to_lowercase();
    let month = match name.as_str() {
        "jan" | "january" => 1,
        "feb" | "february" => 2,
        "mar" | "march" => 3,
        "apr" | "april" => 4,
        "may" => 5,
        "jun" | "june" => 6,
        "jul" | "july" => 7,
        "aug" | "august" => 8,
        "sep" | "sept" | "september" => 9,
        "oct" | "october" => 10,
        "nov" | "november" => 11,
        "dec" | "december" => 12,
        _ => return None,
    };
    Some(month)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_day_month_first() {
        let parser = DateParser::new();
        assert_eq!(parser.parse("01/02/2025"), Some(ymd(2025, 2, 1)));
        assert_eq!(parser.parse("31/01/2025"), Some(ymd(2025, 1, 31)));
        assert_eq!(parser.parse("13/01/2025"), Some(ymd(2025, 1, 13)));
    }

    #[test]
    fn test_month_day_when_day_month_is_invalid() {
        let parser = DateParser::new();
        assert_eq!(
            parser.parse_with_format("01/13/2025"),
            Some((ymd(2025, 1, 13), DateFormat::MonthDayYear))
        );
    }

    #[test]
    fn test_leap_years() {
        let parser = DateParser::new();
        assert_eq!(parser.parse("29/02/2024"), Some(ymd(2024, 2, 29)));
        assert_eq!(parser.parse("29/02/2025"), None);
        assert_eq!(parser.parse("2025-02-29"), None);
    }

    #[test]
    fn test_iso_and_named_forms() {
        let parser = DateParser::new();
        assert_eq!(parser.parse("2025-01-15"), Some(ymd(2025, 1, 15)));
        assert_eq!(parser.parse("15 Jan 2025"), Some(ymd(2025, 1, 15)));
        assert_eq!(parser.parse("15-JAN-2025"), Some(ymd(2025, 1, 15)));
        assert_eq!(parser.parse("15 January 25"), Some(ymd(2025, 1, 15)));
        assert_eq!(parser.parse("Jan 15, 2025"), Some(ymd(2025, 1, 15)));
        assert_eq!(parser.parse("Sept 3 2024"), Some(ymd(2024, 9, 3)));
    }

    #[test]
    fn test_separators_time_and_short_year() {
        let parser = DateParser::new();
        assert_eq!(parser.parse("05.03.2025"), Some(ymd(2025, 3, 5)));
        assert_eq!(parser.parse("05-03-25"), Some(ymd(2025, 3, 5)));
        assert_eq!(parser.parse("05/03/99"), Some(ymd(1999, 3, 5)));
        assert_eq!(parser.parse("12/01/2025 14:22:10"), Some(ymd(2025, 1, 12)));
    }

    #[test]
    fn test_rejects_garbage() {
        let parser = DateParser::new();
        assert_eq!(parser.parse(""), None);
        assert_eq!(parser.parse("Date"), None);
        assert_eq!(parser.parse("32/13/2025"), None);
        assert_eq!(parser.parse("15 Foo 2025"), None);
        assert_eq!(parser.parse("01/02/0025"), None);
    }
}
