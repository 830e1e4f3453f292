//! Calendar helpers.
//!
//! Month lengths, weekdays and the organisation's holiday table.  All
//! date arithmetic is proleptic Gregorian via [`chrono`]; weekdays are
//! numbered from Sunday (`0`) to Saturday (`6`).

use crate::error::AttendanceError;
use crate::models::Month;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use tracing::info;

/// Weekday number of Sunday.
pub const SUNDAY: u32 = 0;
pub const MONDAY: u32 = 1;
pub const FRIDAY: u32 = 5;

impl Month {
    pub const ALL: [Month; 12] = [
        Month::Jan,
        Month::Feb,
        Month::Mar,
        Month::Apr,
        Month::May,
        Month::Jun,
        Month::Jul,
        Month::Aug,
        Month::Sep,
        Month::Oct,
        Month::Nov,
        Month::Dec,
    ];

    /// Zero-based position in the year.
    pub fn index(self) -> usize {
        self as usize
    }

    /// One-based month number as used by `chrono`.
    pub fn number(self) -> u32 {
        self as u32 + 1
    }

    pub fn from_number(number: u32) -> Option<Month> {
        Month::ALL.get(number.checked_sub(1)? as usize).copied()
    }

    pub fn short_name(self) -> &'static str {
        match self {
            Month::Jan => "Jan",
            Month::Feb => "Feb",
            Month::Mar => "Mar",
            Month::Apr => "Apr",
            Month::May => "May",
            Month::Jun => "Jun",
            Month::Jul => "Jul",
            Month::Aug => "Aug",
            Month::Sep => "Sep",
            Month::Oct => "Oct",
            Month::Nov => "Nov",
            Month::Dec => "Dec",
        }
    }

    pub fn full_name(self) -> &'static str {
        match self {
            Month::Jan => "January",
            Month::Feb => "February",
            Month::Mar => "March",
            Month::Apr => "April",
            Month::May => "May",
            Month::Jun => "June",
            Month::Jul => "July",
            Month::Aug => "August",
            Month::Sep => "September",
            Month::Oct => "October",
            Month::Nov => "November",
            Month::Dec => "December",
        }
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

impl FromStr for Month {
    type Err = AttendanceError;

    /// Accepts short or full English names in any case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Month::ALL
            .into_iter()
            .find(|m| {
                m.short_name().eq_ignore_ascii_case(wanted)
                    || m.full_name().eq_ignore_ascii_case(wanted)
            })
            .ok_or_else(|| AttendanceError::UnknownMonth(s.to_string()))
    }
}

pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

pub fn days_in_month(month: Month, year: i32) -> u32 {
    match month {
        Month::Feb => {
            if is_leap_year(year) {
                29
            } else {
                28
            }
        }
        Month::Apr | Month::Jun | Month::Sep | Month::Nov => 30,
        _ => 31,
    }
}

/// Month length by name; names that are not a month fall back to 31.
pub fn days_in_named_month(name: &str, year: i32) -> u32 {
    name.parse::<Month>()
        .map(|month| days_in_month(month, year))
        .unwrap_or(31)
}

/// Weekday of a date, `0` = Sunday.  `None` for days that do not exist
/// in the month.
pub fn weekday_of(day: u32, month: Month, year: i32) -> Option<u32> {
    NaiveDate::from_ymd_opt(year, month.number(), day)
        .map(|date| date.weekday().num_days_from_sunday())
}

pub fn sundays_in_month(month: Month, year: i32) -> Vec<u32> {
    (1..=days_in_month(month, year))
        .filter(|&day| weekday_of(day, month, year) == Some(SUNDAY))
        .collect()
}

/// Fixed, year independent list of holiday days per month.
///
/// The default table is the organisation's editorial policy; callers
/// may substitute their own, e.g. loaded with [`HolidayTable::load_from_file`].
/// Serialised as `{"Jan": [1, 26], ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<Month, Vec<u32>>", into = "BTreeMap<Month, Vec<u32>>")]
pub struct HolidayTable(BTreeMap<Month, Vec<u32>>);

impl From<BTreeMap<Month, Vec<u32>>> for HolidayTable {
    fn from(entries: BTreeMap<Month, Vec<u32>>) -> Self {
        Self::from_entries(entries)
    }
}

impl From<HolidayTable> for BTreeMap<Month, Vec<u32>> {
    fn from(table: HolidayTable) -> Self {
        table.0
    }
}

impl Default for HolidayTable {
    fn default() -> Self {
        Self::from_entries([
            (Month::Jan, vec![1, 26]),
            (Month::May, vec![1]),
            (Month::Aug, vec![15]),
            (Month::Oct, vec![2]),
            (Month::Dec, vec![25]),
        ])
    }
}

impl HolidayTable {
    /// A table with no holidays at all.
    pub fn empty() -> Self {
        Self(BTreeMap::new())
    }

    /// Builds a table with each month's days sorted and deduplicated.
    pub fn from_entries(entries: impl IntoIterator<Item = (Month, Vec<u32>)>) -> Self {
        Self(
            entries
                .into_iter()
                .map(|(month, mut days)| {
                    days.sort_unstable();
                    days.dedup();
                    (month, days)
                })
                .collect(),
        )
    }

    /// Holiday days for the month, ascending.  Days past the end of the
    /// month in `year` (a listed Feb 29 outside leap years) are dropped.
    pub fn holidays_in_month(&self, month: Month, year: i32) -> Vec<u32> {
        let last = days_in_month(month, year);
        self.0
            .get(&month)
            .map(|days| {
                days.iter()
                    .copied()
                    .filter(|&d| (1..=last).contains(&d))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn is_holiday(&self, day: u32, month: Month) -> bool {
        self.0
            .get(&month)
            .is_some_and(|days| days.binary_search(&day).is_ok())
    }

    /// Loads a table from a JSON file shaped like the serialised form.
    pub fn load_from_file(path: &Path) -> Result<Self, AttendanceError> {
        let data = std::fs::read_to_string(path)?;
        let table: HolidayTable = serde_json::from_str(&data)?;
        info!(path = %path.display(), months = table.0.len(), "loaded holiday table");
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_february_leap_rules() {
        assert_eq!(days_in_month(Month::Feb, 2024), 29);
        assert_eq!(days_in_month(Month::Feb, 2023), 28);
        assert_eq!(days_in_month(Month::Feb, 2000), 29);
        assert_eq!(days_in_month(Month::Feb, 1900), 28);
    }

    #[test]
    fn test_named_month_lengths() {
        assert_eq!(days_in_named_month("Feb", 2024), 29);
        assert_eq!(days_in_named_month("april", 2024), 30);
        assert_eq!(days_in_named_month("Smarch", 2024), 31);
    }

    #[test]
    fn test_weekday_of() {
        // 1 January 2024 was a Monday.
        assert_eq!(weekday_of(1, Month::Jan, 2024), Some(MONDAY));
        assert_eq!(weekday_of(7, Month::Jan, 2024), Some(SUNDAY));
        assert_eq!(weekday_of(5, Month::Jan, 2024), Some(FRIDAY));
        assert_eq!(weekday_of(30, Month::Feb, 2024), None);
    }

    #[test]
    fn test_sundays_in_month() {
        assert_eq!(sundays_in_month(Month::Dec, 2023), vec![3, 10, 17, 24, 31]);
        assert_eq!(sundays_in_month(Month::Feb, 2024), vec![4, 11, 18, 25]);
    }

    #[test]
    fn test_default_holidays() {
        let table = HolidayTable::default();
        assert_eq!(table.holidays_in_month(Month::Jan, 2024), vec![1, 26]);
        assert!(table.holidays_in_month(Month::Apr, 2024).is_empty());
        assert!(table.is_holiday(15, Month::Aug));
        assert!(!table.is_holiday(16, Month::Aug));
    }

    #[test]
    fn test_custom_holidays_drop_days_past_month_end() {
        let table = HolidayTable::from_entries([(Month::Feb, vec![29, 14])]);
        assert_eq!(table.holidays_in_month(Month::Feb, 2024), vec![14, 29]);
        assert_eq!(table.holidays_in_month(Month::Feb, 2023), vec![14]);
    }

    #[test]
    fn test_holiday_table_json_shape() {
        let table: HolidayTable = serde_json::from_str(r#"{"Mar": [8], "Nov": [1, 14]}"#).unwrap();
        assert_eq!(table.holidays_in_month(Month::Nov, 2024), vec![1, 14]);
        assert!(table.holidays_in_month(Month::Jan, 2024).is_empty());
    }

    #[test]
    fn test_deserialized_table_is_sorted() {
        let table: HolidayTable = serde_json::from_str(r#"{"Jan": [26, 15, 1, 15]}"#).unwrap();
        assert_eq!(table.holidays_in_month(Month::Jan, 2024), vec![1, 15, 26]);
        for day in [1, 15, 26] {
            assert!(table.is_holiday(day, Month::Jan));
        }
        assert!(!table.is_holiday(2, Month::Jan));
        assert_eq!(serde_json::to_string(&table).unwrap(), r#"{"Jan":[1,15,26]}"#);
    }

    #[test]
    fn test_month_parsing() {
        assert_eq!("jan".parse::<Month>().unwrap(), Month::Jan);
        assert_eq!("September".parse::<Month>().unwrap(), Month::Sep);
        assert!("Foo".parse::<Month>().is_err());
        assert_eq!(Month::from_number(12), Some(Month::Dec));
        assert_eq!(Month::from_number(0), None);
        assert_eq!(Month::Mar.index(), 2);
    }
}
