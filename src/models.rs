//! Data models for the Attendance Engine.
//!
//! The `models` module defines the serialisable types the rest of the
//! crate computes over: attendance codes, months, per-day attendance
//! maps, the ten derived monthly counters and the employee records a
//! [`Roster`] owns.  JSON field names follow the camelCase layout the
//! spreadsheet front end persists.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One day's attendance status.
///
/// The set is closed: raw input that does not normalise to one of
/// these variants is treated as "no entry" (see [`crate::codes::normalize`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AttendanceCode {
    #[serde(rename = "P")]
    Present,
    #[serde(rename = "A")]
    Absent,
    #[serde(rename = "O")]
    Off,
    #[serde(rename = "S")]
    Sunday,
    #[serde(rename = "H")]
    Holiday,
    #[serde(rename = "N")]
    NightShift,
    #[serde(rename = "L")]
    Leave,
    #[serde(rename = "HD")]
    HalfDay,
    #[serde(rename = "WFH")]
    WorkFromHome,
}

/// Calendar month.  Serialised by its short name (`"Jan"`..`"Dec"`);
/// the declaration order is the calendar order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Month {
    Jan,
    Feb,
    Mar,
    Apr,
    May,
    Jun,
    Jul,
    Aug,
    Sep,
    Oct,
    Nov,
    Dec,
}

/// Sparse mapping from day of month to the code recorded for it.
///
/// A missing key means the day is unmarked, which is distinct from any
/// code (including [`AttendanceCode::Absent`]).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DayAttendance(BTreeMap<u32, AttendanceCode>);

impl DayAttendance {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, day: u32) -> Option<AttendanceCode> {
        self.0.get(&day).copied()
    }

    pub fn contains(&self, day: u32) -> bool {
        self.0.contains_key(&day)
    }

    pub fn insert(&mut self, day: u32, code: AttendanceCode) {
        self.0.insert(day, code);
    }

    pub fn remove(&mut self, day: u32) -> Option<AttendanceCode> {
        self.0.remove(&day)
    }

    /// Keeps only the days for which `keep` returns `true`.
    pub fn retain(&mut self, mut keep: impl FnMut(u32, AttendanceCode) -> bool) {
        self.0.retain(|day, code| keep(*day, *code));
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Entries in ascending day order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, AttendanceCode)> + '_ {
        self.0.iter().map(|(day, code)| (*day, *code))
    }
}

impl FromIterator<(u32, AttendanceCode)> for DayAttendance {
    fn from_iter<I: IntoIterator<Item = (u32, AttendanceCode)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// The ten derived monthly counters for one employee.
///
/// `total_working_days` is a weighted figure produced by
/// [`crate::engine::summarize`], not the sum of the other fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeSummary {
    /// Days coded `P` or `WFH`, half days counting 0.5, floored.
    pub total_present: u32,
    /// Days coded `O`.
    pub total_off: u32,
    /// Days coded `S`.
    pub total_sundays: u32,
    /// Days coded `H`.
    pub total_holidays: u32,
    /// Days coded `N`.
    pub total_night_shift: u32,
    /// Sundays and listed holidays on which the employee worked.
    pub total_holy_day_working: u32,
    /// Worked days that directly follow a day coded `O`.
    pub total_off_day_working: u32,
    /// Days coded `A`.
    pub total_absent: u32,
    /// Days coded `L`.
    pub total_on_leave: u32,
    /// Weighted total of paid days.
    pub total_working_days: u32,
}

/// Attendance and summary kept for a month that is not currently active.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MonthlyEntry {
    /// Attendance as it stood when the month was left.
    pub attendance: DayAttendance,
    /// Summary derived from that attendance.
    pub summary: EmployeeSummary,
}

/// One row of the roster.
///
/// The attendance map, the derived summary and the active month are
/// only changed through [`crate::mutators`], each of which re-derives
/// the summary before returning, so a record's summary never drifts
/// from its attendance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeRecord {
    /// 1-based position inside the owning roster.
    #[serde(default)]
    pub(crate) sl_no: usize,
    /// Identifier in the form `AB-1234`.
    pub emp_id: String,
    /// Full name, 3 to 50 characters.
    pub employee_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    pub(crate) month: Month,
    pub(crate) year: i32,
    #[serde(default)]
    pub(crate) attendance: DayAttendance,
    #[serde(default)]
    pub(crate) summary: EmployeeSummary,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub(crate) monthly_data: BTreeMap<Month, MonthlyEntry>,
}

impl EmployeeRecord {
    /// Creates a record with no attendance and an all-zero summary.
    pub fn new(
        emp_id: impl Into<String>,
        employee_name: impl Into<String>,
        month: Month,
        year: i32,
    ) -> Self {
        Self {
            sl_no: 0,
            emp_id: emp_id.into(),
            employee_name: employee_name.into(),
            email: None,
            phone: None,
            department: None,
            month,
            year,
            attendance: DayAttendance::new(),
            summary: EmployeeSummary::default(),
            monthly_data: BTreeMap::new(),
        }
    }

    pub fn sl_no(&self) -> usize {
        self.sl_no
    }

    pub fn month(&self) -> Month {
        self.month
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn attendance(&self) -> &DayAttendance {
        &self.attendance
    }

    pub fn summary(&self) -> &EmployeeSummary {
        &self.summary
    }

    /// History for months other than the active one.
    pub fn monthly_data(&self) -> &BTreeMap<Month, MonthlyEntry> {
        &self.monthly_data
    }
}

/// Ordered collection of employee records, unique by `emp_id`.
///
/// Operations live in [`crate::roster`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Roster {
    pub(crate) employees: Vec<EmployeeRecord>,
}

/// Plain JSON-compatible form of a roster handed to storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterSnapshot {
    /// Format version, see [`crate::roster::SNAPSHOT_VERSION`].
    pub version: String,
    pub saved_at: DateTime<Utc>,
    pub employees: Vec<EmployeeRecord>,
}
