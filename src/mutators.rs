//! Record mutators.
//!
//! Every edit to an [`EmployeeRecord`] goes through one of these pure
//! functions: each takes the record by reference, returns a new one and
//! finishes by re-deriving the summary through [`refresh`].  No other
//! path writes a record's attendance or summary.

use crate::calendar::{days_in_month, sundays_in_month, HolidayTable};
use crate::codes::normalize;
use crate::engine::summarize;
use crate::models::{AttendanceCode, DayAttendance, EmployeeRecord, Month, MonthlyEntry};
use tracing::{debug, warn};

/// Re-derives the summary from the record's attendance.
pub fn refresh(record: &EmployeeRecord, holidays: &HolidayTable) -> EmployeeRecord {
    with_attendance(record, record.attendance.clone(), holidays)
}

/// Commits `attendance` to a copy of `record`.  Days outside the
/// record's month are dropped before the summary is derived.
fn with_attendance(
    record: &EmployeeRecord,
    mut attendance: DayAttendance,
    holidays: &HolidayTable,
) -> EmployeeRecord {
    let last_day = days_in_month(record.month, record.year);
    let before = attendance.len();
    attendance.retain(|day, _| (1..=last_day).contains(&day));
    let dropped = before - attendance.len();
    if dropped > 0 {
        warn!(emp_id = %record.emp_id, dropped, last_day, "dropped days outside the month");
    }
    let summary = summarize(&attendance, record.month, record.year, holidays);
    EmployeeRecord {
        attendance,
        summary,
        ..record.clone()
    }
}

/// Applies one raw edit to `attendance`.  Returns `false` when the day
/// lies outside the month and the edit was dropped.
fn apply_edit(attendance: &mut DayAttendance, last_day: u32, day: u32, raw: &str) -> bool {
    if !(1..=last_day).contains(&day) {
        return false;
    }
    match normalize(raw) {
        Some(code) => attendance.insert(day, code),
        None => {
            attendance.remove(day);
        }
    }
    true
}

/// Sets one day.  The raw value is normalised; an empty or unrecognised
/// value clears the day.
pub fn set_day(
    record: &EmployeeRecord,
    day: u32,
    raw_code: &str,
    holidays: &HolidayTable,
) -> EmployeeRecord {
    let mut attendance = record.attendance.clone();
    let last_day = days_in_month(record.month, record.year);
    if !apply_edit(&mut attendance, last_day, day, raw_code) {
        warn!(emp_id = %record.emp_id, day, last_day, "ignoring edit outside the month");
    }
    with_attendance(record, attendance, holidays)
}

/// Applies many edits, then re-derives once.
pub fn bulk_set<I, S>(record: &EmployeeRecord, edits: I, holidays: &HolidayTable) -> EmployeeRecord
where
    I: IntoIterator<Item = (u32, S)>,
    S: AsRef<str>,
{
    let mut attendance = record.attendance.clone();
    let last_day = days_in_month(record.month, record.year);
    let mut dropped = 0usize;
    for (day, raw) in edits {
        if !apply_edit(&mut attendance, last_day, day, raw.as_ref()) {
            dropped += 1;
        }
    }
    if dropped > 0 {
        warn!(emp_id = %record.emp_id, dropped, "ignored edits outside the month");
    }
    with_attendance(record, attendance, holidays)
}

/// Fills `days` with `code` where the day is still unmarked.
fn fill_unmarked(
    record: &EmployeeRecord,
    days: Vec<u32>,
    code: AttendanceCode,
    holidays: &HolidayTable,
) -> EmployeeRecord {
    let mut attendance = record.attendance.clone();
    let mut filled = 0usize;
    for day in days {
        if !attendance.contains(day) {
            attendance.insert(day, code);
            filled += 1;
        }
    }
    debug!(emp_id = %record.emp_id, %code, filled, "filled unmarked days");
    with_attendance(record, attendance, holidays)
}

/// Marks every unmarked Sunday of the record's month as `S`.
pub fn mark_weekends(record: &EmployeeRecord, holidays: &HolidayTable) -> EmployeeRecord {
    mark_weekends_with(record, AttendanceCode::Sunday, holidays)
}

pub fn mark_weekends_with(
    record: &EmployeeRecord,
    code: AttendanceCode,
    holidays: &HolidayTable,
) -> EmployeeRecord {
    let sundays = sundays_in_month(record.month, record.year);
    fill_unmarked(record, sundays, code, holidays)
}

/// Marks every unmarked listed holiday of the record's month as `H`.
pub fn mark_holidays(record: &EmployeeRecord, holidays: &HolidayTable) -> EmployeeRecord {
    mark_holidays_with(record, AttendanceCode::Holiday, holidays)
}

pub fn mark_holidays_with(
    record: &EmployeeRecord,
    code: AttendanceCode,
    holidays: &HolidayTable,
) -> EmployeeRecord {
    let days = holidays.holidays_in_month(record.month, record.year);
    fill_unmarked(record, days, code, holidays)
}

/// Removes all attendance; the summary becomes all-zero.
pub fn clear(record: &EmployeeRecord, holidays: &HolidayTable) -> EmployeeRecord {
    with_attendance(record, DayAttendance::new(), holidays)
}

/// Makes `month`/`year` the active period.
///
/// The current attendance and summary are kept in the record's monthly
/// history under the current month; the target month's history (if any)
/// becomes the active attendance.
pub fn switch_month(
    record: &EmployeeRecord,
    month: Month,
    year: i32,
    holidays: &HolidayTable,
) -> EmployeeRecord {
    let mut next = record.clone();
    next.monthly_data.insert(
        record.month,
        MonthlyEntry {
            attendance: record.attendance.clone(),
            summary: record.summary,
        },
    );
    let attendance = next
        .monthly_data
        .get(&month)
        .map(|entry| entry.attendance.clone())
        .unwrap_or_default();
    next.month = month;
    next.year = year;
    debug!(emp_id = %record.emp_id, from = %record.month, to = %month, year, "switched month");
    with_attendance(&next, attendance, holidays)
}
