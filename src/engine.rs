//! Monthly summary engine.
//!
//! The `engine` module turns one employee's [`DayAttendance`] into the
//! ten counters of an [`EmployeeSummary`].  The computation runs in two
//! passes over the days of the month:
//!
//! 1. every recorded code adds its contribution to exactly one base
//!    counter (half days add `0.5` to the present count);
//! 2. working codes (`P`, `N`, `WFH`) are checked against their
//!    context: working on a Sunday or listed holiday counts as holy-day
//!    working, working the day after an `O` counts as off-day working.
//!
//! The weighted working-day total then consumes the unfloored present
//! count, and only afterwards is the reported present count floored.
//! Roster-wide recomputation uses [`rayon`] to verify many employees at
//! once.

use crate::calendar::{days_in_month, weekday_of, HolidayTable, SUNDAY};
use crate::models::{AttendanceCode, DayAttendance, EmployeeSummary, Month, Roster};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Denominator used for percentages when a summary has no working days.
pub const DEFAULT_WORKING_DAYS: u32 = 22;

/// Computes the summary for one month of attendance.
///
/// Total over its inputs: days outside `1..=days_in_month` are ignored
/// and an empty map yields an all-zero summary.
pub fn summarize(
    attendance: &DayAttendance,
    month: Month,
    year: i32,
    holidays: &HolidayTable,
) -> EmployeeSummary {
    let last_day = days_in_month(month, year);
    let holiday_days = holidays.holidays_in_month(month, year);
    let mut summary = EmployeeSummary::default();
    let mut present = 0.0_f64;

    for day in 1..=last_day {
        let Some(code) = attendance.get(day) else {
            continue;
        };
        match code {
            AttendanceCode::Present | AttendanceCode::WorkFromHome => present += 1.0,
            AttendanceCode::HalfDay => present += 0.5,
            AttendanceCode::Absent => summary.total_absent += 1,
            AttendanceCode::Off => summary.total_off += 1,
            AttendanceCode::Sunday => summary.total_sundays += 1,
            AttendanceCode::Holiday => summary.total_holidays += 1,
            AttendanceCode::NightShift => summary.total_night_shift += 1,
            AttendanceCode::Leave => summary.total_on_leave += 1,
        }
    }

    for day in 1..=last_day {
        match attendance.get(day) {
            Some(code) if code.is_working() => {}
            _ => continue,
        }
        let rest_day =
            weekday_of(day, month, year) == Some(SUNDAY) || holiday_days.contains(&day);
        if rest_day {
            summary.total_holy_day_working += 1;
        }
        if day > 1 && attendance.get(day - 1) == Some(AttendanceCode::Off) {
            summary.total_off_day_working += 1;
        }
    }

    let weighted = present
        + f64::from(summary.total_off)
        + f64::from(summary.total_sundays)
        + f64::from(summary.total_holidays)
        + f64::from(summary.total_night_shift)
        + f64::from(summary.total_holy_day_working) * 2.0
        + f64::from(summary.total_off_day_working) * 0.5;
    summary.total_working_days = weighted.floor() as u32;
    summary.total_present = present.floor() as u32;

    let ignored = attendance
        .iter()
        .filter(|(day, _)| !(1..=last_day).contains(day))
        .count();
    debug!(
        %month,
        year,
        ignored_days = ignored,
        working_days = summary.total_working_days,
        "summarised attendance"
    );
    summary
}

/// Percentage of `present` over `working_days` (or
/// [`DEFAULT_WORKING_DAYS`] when that is zero), rounded to two decimals.
pub fn attendance_percentage(present: f64, working_days: u32) -> f64 {
    let denominator = if working_days == 0 {
        DEFAULT_WORKING_DAYS
    } else {
        working_days
    };
    round2(present / f64::from(denominator) * 100.0)
}

/// Attendance percentage of a summary.
pub fn summary_percentage(summary: &EmployeeSummary) -> f64 {
    attendance_percentage(f64::from(summary.total_present), summary.total_working_days)
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// A stored summary that disagrees with the one derived from its
/// attendance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryMismatch {
    pub emp_id: String,
    pub stored: EmployeeSummary,
    pub derived: EmployeeSummary,
}

/// Recomputes every employee's summary in parallel and reports those
/// whose stored summary is stale.  Results keep roster order.
pub fn verify_summaries(roster: &Roster, holidays: &HolidayTable) -> Vec<SummaryMismatch> {
    roster
        .employees()
        .par_iter()
        .filter_map(|employee| {
            let derived = summarize(
                employee.attendance(),
                employee.month(),
                employee.year(),
                holidays,
            );
            (derived != *employee.summary()).then(|| SummaryMismatch {
                emp_id: employee.emp_id.clone(),
                stored: *employee.summary(),
                derived,
            })
        })
        .collect()
}
