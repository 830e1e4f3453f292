//! Roster analytics.
//!
//! Cross-employee statistics, absence analysis, day-by-day trends,
//! plain-text reports and month-over-month comparison.  Everything here
//! is a pure function of its arguments; the "today" used by
//! [`monthly_statistics`] is passed in by the caller.

use crate::calendar::{days_in_month, weekday_of, HolidayTable, FRIDAY, MONDAY, SUNDAY};
use crate::engine::{attendance_percentage, round2, summary_percentage};
use crate::models::{AttendanceCode, DayAttendance, EmployeeRecord, EmployeeSummary, Month, Roster};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Write as _};

/// Employees at or above this percentage get the excellent remark.
pub const EXCELLENT_THRESHOLD: f64 = 95.0;
/// Employees below this percentage are critical.
pub const CRITICAL_THRESHOLD: f64 = 75.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyStatistics {
    /// Number of employees on the roster.
    pub total_strength: usize,
    /// Employees coded `P`, `N` or `WFH` today.
    pub present_today: usize,
    /// Employees coded `A` today.
    pub absent_today: usize,
    /// Employees coded `L` today.
    pub on_leave_today: usize,
    /// Mean attendance percentage, rounded to two decimals.
    pub average_attendance: f64,
    /// Employees at or above 100%.
    pub perfect_attendance_count: usize,
    /// Employees below [`CRITICAL_THRESHOLD`].
    pub critical_attendance_count: usize,
}

/// Roster-wide figures.  "Today" is the day of month of `as_of`, looked
/// up directly in each employee's attendance.
pub fn monthly_statistics(roster: &Roster, as_of: NaiveDate) -> MonthlyStatistics {
    let today = as_of.day();
    let employees = roster.employees();
    let today_codes: Vec<_> = employees
        .iter()
        .map(|e| e.attendance().get(today))
        .collect();
    let count_today = |pred: fn(AttendanceCode) -> bool| {
        today_codes.iter().flatten().filter(|&&code| pred(code)).count()
    };

    let percentages: Vec<f64> = employees
        .iter()
        .map(|e| summary_percentage(e.summary()))
        .collect();
    let average_attendance = if percentages.is_empty() {
        0.0
    } else {
        round2(percentages.iter().sum::<f64>() / percentages.len() as f64)
    };

    MonthlyStatistics {
        total_strength: employees.len(),
        present_today: count_today(AttendanceCode::is_working),
        absent_today: count_today(|c| c == AttendanceCode::Absent),
        on_leave_today: count_today(|c| c == AttendanceCode::Leave),
        average_attendance,
        perfect_attendance_count: percentages.iter().filter(|&&p| p >= 100.0).count(),
        critical_attendance_count: percentages
            .iter()
            .filter(|&&p| p < CRITICAL_THRESHOLD)
            .count(),
    }
}

/// One unbroken run of absences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbsenceRun {
    /// First absent day of the run.
    pub start: u32,
    /// Last absent day of the run.
    pub end: u32,
    /// Number of absent days in the run.
    pub count: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsecutiveAbsences {
    pub max_consecutive: u32,
    pub total_instances: usize,
    pub instances: Vec<AbsenceRun>,
}

/// Runs of `A` over the recorded days in ascending order.  Unmarked days
/// are skipped rather than breaking a run; any other code closes it.
pub fn consecutive_absences(attendance: &DayAttendance) -> ConsecutiveAbsences {
    let mut instances = Vec::new();
    let mut current: Option<AbsenceRun> = None;

    for (day, code) in attendance.iter() {
        if code == AttendanceCode::Absent {
            current = Some(match current {
                Some(run) => AbsenceRun {
                    end: day,
                    count: run.count + 1,
                    ..run
                },
                None => AbsenceRun {
                    start: day,
                    end: day,
                    count: 1,
                },
            });
        } else if let Some(run) = current.take() {
            instances.push(run);
        }
    }
    instances.extend(current);

    ConsecutiveAbsences {
        max_consecutive: instances.iter().map(|r| r.count).max().unwrap_or(0),
        total_instances: instances.len(),
        instances,
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AbsencePatterns {
    pub monday_absences: u32,
    pub friday_absences: u32,
    pub after_holiday_absences: u32,
    pub before_holiday_absences: u32,
}

fn is_rest_code(code: Option<AttendanceCode>) -> bool {
    matches!(code, Some(AttendanceCode::Holiday | AttendanceCode::Sunday))
}

/// Where absences fall: on Mondays or Fridays, and right after or
/// before a day coded `H` or `S`.
pub fn attendance_patterns(attendance: &DayAttendance, month: Month, year: i32) -> AbsencePatterns {
    let mut patterns = AbsencePatterns::default();
    let last_day = days_in_month(month, year);

    for (day, code) in attendance.iter() {
        if code != AttendanceCode::Absent || !(1..=last_day).contains(&day) {
            continue;
        }
        match weekday_of(day, month, year) {
            Some(MONDAY) => patterns.monday_absences += 1,
            Some(FRIDAY) => patterns.friday_absences += 1,
            _ => {}
        }
        if day > 1 && is_rest_code(attendance.get(day - 1)) {
            patterns.after_holiday_absences += 1;
        }
        if day < last_day && is_rest_code(attendance.get(day + 1)) {
            patterns.before_holiday_absences += 1;
        }
    }
    patterns
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendPoint {
    /// Day of month, starting at 1.
    pub day: u32,
    /// Recorded code, `None` when the day is unmarked.
    pub code: Option<AttendanceCode>,
    /// Coded `P`, `N` or `WFH`.
    pub is_present: bool,
    pub is_absent: bool,
    pub is_leave: bool,
    /// The day is a Sunday.
    pub is_weekend: bool,
    /// The day is listed in the holiday table.
    pub is_holiday: bool,
}

/// One point per day of the month.  The organisation's weekly rest day
/// is Sunday, so only Sundays are flagged as weekend.
pub fn attendance_trend(
    attendance: &DayAttendance,
    month: Month,
    year: i32,
    holidays: &HolidayTable,
) -> Vec<TrendPoint> {
    (1..=days_in_month(month, year))
        .map(|day| {
            let code = attendance.get(day);
            TrendPoint {
                day,
                code,
                is_present: code.is_some_and(AttendanceCode::is_working),
                is_absent: code == Some(AttendanceCode::Absent),
                is_leave: code == Some(AttendanceCode::Leave),
                is_weekend: weekday_of(day, month, year) == Some(SUNDAY),
                is_holiday: holidays.is_holiday(day, month),
            }
        })
        .collect()
}

const RULE: &str = "--------------------------------------------------";

/// Plain-text report for one employee's active month.
///
/// Sections: header, summary, absence patterns (only when the employee
/// has absences) and a closing remark.
pub fn report(employee: &EmployeeRecord) -> String {
    let mut out = String::new();
    write_report(&mut out, employee).expect("writing to a String never fails");
    out
}

fn write_report(out: &mut impl fmt::Write, employee: &EmployeeRecord) -> fmt::Result {
    let summary = employee.summary();
    let percentage = summary_percentage(summary);

    writeln!(out, "ATTENDANCE REPORT")?;
    writeln!(out, "{}", RULE.replace('-', "="))?;
    writeln!(out, "Employee: {} ({})", employee.employee_name, employee.emp_id)?;
    writeln!(out, "Period: {} {}", employee.month().full_name(), employee.year())?;
    writeln!(out)?;

    writeln!(out, "SUMMARY")?;
    writeln!(out, "{RULE}")?;
    let rows = [
        ("Present Days", summary.total_present),
        ("Absent Days", summary.total_absent),
        ("On Leave", summary.total_on_leave),
        ("Off Days", summary.total_off),
        ("Sundays", summary.total_sundays),
        ("Holidays", summary.total_holidays),
        ("Night Shifts", summary.total_night_shift),
        ("Holy Day Working", summary.total_holy_day_working),
        ("Off Day Working", summary.total_off_day_working),
        ("Total Working Days", summary.total_working_days),
    ];
    for (label, value) in rows {
        writeln!(out, "{:<24}{}", format!("{label}:"), value)?;
    }
    writeln!(out, "{:<24}{:.2}%", "Attendance Percentage:", percentage)?;
    writeln!(out)?;

    if summary.total_absent > 0 {
        let runs = consecutive_absences(employee.attendance());
        let patterns =
            attendance_patterns(employee.attendance(), employee.month(), employee.year());
        writeln!(out, "ABSENCE PATTERNS")?;
        writeln!(out, "{RULE}")?;
        writeln!(out, "{:<24}{}", "Longest Absence Streak:", runs.max_consecutive)?;
        writeln!(out, "{:<24}{}", "Absence Streaks:", runs.total_instances)?;
        for run in &runs.instances {
            writeln!(out, "  Day {} to {} ({} days)", run.start, run.end, run.count)?;
        }
        writeln!(out, "{:<24}{}", "Monday Absences:", patterns.monday_absences)?;
        writeln!(out, "{:<24}{}", "Friday Absences:", patterns.friday_absences)?;
        writeln!(out, "{:<24}{}", "After Holidays:", patterns.after_holiday_absences)?;
        writeln!(out, "{:<24}{}", "Before Holidays:", patterns.before_holiday_absences)?;
        writeln!(out)?;
    }

    writeln!(out, "REMARKS")?;
    writeln!(out, "{RULE}")?;
    let remark = if percentage >= EXCELLENT_THRESHOLD {
        "Excellent attendance record."
    } else if percentage < CRITICAL_THRESHOLD {
        "Attendance is below the required 75% threshold."
    } else {
        "Attendance is satisfactory."
    };
    writeln!(out, "{remark}")
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthComparison {
    pub present_diff: i64,
    pub absent_diff: i64,
    pub leave_diff: i64,
    /// Present-day delta run through the percentage formula against the
    /// current month's working days.  Not a rate of change.
    pub improvement_percentage: f64,
}

pub fn compare(current: &EmployeeSummary, previous: &EmployeeSummary) -> MonthComparison {
    let diff = |a: u32, b: u32| i64::from(a) - i64::from(b);
    let present_diff = diff(current.total_present, previous.total_present);
    MonthComparison {
        present_diff,
        absent_diff: diff(current.total_absent, previous.total_absent),
        leave_diff: diff(current.total_on_leave, previous.total_on_leave),
        improvement_percentage: attendance_percentage(
            present_diff as f64,
            current.total_working_days,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mutators::bulk_set;

    fn attendance(entries: &[(u32, AttendanceCode)]) -> DayAttendance {
        entries.iter().copied().collect()
    }

    fn employee(emp_id: &str, edits: &[(u32, &str)]) -> EmployeeRecord {
        let record = EmployeeRecord::new(emp_id, "Test Person", Month::Apr, 2024);
        bulk_set(&record, edits.iter().copied(), &HolidayTable::default())
    }

    #[test]
    fn test_consecutive_absences_single_run() {
        use AttendanceCode::*;
        let runs = consecutive_absences(&attendance(&[
            (3, Absent),
            (4, Absent),
            (5, Absent),
            (6, Present),
        ]));
        assert_eq!(runs.max_consecutive, 3);
        assert_eq!(runs.total_instances, 1);
        assert_eq!(runs.instances, vec![AbsenceRun { start: 3, end: 5, count: 3 }]);
    }

    #[test]
    fn test_consecutive_absences_run_reaching_month_end() {
        use AttendanceCode::*;
        let runs = consecutive_absences(&attendance(&[
            (1, Absent),
            (2, Present),
            (29, Absent),
            (30, Absent),
        ]));
        assert_eq!(runs.total_instances, 2);
        assert_eq!(runs.max_consecutive, 2);
        assert_eq!(runs.instances[1], AbsenceRun { start: 29, end: 30, count: 2 });
    }

    #[test]
    fn test_consecutive_absences_empty() {
        assert_eq!(consecutive_absences(&DayAttendance::new()), ConsecutiveAbsences::default());
    }

    #[test]
    fn test_attendance_patterns() {
        use AttendanceCode::*;
        // April 2024: 1st and 8th are Mondays, 5th is a Friday, 7th a Sunday.
        let patterns = attendance_patterns(
            &attendance(&[
                (1, Absent),
                (5, Absent),
                (6, Absent),
                (7, Sunday),
                (8, Absent),
                (30, Absent),
            ]),
            Month::Apr,
            2024,
        );
        assert_eq!(patterns.monday_absences, 2);
        assert_eq!(patterns.friday_absences, 1);
        assert_eq!(patterns.after_holiday_absences, 1);
        assert_eq!(patterns.before_holiday_absences, 1);
    }

    #[test]
    fn test_attendance_trend() {
        use AttendanceCode::*;
        let trend = attendance_trend(
            &attendance(&[(1, WorkFromHome), (2, Absent), (3, Leave), (26, HalfDay)]),
            Month::Jan,
            2024,
            &HolidayTable::default(),
        );
        assert_eq!(trend.len(), 31);
        assert!(trend[0].is_present && trend[0].is_holiday);
        assert!(trend[1].is_absent);
        assert!(trend[2].is_leave);
        assert!(trend[6].is_weekend);
        assert!(!trend[25].is_present);
        assert_eq!(trend[4].code, None);
    }

    #[test]
    fn test_trend_flags_deserialized_holidays() {
        let holidays: HolidayTable = serde_json::from_str(r#"{"Jan": [26, 15, 1]}"#).unwrap();
        let trend = attendance_trend(&DayAttendance::new(), Month::Jan, 2024, &holidays);
        let flagged: Vec<u32> = trend.iter().filter(|p| p.is_holiday).map(|p| p.day).collect();
        assert_eq!(flagged, holidays.holidays_in_month(Month::Jan, 2024));
        assert_eq!(flagged, vec![1, 15, 26]);
    }

    #[test]
    fn test_monthly_statistics() {
        let mut roster = Roster::new();
        // 10 present days, nothing else: 100%.
        let full: Vec<(u32, &str)> = (1..=5).chain(8..=12).map(|d| (d, "P")).collect();
        roster.add(employee("AB-001", &full)).unwrap();
        // 3 present out of 5 working days: 60%.
        let mixed = [(1, "P"), (2, "A"), (3, "P"), (4, "L"), (5, "P"), (8, "O"), (9, "O")];
        roster.add(employee("AB-002", &mixed)).unwrap();
        roster.add(employee("AB-003", &[(2, "N")])).unwrap();

        let as_of = NaiveDate::from_ymd_opt(2024, 4, 2).unwrap();
        let stats = monthly_statistics(&roster, as_of);
        assert_eq!(stats.total_strength, 3);
        assert_eq!(stats.present_today, 2);
        assert_eq!(stats.absent_today, 1);
        assert_eq!(stats.on_leave_today, 0);
        assert_eq!(stats.perfect_attendance_count, 1);
        // AB-003 has no present days: 0%.
        assert_eq!(stats.critical_attendance_count, 2);
        assert_eq!(stats.average_attendance, 53.33);
    }

    #[test]
    fn test_monthly_statistics_empty_roster() {
        let as_of = NaiveDate::from_ymd_opt(2024, 4, 2).unwrap();
        let stats = monthly_statistics(&Roster::new(), as_of);
        assert_eq!(stats.total_strength, 0);
        assert_eq!(stats.average_attendance, 0.0);
    }

    #[test]
    fn test_report_sections() {
        let perfect: Vec<(u32, &str)> = (1..=5).map(|d| (d, "P")).collect();
        let text = report(&employee("AB-001", &perfect));
        assert!(text.starts_with("ATTENDANCE REPORT\n"));
        assert!(text.contains("Period: April 2024"));
        assert!(text.contains("Attendance Percentage:  100.00%"));
        assert!(!text.contains("ABSENCE PATTERNS"));
        assert!(text.contains("Excellent attendance record."));

        let poor = report(&employee("AB-002", &[(1, "P"), (2, "A"), (3, "A"), (4, "O")]));
        let summary_at = poor.find("SUMMARY").unwrap();
        let patterns_at = poor.find("ABSENCE PATTERNS").unwrap();
        let remarks_at = poor.find("REMARKS").unwrap();
        assert!(summary_at < patterns_at && patterns_at < remarks_at);
        assert!(poor.contains("Longest Absence Streak: 2"));
        assert!(poor.contains("below the required 75%"));
    }

    #[test]
    fn test_compare_preserves_delta_percentage() {
        let current = EmployeeSummary {
            total_present: 20,
            total_absent: 1,
            total_on_leave: 1,
            total_working_days: 25,
            ..Default::default()
        };
        let previous = EmployeeSummary {
            total_present: 18,
            total_absent: 3,
            total_on_leave: 0,
            total_working_days: 24,
            ..Default::default()
        };
        let comparison = compare(&current, &previous);
        assert_eq!(comparison.present_diff, 2);
        assert_eq!(comparison.absent_diff, -2);
        assert_eq!(comparison.leave_diff, 1);
        assert_eq!(comparison.improvement_percentage, 8.0);

        let worse = compare(&previous, &current);
        assert_eq!(worse.present_diff, -2);
        assert_eq!(worse.improvement_percentage, -8.33);
    }
}
