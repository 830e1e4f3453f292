//! Import and export boundary.
//!
//! The spreadsheet adapter hands the core loosely typed rows
//! ([`ImportRow`]) and receives flat export rows ([`ExportRow`]).  Raw
//! codes are normalised on the way in, summaries are always re-derived,
//! and any summary that came with a row is compared against the derived
//! one.  A CSV rendition of the same row layout is provided through the
//! [`csv`] crate.

use crate::calendar::{days_in_month, HolidayTable};
use crate::codes::normalize;
use crate::engine::SummaryMismatch;
use crate::error::AttendanceError;
use crate::models::{EmployeeRecord, EmployeeSummary, Month, Roster};
use crate::mutators::bulk_set;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{info, warn};

/// Number of day columns in the tabular layout.
pub const DAY_COLUMNS: u32 = 31;
const LEADING_COLUMNS: usize = 4;
const SUMMARY_COLUMNS: [&str; 10] = [
    "Total Present",
    "Total Off",
    "Total Sundays",
    "Total Holidays",
    "Total Night Shift",
    "Total Holy Day Working",
    "Total Off Day Working",
    "Total Absent",
    "Total On Leave",
    "Total Working Days",
];

/// One employee as parsed by a file adapter, before normalisation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportRow {
    pub emp_id: String,
    pub employee_name: String,
    pub month: String,
    #[serde(default)]
    pub attendance: BTreeMap<u32, String>,
    /// Pre-computed totals, if the file carried them.
    #[serde(default)]
    pub summary: Option<EmployeeSummary>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImportOutcome {
    pub roster: Roster,
    /// Rows whose supplied totals differ from the derived ones.
    pub mismatches: Vec<SummaryMismatch>,
}

/// Turns parsed rows into a roster for `year`.
///
/// Unrecognised codes are dropped as "no entry"; rows that fail
/// validation abort the import.
pub fn import_rows(
    rows: Vec<ImportRow>,
    year: i32,
    holidays: &HolidayTable,
) -> Result<ImportOutcome, AttendanceError> {
    let mut roster = Roster::new();
    let mut mismatches = Vec::new();

    for row in rows {
        let month: Month = row.month.parse()?;
        let unrecognised = row
            .attendance
            .values()
            .filter(|raw| !raw.trim().is_empty() && normalize(raw).is_none())
            .count();
        if unrecognised > 0 {
            warn!(emp_id = %row.emp_id, unrecognised, "dropping unrecognised attendance codes");
        }

        let mut record = EmployeeRecord::new(row.emp_id, row.employee_name, month, year);
        record.email = row.email;
        record.phone = row.phone;
        record.department = row.department;
        let record = bulk_set(&record, row.attendance, holidays);

        if let Some(stored) = row.summary {
            if stored != *record.summary() {
                warn!(emp_id = %record.emp_id, "imported totals differ from derived totals");
                mismatches.push(SummaryMismatch {
                    emp_id: record.emp_id.clone(),
                    stored,
                    derived: *record.summary(),
                });
            }
        }
        roster.add(record)?;
    }

    info!(employees = roster.len(), mismatches = mismatches.len(), "imported roster");
    Ok(ImportOutcome { roster, mismatches })
}

/// Flat export row in column order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportRow {
    pub sl_no: usize,
    pub emp_id: String,
    pub employee_name: String,
    pub month: Month,
    /// Exactly [`DAY_COLUMNS`] cells; blank for unmarked days and for
    /// days past the end of the month.
    pub days: Vec<String>,
    pub summary: EmployeeSummary,
}

impl ExportRow {
    fn to_record(&self) -> Vec<String> {
        let s = &self.summary;
        let totals = [
            s.total_present,
            s.total_off,
            s.total_sundays,
            s.total_holidays,
            s.total_night_shift,
            s.total_holy_day_working,
            s.total_off_day_working,
            s.total_absent,
            s.total_on_leave,
            s.total_working_days,
        ];
        [
            self.sl_no.to_string(),
            self.emp_id.clone(),
            self.employee_name.clone(),
            self.month.to_string(),
        ]
        .into_iter()
        .chain(self.days.iter().cloned())
        .chain(totals.iter().map(u32::to_string))
        .collect()
    }
}

pub fn export_rows(roster: &Roster) -> Vec<ExportRow> {
    roster
        .employees()
        .iter()
        .map(|employee| {
            let last_day = days_in_month(employee.month(), employee.year());
            let days = (1..=DAY_COLUMNS)
                .map(|day| match employee.attendance().get(day) {
                    Some(code) if day <= last_day => code.as_str().to_string(),
                    _ => String::new(),
                })
                .collect();
            ExportRow {
                sl_no: employee.sl_no(),
                emp_id: employee.emp_id.clone(),
                employee_name: employee.employee_name.clone(),
                month: employee.month(),
                days,
                summary: *employee.summary(),
            }
        })
        .collect()
}

fn header() -> Vec<String> {
    ["SL No", "Emp ID", "Employee Name", "Month"]
        .iter()
        .map(|h| h.to_string())
        .chain((1..=DAY_COLUMNS).map(|day| day.to_string()))
        .chain(SUMMARY_COLUMNS.iter().map(|h| h.to_string()))
        .collect()
}

pub fn write_csv<W: std::io::Write>(roster: &Roster, writer: W) -> Result<(), AttendanceError> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(header())?;
    for row in export_rows(roster) {
        wtr.write_record(row.to_record())?;
    }
    wtr.flush()?;
    Ok(())
}

/// Parses the layout written by [`write_csv`].  Summary columns are
/// optional; when any of them is missing or not a number the row
/// carries no summary.
pub fn read_csv<R: std::io::Read>(reader: R) -> Result<Vec<ImportRow>, AttendanceError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);
    let mut rows = Vec::new();

    for (index, result) in rdr.records().enumerate() {
        let record = result?;
        if record.len() < LEADING_COLUMNS {
            return Err(AttendanceError::MalformedRow {
                row: index + 1,
                reason: format!(
                    "expected at least {LEADING_COLUMNS} columns, found {}",
                    record.len()
                ),
            });
        }
        let cell = |i: usize| record.get(i).unwrap_or("").trim();

        let attendance = (1..=DAY_COLUMNS)
            .filter_map(|day| {
                let raw = cell(LEADING_COLUMNS + day as usize - 1);
                (!raw.is_empty()).then(|| (day, raw.to_string()))
            })
            .collect();

        let first_total = LEADING_COLUMNS + DAY_COLUMNS as usize;
        let totals: Option<Vec<u32>> = (first_total..first_total + SUMMARY_COLUMNS.len())
            .map(|i| cell(i).parse().ok())
            .collect();
        let summary = totals.map(|t| EmployeeSummary {
            total_present: t[0],
            total_off: t[1],
            total_sundays: t[2],
            total_holidays: t[3],
            total_night_shift: t[4],
            total_holy_day_working: t[5],
            total_off_day_working: t[6],
            total_absent: t[7],
            total_on_leave: t[8],
            total_working_days: t[9],
        });

        rows.push(ImportRow {
            emp_id: cell(1).to_string(),
            employee_name: cell(2).to_string(),
            month: cell(3).to_string(),
            attendance,
            summary,
            email: None,
            phone: None,
            department: None,
        });
    }
    Ok(rows)
}
