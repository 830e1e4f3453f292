//! Roster operations.
//!
//! A [`Roster`] owns its records.  Records join through [`Roster::add`]
//! after validation, are updated by whole-record replacement keyed on
//! `emp_id`, and leave through [`Roster::remove`], after which serial
//! numbers are renumbered to stay dense and 1-based.

use crate::calendar::HolidayTable;
use crate::engine::verify_summaries;
use crate::error::AttendanceError;
use crate::models::{EmployeeRecord, Roster, RosterSnapshot};
use crate::mutators::refresh;
use crate::validation::{validate_employee, validate_fields};
use chrono::{DateTime, Utc};
use tracing::{info, warn};

/// Format version written into every snapshot.
pub const SNAPSHOT_VERSION: &str = "1.0";

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a roster from loose records: each is validated, its
    /// summary re-derived and serial numbers assigned in order.
    pub fn from_records(
        records: Vec<EmployeeRecord>,
        holidays: &HolidayTable,
    ) -> Result<Self, AttendanceError> {
        let mut roster = Roster::new();
        for record in records {
            roster.add(refresh(&record, holidays))?;
        }
        Ok(roster)
    }

    pub fn employees(&self) -> &[EmployeeRecord] {
        &self.employees
    }

    pub fn len(&self) -> usize {
        self.employees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.employees.is_empty()
    }

    pub fn get(&self, emp_id: &str) -> Option<&EmployeeRecord> {
        self.employees.iter().find(|e| e.emp_id == emp_id)
    }

    /// Appends a record after validating it against the roster.
    pub fn add(&mut self, mut record: EmployeeRecord) -> Result<(), AttendanceError> {
        let errors = validate_employee(&record, self);
        if !errors.is_empty() {
            return Err(AttendanceError::Validation(errors));
        }
        record.sl_no = self.employees.len() + 1;
        info!(emp_id = %record.emp_id, sl_no = record.sl_no, "added employee");
        self.employees.push(record);
        Ok(())
    }

    /// Replaces the record with the same `emp_id`, keeping its position.
    pub fn replace(&mut self, mut record: EmployeeRecord) -> Result<(), AttendanceError> {
        let errors = validate_fields(&record);
        if !errors.is_empty() {
            return Err(AttendanceError::Validation(errors));
        }
        let slot = self
            .employees
            .iter_mut()
            .find(|e| e.emp_id == record.emp_id)
            .ok_or_else(|| AttendanceError::EmployeeNotFound(record.emp_id.clone()))?;
        record.sl_no = slot.sl_no;
        *slot = record;
        Ok(())
    }

    /// Removes a record and renumbers the rest.
    pub fn remove(&mut self, emp_id: &str) -> Result<EmployeeRecord, AttendanceError> {
        let index = self
            .employees
            .iter()
            .position(|e| e.emp_id == emp_id)
            .ok_or_else(|| AttendanceError::EmployeeNotFound(emp_id.to_string()))?;
        let removed = self.employees.remove(index);
        self.renumber();
        info!(emp_id, remaining = self.employees.len(), "removed employee");
        Ok(removed)
    }

    fn renumber(&mut self) {
        for (index, employee) in self.employees.iter_mut().enumerate() {
            employee.sl_no = index + 1;
        }
    }

    /// Read-only copy for the persistence layer.
    pub fn snapshot(&self, saved_at: DateTime<Utc>) -> RosterSnapshot {
        RosterSnapshot {
            version: SNAPSHOT_VERSION.to_string(),
            saved_at,
            employees: self.employees.clone(),
        }
    }

    /// Restores a roster from a snapshot.  Stale summaries are logged and
    /// replaced by freshly derived ones.
    pub fn from_snapshot(
        snapshot: RosterSnapshot,
        holidays: &HolidayTable,
    ) -> Result<Self, AttendanceError> {
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(AttendanceError::UnsupportedVersion(snapshot.version));
        }
        let stored = Roster {
            employees: snapshot.employees,
        };
        for mismatch in verify_summaries(&stored, holidays) {
            warn!(
                emp_id = %mismatch.emp_id,
                stored = mismatch.stored.total_working_days,
                derived = mismatch.derived.total_working_days,
                "snapshot summary is stale, re-deriving"
            );
        }
        Self::from_records(stored.employees, holidays)
    }

    pub fn to_json(&self, saved_at: DateTime<Utc>) -> Result<String, AttendanceError> {
        Ok(serde_json::to_string_pretty(&self.snapshot(saved_at))?)
    }

    pub fn from_json(data: &str, holidays: &HolidayTable) -> Result<Self, AttendanceError> {
        let snapshot: RosterSnapshot = serde_json::from_str(data)?;
        Self::from_snapshot(snapshot, holidays)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::{consecutive_absences, monthly_statistics, ConsecutiveAbsences};
    use crate::models::{AttendanceCode, Month};
    use crate::mutators::{mark_weekends, set_day};
    use chrono::TimeZone;

    fn employee(emp_id: &str, name: &str) -> EmployeeRecord {
        EmployeeRecord::new(emp_id, name, Month::Apr, 2024)
    }

    fn roster_of(ids: &[&str]) -> Roster {
        let mut roster = Roster::new();
        for (i, id) in ids.iter().enumerate() {
            roster.add(employee(id, &format!("Employee {i}"))).unwrap();
        }
        roster
    }

    #[test]
    fn test_add_assigns_serial_numbers() {
        let roster = roster_of(&["AB-001", "AB-002", "AB-003"]);
        let serials: Vec<_> = roster.employees().iter().map(|e| e.sl_no()).collect();
        assert_eq!(serials, vec![1, 2, 3]);
    }

    #[test]
    fn test_add_rejects_invalid_and_duplicate() {
        let mut roster = roster_of(&["AB-001"]);
        let err = roster.add(employee("AB-001", "Someone Else")).unwrap_err();
        assert!(matches!(err, AttendanceError::Validation(_)));
        let err = roster.add(employee("bad", "X")).unwrap_err();
        assert_eq!(err.messages().len(), 2);
        assert_eq!(roster.len(), 1);
    }

    #[test]
    fn test_remove_renumbers_densely() {
        let mut roster = roster_of(&["AB-001", "AB-002", "AB-003", "AB-004"]);
        let removed = roster.remove("AB-002").unwrap();
        assert_eq!(removed.emp_id, "AB-002");
        let rows: Vec<_> = roster
            .employees()
            .iter()
            .map(|e| (e.sl_no(), e.emp_id.as_str()))
            .collect();
        assert_eq!(rows, vec![(1, "AB-001"), (2, "AB-003"), (3, "AB-004")]);
        assert!(matches!(
            roster.remove("AB-002"),
            Err(AttendanceError::EmployeeNotFound(_))
        ));
    }

    #[test]
    fn test_replace_by_id_keeps_position() {
        let holidays = HolidayTable::default();
        let mut roster = roster_of(&["AB-001", "AB-002"]);
        let edited = set_day(roster.get("AB-002").unwrap(), 2, "P", &holidays);
        roster.replace(edited).unwrap();
        let stored = roster.get("AB-002").unwrap();
        assert_eq!(stored.sl_no(), 2);
        assert_eq!(stored.summary().total_present, 1);

        let stranger = employee("ZZ-999", "Nobody Here");
        assert!(matches!(
            roster.replace(stranger),
            Err(AttendanceError::EmployeeNotFound(_))
        ));
    }

    #[test]
    fn test_snapshot_round_trip() {
        let holidays = HolidayTable::default();
        let mut roster = Roster::new();
        let record = set_day(&employee("AB-001", "Jane Doe"), 8, "O", &holidays);
        let record = mark_weekends(&record, &holidays);
        roster.add(set_day(&record, 9, "P", &holidays)).unwrap();

        let saved_at = Utc.with_ymd_and_hms(2024, 4, 30, 18, 0, 0).unwrap();
        let json = roster.to_json(saved_at).unwrap();
        assert!(json.contains("\"version\": \"1.0\""));
        assert!(json.contains("\"empId\": \"AB-001\""));

        let restored = Roster::from_json(&json, &holidays).unwrap();
        assert_eq!(restored, roster);
        assert_eq!(
            restored.get("AB-001").unwrap().attendance().get(7),
            Some(AttendanceCode::Sunday)
        );
    }

    #[test]
    fn test_snapshot_rederives_stale_summary() {
        let holidays = HolidayTable::default();
        let roster = Roster::from_records(
            vec![set_day(&employee("AB-001", "Jane Doe"), 2, "P", &holidays)],
            &holidays,
        )
        .unwrap();
        let mut snapshot = roster.snapshot(Utc::now());
        snapshot.employees[0].summary.total_present = 17;
        let stale = Roster {
            employees: snapshot.employees.clone(),
        };
        assert_eq!(verify_summaries(&stale, &holidays).len(), 1);

        let restored = Roster::from_snapshot(snapshot, &holidays).unwrap();
        assert_eq!(restored.get("AB-001").unwrap().summary().total_present, 1);
    }

    #[test]
    fn test_restore_drops_days_outside_month() {
        let data = r#"{
            "version": "1.0",
            "savedAt": "2024-05-31T09:00:00Z",
            "employees": [{
                "empId": "AB-001",
                "employeeName": "Jane Doe",
                "month": "Apr",
                "year": 2024,
                "attendance": {"31": "A", "32": "A", "40": "P"}
            }]
        }"#;
        let holidays = HolidayTable::default();
        let roster = Roster::from_json(data, &holidays).unwrap();
        let restored = roster.get("AB-001").unwrap();
        assert!(restored.attendance().is_empty());
        assert_eq!(
            consecutive_absences(restored.attendance()),
            ConsecutiveAbsences::default()
        );
        let may_31 = chrono::NaiveDate::from_ymd_opt(2024, 5, 31).unwrap();
        assert_eq!(monthly_statistics(&roster, may_31).absent_today, 0);
    }

    #[test]
    fn test_snapshot_version_is_checked() {
        let mut snapshot = Roster::new().snapshot(Utc::now());
        snapshot.version = "0.3".into();
        assert!(matches!(
            Roster::from_snapshot(snapshot, &HolidayTable::default()),
            Err(AttendanceError::UnsupportedVersion(_))
        ));
    }
}
