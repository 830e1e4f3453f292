//! Employee validation.
//!
//! Validation never fails a computation; it produces a list of human
//! readable messages that the roster checks before admitting a record.

use crate::models::{EmployeeRecord, Roster};
use once_cell::sync::Lazy;
use regex::Regex;

static EMP_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z]{2,3}-\d{3,5}$").expect("employee id pattern"));
static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern"));
static PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+?[0-9][0-9 \-]*$").expect("phone pattern"));

pub const NAME_MIN_LEN: usize = 3;
pub const NAME_MAX_LEN: usize = 50;

/// Checks the record's own fields (ID format, name length, email and
/// phone format).
pub fn validate_fields(record: &EmployeeRecord) -> Vec<String> {
    let mut errors = Vec::new();

    if record.emp_id.trim().is_empty() {
        errors.push("Employee ID is required".to_string());
    } else if !EMP_ID_RE.is_match(&record.emp_id) {
        errors.push(format!(
            "Employee ID '{}' must look like AB-123 (2-3 capital letters, dash, 3-5 digits)",
            record.emp_id
        ));
    }

    let name_len = record.employee_name.trim().chars().count();
    if name_len < NAME_MIN_LEN || name_len > NAME_MAX_LEN {
        errors.push(format!(
            "Employee name must be between {NAME_MIN_LEN} and {NAME_MAX_LEN} characters"
        ));
    }

    if let Some(email) = record.email.as_deref().filter(|e| !e.is_empty()) {
        if !EMAIL_RE.is_match(email) {
            errors.push(format!("Invalid email address: {email}"));
        }
    }

    if let Some(phone) = record.phone.as_deref().filter(|p| !p.is_empty()) {
        let digits = phone.chars().filter(char::is_ascii_digit).count();
        if !PHONE_RE.is_match(phone) || !(10..=15).contains(&digits) {
            errors.push(format!("Invalid phone number: {phone}"));
        }
    }

    errors
}

/// Full check for a record about to join `roster`: field checks plus
/// employee ID uniqueness.
pub fn validate_employee(record: &EmployeeRecord, roster: &Roster) -> Vec<String> {
    let mut errors = validate_fields(record);
    if roster.get(&record.emp_id).is_some() {
        errors.push(format!("Employee ID '{}' already exists", record.emp_id));
    }
    errors
}
