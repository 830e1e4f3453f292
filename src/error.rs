//! Error types shared by the roster, import and snapshot paths.
//!
//! The computation core (summaries, analytics and record mutators) is
//! total and never returns these; they only surface where data crosses
//! into or out of a [`Roster`](crate::models::Roster).

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AttendanceError {
    /// One or more human readable validation messages.
    #[error("Validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),
    #[error("Employee not found: {0}")]
    EmployeeNotFound(String),
    #[error("Unknown attendance code: {0:?}")]
    UnknownCode(String),
    #[error("Unknown month: {0}")]
    UnknownMonth(String),
    #[error("Malformed import row {row}: {reason}")]
    MalformedRow { row: usize, reason: String },
    #[error("Unsupported snapshot version: {0}")]
    UnsupportedVersion(String),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("JSON serialization/deserialization failed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AttendanceError {
    /// Messages for display.  Validation failures yield one entry per
    /// problem, everything else a single entry.
    pub fn messages(&self) -> Vec<String> {
        match self {
            AttendanceError::Validation(messages) => messages.clone(),
            other => vec![other.to_string()],
        }
    }
}
