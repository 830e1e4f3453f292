//! Attendance code registry.
//!
//! Canonical tokens, display labels and colour hints for the nine
//! attendance codes, plus the normalisation applied to every raw value
//! that enters the system (cell edits and file imports alike).

use crate::error::AttendanceError;
use crate::models::AttendanceCode;
use std::fmt;
use std::str::FromStr;

impl AttendanceCode {
    /// Every code, in registry order.
    pub const ALL: [AttendanceCode; 9] = [
        AttendanceCode::Present,
        AttendanceCode::Absent,
        AttendanceCode::Off,
        AttendanceCode::Sunday,
        AttendanceCode::Holiday,
        AttendanceCode::NightShift,
        AttendanceCode::Leave,
        AttendanceCode::HalfDay,
        AttendanceCode::WorkFromHome,
    ];

    /// Canonical token as written in the spreadsheet.
    pub fn as_str(self) -> &'static str {
        match self {
            AttendanceCode::Present => "P",
            AttendanceCode::Absent => "A",
            AttendanceCode::Off => "O",
            AttendanceCode::Sunday => "S",
            AttendanceCode::Holiday => "H",
            AttendanceCode::NightShift => "N",
            AttendanceCode::Leave => "L",
            AttendanceCode::HalfDay => "HD",
            AttendanceCode::WorkFromHome => "WFH",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AttendanceCode::Present => "Present",
            AttendanceCode::Absent => "Absent",
            AttendanceCode::Off => "Off",
            AttendanceCode::Sunday => "Sunday",
            AttendanceCode::Holiday => "Holiday",
            AttendanceCode::NightShift => "Night Shift",
            AttendanceCode::Leave => "Leave",
            AttendanceCode::HalfDay => "Half Day",
            AttendanceCode::WorkFromHome => "Work From Home",
        }
    }

    /// `(foreground, background)` colour hints for grid rendering.
    pub fn colors(self) -> (&'static str, &'static str) {
        match self {
            AttendanceCode::Present => ("#166534", "#dcfce7"),
            AttendanceCode::Absent => ("#991b1b", "#fee2e2"),
            AttendanceCode::Off => ("#374151", "#f3f4f6"),
            AttendanceCode::Sunday => ("#1e40af", "#dbeafe"),
            AttendanceCode::Holiday => ("#6b21a8", "#f3e8ff"),
            AttendanceCode::NightShift => ("#3730a3", "#e0e7ff"),
            AttendanceCode::Leave => ("#92400e", "#fef3c7"),
            AttendanceCode::HalfDay => ("#9a3412", "#ffedd5"),
            AttendanceCode::WorkFromHome => ("#115e59", "#ccfbf1"),
        }
    }

    /// Codes that count as attending: present, night shift and work from
    /// home.  Half days are not included.
    pub fn is_working(self) -> bool {
        matches!(
            self,
            AttendanceCode::Present | AttendanceCode::NightShift | AttendanceCode::WorkFromHome
        )
    }
}

impl fmt::Display for AttendanceCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AttendanceCode {
    type Err = AttendanceError;

    /// Strict form of [`normalize`]: values outside the registry are an error.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        normalize(s).ok_or_else(|| AttendanceError::UnknownCode(s.to_string()))
    }
}

/// Normalises a raw cell value.
///
/// Input is trimmed and uppercased, so the legacy lowercase `a` becomes
/// `A`.  Anything outside the registry yields `None`, which callers
/// treat as "no entry".  Idempotent through [`normalize_str`].
pub fn normalize(raw: &str) -> Option<AttendanceCode> {
    let upper = raw.trim().to_uppercase();
    AttendanceCode::ALL
        .into_iter()
        .find(|code| code.as_str() == upper)
}

/// String form of [`normalize`]: the canonical token or `""`.
pub fn normalize_str(raw: &str) -> &'static str {
    normalize(raw).map(AttendanceCode::as_str).unwrap_or("")
}
