//! Attendance entries produced by accepted scans.

use chrono::NaiveDateTime;
use serde::Serialize;
use std::fmt;

/// Pattern used when an attendance timestamp is rendered for storage.
pub const RECORDED_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// National identity number of the person checking in.
///
/// Surrounding whitespace is dropped; an empty value is not an identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Cedula(String);

impl Cedula {
    /// Parse an identity, returning `None` when it is blank.
    pub fn parse(value: &str) -> Option<Self> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Cedula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One accepted check-in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttendanceRecord {
    /// Who checked in
    pub cedula: Cedula,
    /// The token that was scanned, exactly as presented
    pub token: String,
    /// Local wall time of acceptance, second precision
    pub recorded_at: NaiveDateTime,
}

impl AttendanceRecord {
    /// `recorded_at` rendered as `YYYY-MM-DD HH:MM:SS`.
    pub fn recorded_at_display(&self) -> String {
        self.recorded_at.format(RECORDED_AT_FORMAT).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_cedula_trims_and_rejects_blank() {
        assert_eq!(Cedula::parse(" 0912345678 ").unwrap().as_str(), "0912345678");
        assert!(Cedula::parse("").is_none());
        assert!(Cedula::parse("   ").is_none());
    }

    #[test]
    fn test_recorded_at_display() {
        let record = AttendanceRecord {
            cedula: Cedula::parse("0912345678").unwrap(),
            token: "abc".to_string(),
            recorded_at: NaiveDate::from_ymd_opt(2024, 1, 1)
                .unwrap()
                .and_hms_opt(8, 5, 9)
                .unwrap(),
        };
        assert_eq!(record.recorded_at_display(), "2024-01-01 08:05:09");
    }
}
