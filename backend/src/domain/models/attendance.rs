//! Attendance ledger: one dated Present/Absent log per (student, course).

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use shared::AttendanceStatus;

use crate::domain::error::ValidationError;

/// Storage and map-key format of a normalized day
pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, PartialEq)]
pub struct AttendanceRecord {
    pub date: NaiveDate,
    pub status: AttendanceStatus,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AttendanceLedger {
    pub student_id: String,
    pub course_id: String,
    /// Ordered by date, at most one record per day
    pub records: Vec<AttendanceRecord>,
}

impl AttendanceLedger {
    pub fn total(&self) -> u32 {
        self.records.len() as u32
    }

    pub fn present(&self) -> u32 {
        self.records
            .iter()
            .filter(|record| record.status == AttendanceStatus::Present)
            .count() as u32
    }

    pub fn percentage(&self) -> u32 {
        attendance_percentage(self.present(), self.total())
    }
}

/// Present share as a whole percentage. An empty ledger counts as fully present.
pub fn attendance_percentage(present: u32, total: u32) -> u32 {
    if total == 0 {
        return 100;
    }
    ((present as f64 / total as f64) * 100.0).round() as u32
}

/// Reduce a submitted date to its calendar day.
///
/// Accepts `YYYY-MM-DD`, RFC 3339 timestamps (the day in the timestamp's own
/// offset) and naive `YYYY-MM-DDTHH:MM:SS` timestamps.
pub fn normalize_date(raw: &str) -> Result<NaiveDate, ValidationError> {
    let trimmed = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, DATE_FORMAT) {
        return Ok(date);
    }
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(timestamp.date_naive());
    }
    if let Ok(timestamp) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(timestamp.date());
    }
    Err(ValidationError::InvalidDate(raw.to_string()))
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(day: u32, status: AttendanceStatus) -> AttendanceRecord {
        AttendanceRecord {
            date: NaiveDate::from_ymd_opt(2024, 3, day).unwrap(),
            status,
        }
    }

    #[test]
    fn test_empty_ledger_is_fully_present() {
        let ledger = AttendanceLedger {
            student_id: "s".to_string(),
            course_id: "c".to_string(),
            records: vec![],
        };
        assert_eq!(ledger.total(), 0);
        assert_eq!(ledger.percentage(), 100);
    }

    #[test]
    fn test_percentage_rounds_to_nearest() {
        let ledger = AttendanceLedger {
            student_id: "s".to_string(),
            course_id: "c".to_string(),
            records: vec![
                record(1, AttendanceStatus::Present),
                record(2, AttendanceStatus::Absent),
                record(3, AttendanceStatus::Present),
            ],
        };
        assert_eq!(ledger.present(), 2);
        assert_eq!(ledger.percentage(), 67);

        assert_eq!(attendance_percentage(1, 1), 100);
        assert_eq!(attendance_percentage(0, 4), 0);
        assert_eq!(attendance_percentage(1, 8), 13);
        assert_eq!(attendance_percentage(1, 200), 1);
    }

    #[test]
    fn test_normalize_date_drops_time_of_day() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        assert_eq!(normalize_date("2024-03-05").unwrap(), expected);
        assert_eq!(normalize_date("2024-03-05T17:45:00Z").unwrap(), expected);
        assert_eq!(normalize_date("2024-03-05T23:30:00+05:30").unwrap(), expected);
        assert_eq!(normalize_date("2024-03-05T08:00:00.250").unwrap(), expected);
        assert_eq!(format_date(expected), "2024-03-05");
    }

    #[test]
    fn test_normalize_date_rejects_garbage() {
        assert_eq!(
            normalize_date("yesterday"),
            Err(ValidationError::InvalidDate("yesterday".to_string()))
        );
        assert!(normalize_date("2024-02-30").is_err());
    }
}
