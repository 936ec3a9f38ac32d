use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};

use crate::domain::error::ValidationError;

#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub id: String,
    pub title: String,
    /// RFC 3339 timestamp
    pub date: String,
    pub category: String,
    pub location: String,
    pub faculty_coordinator_id: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl Event {
    pub fn generate_id() -> String {
        uuid::Uuid::new_v4().to_string()
    }
}

/// An event with its coordinator's name and registered students
#[derive(Debug, Clone, PartialEq)]
pub struct EventDetails {
    pub event: Event,
    pub coordinator_name: Option<String>,
    pub student_ids: Vec<String>,
}

/// Canonical UTC form of an event date, so stored dates sort as text.
///
/// Accepts RFC 3339 timestamps and bare `YYYY-MM-DD` days (taken as midnight UTC).
pub fn normalize_event_date(raw: &str) -> Result<String, ValidationError> {
    let trimmed = raw.trim();
    let timestamp = if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        parsed.with_timezone(&Utc)
    } else if let Some(midnight) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|day| day.and_hms_opt(0, 0, 0))
    {
        midnight.and_utc()
    } else {
        return Err(ValidationError::InvalidDate(raw.to_string()));
    };
    Ok(timestamp.to_rfc3339_opts(SecondsFormat::Millis, true))
}
