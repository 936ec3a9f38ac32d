//! Wire types shared between the college backend and its clients.
//!
//! Every type here is a JSON DTO. Keys are camelCase and entity identifiers
//! serialize as `_id`, which is what existing web clients expect.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Role of an account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Faculty,
    Staff,
    Student,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Faculty => "faculty",
            Role::Staff => "staff",
            Role::Student => "student",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "admin" => Some(Role::Admin),
            "faculty" => Some(Role::Faculty),
            "staff" => Some(Role::Staff),
            "student" => Some(Role::Student),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status of one attendance record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttendanceStatus {
    Present,
    Absent,
}

impl AttendanceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttendanceStatus::Present => "Present",
            AttendanceStatus::Absent => "Absent",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Present" => Some(AttendanceStatus::Present),
            "Absent" => Some(AttendanceStatus::Absent),
            _ => None,
        }
    }
}

/// Generic `{ "message": ... }` body used for errors and acknowledgements
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

// ---------------------------------------------------------------------------
// Accounts
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<Role>,
    pub role_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Returned by register and login
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    /// Bearer token for the `Authorization` header
    pub token: String,
}

/// Admin request to add a student or staff member
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMemberRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role_id: Option<String>,
    pub password: Option<String>,
}

/// A user as returned by the API; never carries password data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub role_id: String,
    /// Ids of the courses a student is enrolled in
    pub courses: Vec<String>,
    /// Ids of the events a student registered for
    pub registered_events: Vec<String>,
    pub created_at: String,
}

/// Minimal reference to a person (faculty, coordinator, roster entry)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonRef {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
}

/// Student details attached to roster and marks listings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentSummary {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub email: String,
    pub role_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsResponse {
    pub students: i64,
    /// Faculty and staff combined
    pub faculty: i64,
    pub courses: i64,
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsResponse {
    pub college_name: String,
    pub address: String,
    pub email: String,
    pub phone: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSettingsRequest {
    pub college_name: Option<String>,
    pub address: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

// ---------------------------------------------------------------------------
// Courses
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    #[serde(default)]
    pub days: Vec<String>,
    #[serde(default)]
    pub time: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub course_code: String,
    pub course_name: String,
    pub credits: i64,
    pub faculty: Option<PersonRef>,
    pub schedule: Schedule,
    /// Ids of enrolled students
    pub students: Vec<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCourseRequest {
    pub course_code: Option<String>,
    pub course_name: Option<String>,
    pub credits: Option<i64>,
}

/// Faculty request to take a course and set its schedule
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SelectCourseRequest {
    #[serde(default)]
    pub days: Vec<String>,
    #[serde(default)]
    pub time: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseSummary {
    #[serde(rename = "_id")]
    pub id: String,
    pub course_code: String,
    pub course_name: String,
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    /// RFC 3339 timestamp
    pub date: String,
    pub category: String,
    pub location: String,
    pub faculty_coordinator: Option<PersonRef>,
    pub registered_students: Vec<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Body for creating or updating an event. On update only the provided
/// fields change.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRequest {
    pub title: Option<String>,
    pub date: Option<String>,
    pub category: Option<String>,
    pub location: Option<String>,
    pub faculty_coordinator: Option<String>,
}

// ---------------------------------------------------------------------------
// Marks
// ---------------------------------------------------------------------------

/// A grade record with its derived percentages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeRecordResponse {
    pub student_id: String,
    pub course_id: String,
    pub quiz1: Option<f64>,
    pub quiz2: Option<f64>,
    pub quiz3: Option<f64>,
    pub cat1: Option<f64>,
    pub cat2: Option<f64>,
    pub fat: Option<f64>,
    pub internal_percentage: f64,
    pub cat_percentage: f64,
    pub fat_percentage: f64,
    pub total_percentage: f64,
    pub created_at: String,
    pub updated_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub student: Option<StudentSummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub course: Option<CourseSummary>,
}

/// Partial score update.
///
/// A missing key leaves the stored value untouched, `null` clears it back to
/// "not entered", and a number sets it. Unknown keys are rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateScoresRequest {
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub quiz1: Option<Option<f64>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub quiz2: Option<Option<f64>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub quiz3: Option<Option<f64>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub cat1: Option<Option<f64>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub cat2: Option<Option<f64>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub fat: Option<Option<f64>>,
}

/// Marks a key as present even when its value is `null`
fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

// ---------------------------------------------------------------------------
// Attendance
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceEntry {
    pub student_id: String,
    pub status: AttendanceStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitAttendanceRequest {
    /// Calendar day, `YYYY-MM-DD` or an RFC 3339 timestamp
    pub date: String,
    pub attendance_data: Vec<AttendanceEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmitAttendanceResponse {
    pub message: String,
    /// Number of entries written
    pub recorded: usize,
}

/// One row of a student's attendance overview
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceSummary {
    pub course: CourseSummary,
    pub percentage: u32,
    pub present: u32,
    pub total: u32,
}

/// Calendar-style sheet for a course: date -> student id -> status
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceSheetResponse {
    pub roster: Vec<PersonRef>,
    pub records: BTreeMap<String, BTreeMap<String, AttendanceStatus>>,
}
