use shared::Schedule;

#[derive(Debug, Clone, PartialEq)]
pub struct Course {
    pub id: String,
    /// Always stored uppercase
    pub course_code: String,
    pub course_name: String,
    pub credits: i64,
    /// Assigned faculty member, if any
    pub faculty_id: Option<String>,
    pub schedule: Schedule,
    pub created_at: String,
    pub updated_at: String,
}

impl Course {
    pub fn generate_id() -> String {
        uuid::Uuid::new_v4().to_string()
    }

    pub fn normalize_code(code: &str) -> String {
        code.trim().to_uppercase()
    }

    pub fn is_taught_by(&self, user_id: &str) -> bool {
        self.faculty_id.as_deref() == Some(user_id)
    }
}

/// A course together with the data the listing endpoints attach to it
#[derive(Debug, Clone, PartialEq)]
pub struct CourseDetails {
    pub course: Course,
    pub faculty_name: Option<String>,
    pub student_ids: Vec<String>,
}

/// Just enough of a course to label a row in a listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseRef {
    pub id: String,
    pub course_code: String,
    pub course_name: String,
}
