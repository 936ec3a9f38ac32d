//! Domain-level command and result types.
//!
//! Services take and return these; the REST layer maps the public DTOs in
//! the `shared` crate to and from them.

pub mod users {
    use crate::domain::models::user::User;
    use shared::Role;

    #[derive(Debug, Clone, Default)]
    pub struct RegisterCommand {
        pub name: Option<String>,
        pub email: Option<String>,
        pub password: Option<String>,
        pub role: Option<Role>,
        pub role_id: Option<String>,
    }

    #[derive(Debug, Clone)]
    pub struct LoginCommand {
        pub email: String,
        pub password: String,
    }

    /// Admin request to add a student or staff account
    #[derive(Debug, Clone, Default)]
    pub struct CreateMemberCommand {
        pub name: Option<String>,
        pub email: Option<String>,
        pub role_id: Option<String>,
        pub password: Option<String>,
    }

    /// An authenticated account and its freshly issued token
    #[derive(Debug, Clone)]
    pub struct AuthResult {
        pub user: User,
        pub token: String,
    }

    /// A user with the memberships shown on their profile
    #[derive(Debug, Clone)]
    pub struct UserProfile {
        pub user: User,
        pub courses: Vec<String>,
        pub registered_events: Vec<String>,
    }
}

pub mod courses {
    use shared::Schedule;

    #[derive(Debug, Clone, Default)]
    pub struct CreateCourseCommand {
        pub course_code: Option<String>,
        pub course_name: Option<String>,
        pub credits: Option<i64>,
    }

    #[derive(Debug, Clone)]
    pub struct SelectCourseCommand {
        pub course_id: String,
        pub schedule: Schedule,
    }
}

pub mod events {
    /// Event fields as submitted. On create all but the coordinator are
    /// required; on update only the provided ones change.
    #[derive(Debug, Clone, Default)]
    pub struct EventFields {
        pub title: Option<String>,
        pub date: Option<String>,
        pub category: Option<String>,
        pub location: Option<String>,
        pub faculty_coordinator: Option<String>,
    }
}

pub mod grades {
    use crate::domain::models::grade::ScorePatch;

    #[derive(Debug, Clone)]
    pub struct UpsertScoresCommand {
        pub student_id: String,
        pub course_id: String,
        pub patch: ScorePatch,
    }
}

pub mod attendance {
    use crate::domain::models::user::User;
    use shared::{AttendanceEntry, AttendanceStatus};
    use std::collections::BTreeMap;

    #[derive(Debug, Clone)]
    pub struct SubmitDayCommand {
        pub course_id: String,
        /// Raw date as submitted; normalized to a calendar day by the service
        pub date: String,
        pub entries: Vec<AttendanceEntry>,
    }

    /// Enrolled students plus `day -> student id -> status`
    #[derive(Debug, Clone)]
    pub struct AttendanceSheet {
        pub roster: Vec<User>,
        pub records: BTreeMap<String, BTreeMap<String, AttendanceStatus>>,
    }
}

pub mod settings {
    #[derive(Debug, Clone, Default)]
    pub struct UpdateSettingsCommand {
        pub college_name: Option<String>,
        pub address: Option<String>,
        pub email: Option<String>,
        pub phone: Option<String>,
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct CollegeStats {
        pub students: i64,
        /// Faculty and staff together
        pub faculty: i64,
        pub courses: i64,
    }
}
