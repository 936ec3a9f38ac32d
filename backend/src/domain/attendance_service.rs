use chrono::Utc;
use shared::Role;
use std::collections::BTreeMap;
use tracing::info;

use crate::domain::access_gateway::{authorize, require_course_faculty, Identity};
use crate::domain::commands::attendance::{AttendanceSheet, SubmitDayCommand};
use crate::domain::error::{ServiceError, ServiceResult};
use crate::domain::models::attendance::{format_date, normalize_date, AttendanceLedger};
use crate::domain::models::course::{Course, CourseRef};
use crate::storage::repositories::{AttendanceRepository, CourseRepository, EnrollmentRepository, UserRepository};
use crate::storage::DbConnection;

/// Daily attendance per course
#[derive(Clone)]
pub struct AttendanceService {
    attendance: AttendanceRepository,
    courses: CourseRepository,
    enrollments: EnrollmentRepository,
    users: UserRepository,
}

impl AttendanceService {
    pub fn new(db: DbConnection) -> Self {
        Self {
            attendance: AttendanceRepository::new(db.clone()),
            courses: CourseRepository::new(db.clone()),
            enrollments: EnrollmentRepository::new(db.clone()),
            users: UserRepository::new(db),
        }
    }

    /// Record one day for a course. Every entry is checked before anything
    /// is written, and the write itself is a single transaction.
    pub async fn submit_day(&self, caller: &Identity, command: SubmitDayCommand) -> ServiceResult<usize> {
        let course = self.load_course(&command.course_id).await?;
        require_course_faculty(caller, &course)?;
        let date = normalize_date(&command.date)?;

        for entry in &command.entries {
            match self.users.get_user(&entry.student_id).await? {
                Some(user) if user.role == Role::Student => {}
                _ => {
                    return Err(ServiceError::not_found(format!(
                        "Student not found: {}",
                        entry.student_id
                    )))
                }
            }
        }

        info!(
            "Recording attendance for {} on {}: {} entries",
            course.course_code,
            format_date(date),
            command.entries.len()
        );

        let recorded = self
            .attendance
            .record_day(&course.id, date, &command.entries, &Utc::now().to_rfc3339())
            .await?;
        Ok(recorded)
    }

    /// The calling student's ledgers, one per course
    pub async fn get_my_attendance(&self, caller: &Identity) -> ServiceResult<Vec<(AttendanceLedger, CourseRef)>> {
        authorize(caller, Role::Student)?;
        Ok(self.attendance.ledgers_for_student(&caller.user_id).await?)
    }

    /// Roster plus every recorded status keyed by day then student
    pub async fn get_course_attendance_sheet(&self, caller: &Identity, course_id: &str) -> ServiceResult<AttendanceSheet> {
        let course = self.load_course(course_id).await?;
        require_course_faculty(caller, &course)?;

        let roster = self.enrollments.roster(course_id).await?;
        let mut records: BTreeMap<String, BTreeMap<String, _>> = BTreeMap::new();
        for ledger in self.attendance.ledgers_for_course(course_id).await? {
            for record in &ledger.records {
                records
                    .entry(format_date(record.date))
                    .or_default()
                    .insert(ledger.student_id.clone(), record.status);
            }
        }

        Ok(AttendanceSheet { roster, records })
    }

    async fn load_course(&self, course_id: &str) -> ServiceResult<Course> {
        self.courses
            .get_course(course_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Course not found"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::ValidationError;
    use crate::domain::test_support::identity;
    use crate::storage::test_utils::{insert_course, insert_user};
    use shared::{AttendanceEntry, AttendanceStatus};

    async fn create_test_service() -> AttendanceService {
        let db = DbConnection::init_test().await.expect("Failed to create test database");
        insert_user(&db, "f1", "Dr. One", Role::Faculty).await;
        insert_user(&db, "s1", "Sam", Role::Student).await;
        insert_user(&db, "s2", "Ann", Role::Student).await;
        insert_course(&db, "c1", "CSE101", Some("f1")).await;
        let enrollments = EnrollmentRepository::new(db.clone());
        enrollments.enroll("c1", "s1", "t1").await.unwrap();
        enrollments.enroll("c1", "s2", "t2").await.unwrap();
        AttendanceService::new(db)
    }

    fn day(date: &str, entries: &[(&str, AttendanceStatus)]) -> SubmitDayCommand {
        SubmitDayCommand {
            course_id: "c1".to_string(),
            date: date.to_string(),
            entries: entries
                .iter()
                .map(|(student_id, status)| AttendanceEntry {
                    student_id: student_id.to_string(),
                    status: *status,
                })
                .collect(),
        }
    }

    #[tokio::test]
    async fn test_resubmitting_a_day_keeps_one_record() {
        let service = create_test_service().await;
        let faculty = identity("f1", Role::Faculty);

        let morning = day("2024-03-04T09:00:00Z", &[("s1", AttendanceStatus::Absent)]);
        let afternoon = day("2024-03-04T15:00:00Z", &[("s1", AttendanceStatus::Present)]);
        service.submit_day(&faculty, morning).await.unwrap();
        assert_eq!(service.submit_day(&faculty, afternoon.clone()).await.unwrap(), 1);
        service.submit_day(&faculty, afternoon).await.unwrap();

        let sheet = service.get_course_attendance_sheet(&faculty, "c1").await.unwrap();
        assert_eq!(sheet.records.len(), 1);
        assert_eq!(sheet.records["2024-03-04"]["s1"], AttendanceStatus::Present);
        assert!(!sheet.records["2024-03-04"].contains_key("s2"));
        assert_eq!(sheet.roster.len(), 2);
    }

    #[tokio::test]
    async fn test_batch_with_unknown_student_writes_nothing() {
        let service = create_test_service().await;
        let faculty = identity("f1", Role::Faculty);

        let batch = day(
            "2024-03-04",
            &[("s1", AttendanceStatus::Present), ("ghost", AttendanceStatus::Present)],
        );
        assert!(matches!(service.submit_day(&faculty, batch).await, Err(ServiceError::NotFound(_))));

        let sheet = service.get_course_attendance_sheet(&faculty, "c1").await.unwrap();
        assert!(sheet.records.is_empty());
    }

    #[tokio::test]
    async fn test_submit_checks_faculty_and_date() {
        let service = create_test_service().await;
        let entries = [("s1", AttendanceStatus::Present)];

        assert!(matches!(
            service.submit_day(&identity("s1", Role::Student), day("2024-03-04", &entries)).await,
            Err(ServiceError::Unauthorized(_))
        ));
        assert!(matches!(
            service.submit_day(&identity("f1", Role::Faculty), day("03/04/2024", &entries)).await,
            Err(ServiceError::Validation(ValidationError::InvalidDate(_)))
        ));
        assert!(matches!(
            service.get_course_attendance_sheet(&identity("f9", Role::Faculty), "c1").await,
            Err(ServiceError::Unauthorized(_))
        ));
    }

    #[tokio::test]
    async fn test_student_summary() {
        let service = create_test_service().await;
        let faculty = identity("f1", Role::Faculty);
        service
            .submit_day(&faculty, day("2024-03-04", &[("s1", AttendanceStatus::Present)]))
            .await
            .unwrap();
        service
            .submit_day(&faculty, day("2024-03-05", &[("s1", AttendanceStatus::Absent)]))
            .await
            .unwrap();
        service
            .submit_day(&faculty, day("2024-03-06", &[("s1", AttendanceStatus::Present)]))
            .await
            .unwrap();

        let mine = service.get_my_attendance(&identity("s1", Role::Student)).await.unwrap();
        assert_eq!(mine.len(), 1);
        let (ledger, course) = &mine[0];
        assert_eq!(course.course_code, "CSE101");
        assert_eq!((ledger.present(), ledger.total(), ledger.percentage()), (2, 3, 67));

        assert!(service.get_my_attendance(&identity("s2", Role::Student)).await.unwrap().is_empty());
        assert!(service.get_my_attendance(&faculty).await.is_err());
    }
}
