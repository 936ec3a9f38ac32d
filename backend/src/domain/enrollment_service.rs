use chrono::Utc;
use shared::Role;
use tracing::info;

use crate::domain::access_gateway::{authorize_any, Identity};
use crate::domain::course_service::TEACHING_ROLES;
use crate::domain::error::{ServiceError, ServiceResult};
use crate::domain::models::user::User;
use crate::storage::repositories::{CourseRepository, EnrollmentRepository, UserRepository};
use crate::storage::DbConnection;

/// Student/course membership
#[derive(Clone)]
pub struct EnrollmentService {
    enrollments: EnrollmentRepository,
    courses: CourseRepository,
    users: UserRepository,
}

impl EnrollmentService {
    pub fn new(db: DbConnection) -> Self {
        Self {
            enrollments: EnrollmentRepository::new(db.clone()),
            courses: CourseRepository::new(db.clone()),
            users: UserRepository::new(db),
        }
    }

    pub async fn is_enrolled(&self, student_id: &str, course_id: &str) -> ServiceResult<bool> {
        Ok(self.enrollments.is_enrolled(student_id, course_id).await?)
    }

    /// The calling student joins the course
    pub async fn enroll(&self, caller: &Identity, course_id: &str) -> ServiceResult<()> {
        if !caller.is(Role::Student) {
            return Err(ServiceError::unauthorized("Only students can register."));
        }
        info!("Enrolling student {} in course {}", caller.user_id, course_id);

        let course = self.courses.get_course(course_id).await?;
        let student = self.users.get_user(&caller.user_id).await?;
        if course.is_none() || student.is_none() {
            return Err(ServiceError::not_found("Course or student not found."));
        }

        if !self
            .enrollments
            .enroll(course_id, &caller.user_id, &Utc::now().to_rfc3339())
            .await?
        {
            return Err(ServiceError::conflict("Already registered."));
        }
        Ok(())
    }

    /// Enrolled students of a course; not visible to students
    pub async fn roster(&self, caller: &Identity, course_id: &str) -> ServiceResult<Vec<User>> {
        authorize_any(caller, &TEACHING_ROLES)?;

        if self.courses.get_course(course_id).await?.is_none() {
            return Err(ServiceError::not_found("Course not found."));
        }
        Ok(self.enrollments.roster(course_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::test_support::identity;
    use crate::storage::test_utils::{insert_course, insert_user};

    async fn create_test_service() -> EnrollmentService {
        let db = DbConnection::init_test().await.expect("Failed to create test database");
        insert_user(&db, "s1", "Sam", Role::Student).await;
        insert_user(&db, "f1", "Dr. One", Role::Faculty).await;
        insert_course(&db, "c1", "CSE101", Some("f1")).await;
        EnrollmentService::new(db)
    }

    #[tokio::test]
    async fn test_enroll_once() {
        let service = create_test_service().await;
        let sam = identity("s1", Role::Student);

        service.enroll(&sam, "c1").await.unwrap();
        assert!(service.is_enrolled("s1", "c1").await.unwrap());

        assert!(matches!(service.enroll(&sam, "c1").await, Err(ServiceError::Conflict(_))));
        assert!(matches!(service.enroll(&sam, "c9").await, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_only_students_enroll_and_only_staff_see_rosters() {
        let service = create_test_service().await;
        let faculty = identity("f1", Role::Faculty);

        assert!(matches!(service.enroll(&faculty, "c1").await, Err(ServiceError::Unauthorized(_))));

        service.enroll(&identity("s1", Role::Student), "c1").await.unwrap();
        let roster = service.roster(&faculty, "c1").await.unwrap();
        assert_eq!(roster.len(), 1);
        assert_eq!(roster[0].role_id, "RID-s1");

        assert!(matches!(
            service.roster(&identity("s1", Role::Student), "c1").await,
            Err(ServiceError::Unauthorized(_))
        ));
        assert!(matches!(service.roster(&faculty, "c9").await, Err(ServiceError::NotFound(_))));
    }
}
