use chrono::Utc;
use shared::Role;
use tracing::{info, warn};

use crate::domain::access_gateway::{authorize, authorize_any, Identity};
use crate::domain::commands::courses::{CreateCourseCommand, SelectCourseCommand};
use crate::domain::error::{ServiceError, ServiceResult, ValidationError};
use crate::domain::models::course::{Course, CourseDetails};
use crate::storage::repositories::CourseRepository;
use crate::storage::DbConnection;

/// Roles allowed to claim and teach a course
pub const TEACHING_ROLES: [Role; 3] = [Role::Admin, Role::Faculty, Role::Staff];

/// The course catalog
#[derive(Clone)]
pub struct CourseService {
    courses: CourseRepository,
}

impl CourseService {
    pub fn new(db: DbConnection) -> Self {
        Self {
            courses: CourseRepository::new(db),
        }
    }

    pub async fn create_course(&self, caller: &Identity, command: CreateCourseCommand) -> ServiceResult<CourseDetails> {
        authorize(caller, Role::Admin)?;

        let course_code = Course::normalize_code(&ValidationError::require(command.course_code, "courseCode")?);
        let course_name = ValidationError::require(command.course_name, "courseName")?;
        let credits = command.credits.ok_or(ValidationError::MissingField("credits"))?;
        if credits < 0 {
            return Err(ValidationError::NegativeCredits(credits).into());
        }

        info!("Creating course: code={}, credits={}", course_code, credits);

        let now = Utc::now().to_rfc3339();
        let course = Course {
            id: Course::generate_id(),
            course_code,
            course_name: course_name.trim().to_string(),
            credits,
            faculty_id: None,
            schedule: Default::default(),
            created_at: now.clone(),
            updated_at: now,
        };

        if !self.courses.store_course(&course).await? {
            return Err(ServiceError::conflict("Course code exists"));
        }

        Ok(CourseDetails {
            course,
            faculty_name: None,
            student_ids: Vec::new(),
        })
    }

    /// All courses ordered by code
    pub async fn list_courses(&self) -> ServiceResult<Vec<CourseDetails>> {
        let courses = self.courses.list_course_details().await?;
        info!("Found {} courses", courses.len());
        Ok(courses)
    }

    /// The caller takes the course and sets its schedule
    pub async fn select_course(&self, caller: &Identity, command: SelectCourseCommand) -> ServiceResult<CourseDetails> {
        authorize_any(caller, &TEACHING_ROLES)?;
        info!("User {} selecting course {}", caller.user_id, command.course_id);

        let course = self
            .courses
            .get_course(&command.course_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Course not found"))?;

        let already_taken = course.faculty_id.is_some() && !course.is_taught_by(&caller.user_id);
        let claimed = !already_taken
            && self
                .courses
                .assign_faculty(&course.id, &caller.user_id, &command.schedule, &Utc::now().to_rfc3339())
                .await?;
        if !claimed {
            warn!("Course {} already assigned to another faculty member", course.id);
            return Err(ServiceError::conflict("Course already assigned"));
        }

        self.courses
            .get_course_details(&course.id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Course not found"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::test_support::identity;
    use crate::storage::test_utils::insert_user;
    use shared::Schedule;

    async fn create_test_service() -> (CourseService, DbConnection) {
        let db = DbConnection::init_test().await.expect("Failed to create test database");
        (CourseService::new(db.clone()), db)
    }

    fn create(code: &str, credits: Option<i64>) -> CreateCourseCommand {
        CreateCourseCommand {
            course_code: Some(code.to_string()),
            course_name: Some("Data Structures".to_string()),
            credits,
        }
    }

    #[tokio::test]
    async fn test_create_course_uppercases_and_rejects_duplicates() {
        let (service, _db) = create_test_service().await;
        let admin = identity("admin", Role::Admin);

        let created = service.create_course(&admin, create(" cse201 ", Some(4))).await.unwrap();
        assert_eq!(created.course.course_code, "CSE201");

        assert!(matches!(
            service.create_course(&admin, create("CSE201", Some(3))).await,
            Err(ServiceError::Conflict(_))
        ));
        assert!(matches!(
            service.create_course(&admin, create("MAT1", None)).await,
            Err(ServiceError::Validation(ValidationError::MissingField("credits")))
        ));
        assert!(matches!(
            service.create_course(&admin, create("MAT1", Some(-1))).await,
            Err(ServiceError::Validation(ValidationError::NegativeCredits(-1)))
        ));
        assert!(matches!(
            service.create_course(&identity("f", Role::Faculty), create("MAT1", Some(3))).await,
            Err(ServiceError::Unauthorized(_))
        ));
    }

    #[tokio::test]
    async fn test_select_course_claims_once() {
        let (service, db) = create_test_service().await;
        insert_user(&db, "f1", "Dr. One", Role::Faculty).await;
        insert_user(&db, "f2", "Dr. Two", Role::Faculty).await;
        let course = service
            .create_course(&identity("admin", Role::Admin), create("PHY100", Some(3)))
            .await
            .unwrap()
            .course;

        let select = |schedule: Schedule| SelectCourseCommand {
            course_id: course.id.clone(),
            schedule,
        };
        let schedule = Schedule {
            days: vec!["Tue".to_string()],
            time: "09:00".to_string(),
        };

        let claimed = service
            .select_course(&identity("f1", Role::Faculty), select(schedule.clone()))
            .await
            .unwrap();
        assert_eq!(claimed.faculty_name.as_deref(), Some("Dr. One"));
        assert_eq!(claimed.course.schedule, schedule);

        assert!(matches!(
            service.select_course(&identity("f2", Role::Faculty), select(Schedule::default())).await,
            Err(ServiceError::Conflict(_))
        ));
        assert!(matches!(
            service.select_course(&identity("s1", Role::Student), select(Schedule::default())).await,
            Err(ServiceError::Unauthorized(_))
        ));

        let listed = service.list_courses().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].course.faculty_id.as_deref(), Some("f1"));
    }

    #[tokio::test]
    async fn test_select_missing_course_is_not_found() {
        let (service, _db) = create_test_service().await;
        let result = service
            .select_course(
                &identity("f1", Role::Faculty),
                SelectCourseCommand {
                    course_id: "nope".to_string(),
                    schedule: Schedule::default(),
                },
            )
            .await;
        assert!(matches!(result, Err(ServiceError::NotFound(_))));
    }
}
