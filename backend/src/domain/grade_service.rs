//! Grade ledger operations: score entry by the course's faculty and the
//! read paths for faculty, admins and students.

use chrono::Utc;
use shared::Role;
use tracing::info;

use crate::domain::access_gateway::{authorize, require_course_faculty, Identity};
use crate::domain::commands::grades::UpsertScoresCommand;
use crate::domain::error::{ServiceError, ServiceResult};
use crate::domain::models::course::{Course, CourseRef};
use crate::domain::models::grade::GradeRecord;
use crate::domain::models::user::User;
use crate::storage::repositories::{CourseRepository, GradeRepository, UserRepository};
use crate::storage::DbConnection;

#[derive(Clone)]
pub struct GradeService {
    grades: GradeRepository,
    courses: CourseRepository,
    users: UserRepository,
}

impl GradeService {
    pub fn new(db: DbConnection) -> Self {
        Self {
            grades: GradeRepository::new(db.clone()),
            courses: CourseRepository::new(db.clone()),
            users: UserRepository::new(db),
        }
    }

    /// Create or partially update a student's scores in a course
    pub async fn upsert_scores(&self, caller: &Identity, command: UpsertScoresCommand) -> ServiceResult<GradeRecord> {
        let course = self.load_course(&command.course_id).await?;
        require_course_faculty(caller, &course)?;
        command.patch.validate()?;
        self.load_student(&command.student_id).await?;

        info!(
            "Faculty {} updating scores of {} in {}",
            caller.user_id, command.student_id, course.course_code
        );

        let record = self
            .grades
            .merge_scores(&command.student_id, &command.course_id, &command.patch, &Utc::now().to_rfc3339())
            .await?;
        Ok(record)
    }

    /// One record; readable by the course faculty, admins and the student
    pub async fn get_scores(&self, caller: &Identity, student_id: &str, course_id: &str) -> ServiceResult<GradeRecord> {
        let course = self.load_course(course_id).await?;
        let allowed = caller.is(Role::Admin) || caller.user_id == student_id || course.is_taught_by(&caller.user_id);
        if !allowed {
            return Err(ServiceError::unauthorized("Not authorized"));
        }

        self.grades
            .get_record(student_id, course_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Marks not found"))
    }

    /// Every record in a course with its student, for the course's faculty
    pub async fn list_for_course(&self, caller: &Identity, course_id: &str) -> ServiceResult<Vec<(GradeRecord, User)>> {
        let course = self.load_course(course_id).await?;
        require_course_faculty(caller, &course)?;

        let records = self.grades.list_for_course(course_id).await?;
        info!("Found {} grade records for {}", records.len(), course.course_code);
        Ok(records)
    }

    /// The calling student's records with their courses
    pub async fn list_for_student(&self, caller: &Identity) -> ServiceResult<Vec<(GradeRecord, CourseRef)>> {
        authorize(caller, Role::Student)?;
        Ok(self.grades.list_for_student(&caller.user_id).await?)
    }

    async fn load_course(&self, course_id: &str) -> ServiceResult<Course> {
        self.courses
            .get_course(course_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Course not found"))
    }

    async fn load_student(&self, student_id: &str) -> ServiceResult<User> {
        match self.users.get_user(student_id).await? {
            Some(user) if user.role == Role::Student => Ok(user),
            _ => Err(ServiceError::not_found("Student not found")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::ValidationError;
    use crate::domain::models::grade::ScorePatch;
    use crate::domain::test_support::identity;
    use crate::storage::test_utils::{insert_course, insert_user};

    async fn create_test_service() -> GradeService {
        let db = DbConnection::init_test().await.expect("Failed to create test database");
        insert_user(&db, "f1", "Dr. One", Role::Faculty).await;
        insert_user(&db, "f2", "Dr. Two", Role::Faculty).await;
        insert_user(&db, "s1", "Sam", Role::Student).await;
        insert_user(&db, "s2", "Ann", Role::Student).await;
        insert_course(&db, "c1", "CSE101", Some("f1")).await;
        insert_course(&db, "c2", "MAT101", None).await;
        GradeService::new(db)
    }

    fn upsert(student_id: &str, course_id: &str, patch: ScorePatch) -> UpsertScoresCommand {
        UpsertScoresCommand {
            student_id: student_id.to_string(),
            course_id: course_id.to_string(),
            patch,
        }
    }

    #[tokio::test]
    async fn test_partial_updates_merge_into_the_example_total() {
        let service = create_test_service().await;
        let faculty = identity("f1", Role::Faculty);

        let quizzes = ScorePatch {
            quiz1: Some(Some(8.0)),
            quiz2: Some(Some(6.0)),
            ..ScorePatch::default()
        };
        service.upsert_scores(&faculty, upsert("s1", "c1", quizzes)).await.unwrap();

        let exams = ScorePatch {
            cat1: Some(Some(40.0)),
            fat: Some(Some(70.0)),
            ..ScorePatch::default()
        };
        let record = service.upsert_scores(&faculty, upsert("s1", "c1", exams)).await.unwrap();

        assert_eq!(record.quiz1, Some(8.0));
        assert_eq!(record.quiz3, None);
        assert_eq!(record.total_percentage(), 73.0);
    }

    #[tokio::test]
    async fn test_only_assigned_faculty_writes() {
        let service = create_test_service().await;
        let patch = ScorePatch {
            quiz1: Some(Some(5.0)),
            ..ScorePatch::default()
        };

        for caller in [
            identity("f2", Role::Faculty),
            identity("admin", Role::Admin),
            identity("s1", Role::Student),
        ] {
            assert!(matches!(
                service.upsert_scores(&caller, upsert("s1", "c1", patch.clone())).await,
                Err(ServiceError::Unauthorized(_))
            ));
        }
        // Nobody teaches c2, so nobody may grade it
        assert!(matches!(
            service.upsert_scores(&identity("f1", Role::Faculty), upsert("s1", "c2", patch)).await,
            Err(ServiceError::Unauthorized(_))
        ));
        assert!(matches!(
            service.get_scores(&identity("f1", Role::Faculty), "s1", "c1").await,
            Err(ServiceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_out_of_range_score_writes_nothing() {
        let service = create_test_service().await;
        let faculty = identity("f1", Role::Faculty);
        let patch = ScorePatch {
            quiz1: Some(Some(4.0)),
            cat2: Some(Some(51.0)),
            ..ScorePatch::default()
        };

        let result = service.upsert_scores(&faculty, upsert("s1", "c1", patch)).await;
        assert!(matches!(
            result,
            Err(ServiceError::Validation(ValidationError::ScoreOutOfRange { field: "cat2", .. }))
        ));
        assert!(matches!(
            service.get_scores(&faculty, "s1", "c1").await,
            Err(ServiceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_unknown_student_or_course_is_not_found() {
        let service = create_test_service().await;
        let faculty = identity("f1", Role::Faculty);

        assert!(matches!(
            service.upsert_scores(&faculty, upsert("ghost", "c1", ScorePatch::default())).await,
            Err(ServiceError::NotFound(_))
        ));
        assert!(matches!(
            service.upsert_scores(&faculty, upsert("f2", "c1", ScorePatch::default())).await,
            Err(ServiceError::NotFound(_))
        ));
        assert!(matches!(
            service.upsert_scores(&faculty, upsert("s1", "c9", ScorePatch::default())).await,
            Err(ServiceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_read_permissions() {
        let service = create_test_service().await;
        let faculty = identity("f1", Role::Faculty);
        let patch = ScorePatch {
            fat: Some(Some(50.0)),
            ..ScorePatch::default()
        };
        service.upsert_scores(&faculty, upsert("s1", "c1", patch.clone())).await.unwrap();
        service.upsert_scores(&faculty, upsert("s2", "c1", patch)).await.unwrap();

        assert!(service.get_scores(&faculty, "s1", "c1").await.is_ok());
        assert!(service.get_scores(&identity("admin", Role::Admin), "s1", "c1").await.is_ok());
        assert!(service.get_scores(&identity("s1", Role::Student), "s1", "c1").await.is_ok());
        assert!(matches!(
            service.get_scores(&identity("s2", Role::Student), "s1", "c1").await,
            Err(ServiceError::Unauthorized(_))
        ));

        let roster: Vec<String> = service
            .list_for_course(&faculty, "c1")
            .await
            .unwrap()
            .into_iter()
            .map(|(_, student)| student.name)
            .collect();
        assert_eq!(roster, vec!["Ann", "Sam"]);
        assert!(service.list_for_course(&identity("f2", Role::Faculty), "c1").await.is_err());

        let mine = service.list_for_student(&identity("s1", Role::Student)).await.unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].1.course_code, "CSE101");
        assert_eq!(mine[0].0.fat_percentage(), 20.0);
        assert!(service.list_for_student(&faculty).await.is_err());
    }
}
