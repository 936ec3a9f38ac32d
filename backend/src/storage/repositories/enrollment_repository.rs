use anyhow::Result;

use crate::domain::models::user::User;
use crate::storage::connection::DbConnection;
use crate::storage::is_unique_violation;
use crate::storage::repositories::user_repository::user_from_row;

/// Repository for student/course membership
#[derive(Clone)]
pub struct EnrollmentRepository {
    db: DbConnection,
}

impl EnrollmentRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    /// Add the membership row. Returns false if it already existed.
    pub async fn enroll(&self, course_id: &str, student_id: &str, enrolled_at: &str) -> Result<bool> {
        let result = sqlx::query(
            "INSERT INTO enrollments (course_id, student_id, enrolled_at) VALUES (?, ?, ?)",
        )
        .bind(course_id)
        .bind(student_id)
        .bind(enrolled_at)
        .execute(self.db.pool())
        .await;

        match result {
            Ok(_) => Ok(true),
            Err(e) if is_unique_violation(&e) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn is_enrolled(&self, student_id: &str, course_id: &str) -> Result<bool> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM enrollments WHERE course_id = ? AND student_id = ?",
        )
        .bind(course_id)
        .bind(student_id)
        .fetch_one(self.db.pool())
        .await?;
        Ok(count > 0)
    }

    /// Students enrolled in a course, in enrollment order
    pub async fn roster(&self, course_id: &str) -> Result<Vec<User>> {
        let rows = sqlx::query(
            r#"
            SELECT u.id, u.name, u.email, u.role_id, u.role, u.password_hash, u.password_salt, u.created_at
            FROM enrollments e
            JOIN users u ON u.id = e.student_id
            WHERE e.course_id = ?
            ORDER BY e.enrolled_at, u.name
            "#,
        )
        .bind(course_id)
        .fetch_all(self.db.pool())
        .await?;

        rows.iter().map(user_from_row).collect()
    }

    /// Ids of the courses a student is enrolled in
    pub async fn courses_of(&self, student_id: &str) -> Result<Vec<String>> {
        let ids: Vec<String> = sqlx::query_scalar(
            "SELECT course_id FROM enrollments WHERE student_id = ? ORDER BY enrolled_at, course_id",
        )
        .bind(student_id)
        .fetch_all(self.db.pool())
        .await?;
        Ok(ids)
    }
}
