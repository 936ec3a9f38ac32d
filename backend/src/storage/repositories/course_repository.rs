use anyhow::Result;
use shared::Schedule;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use std::collections::HashMap;

use crate::domain::models::course::{Course, CourseDetails};
use crate::storage::connection::DbConnection;
use crate::storage::is_unique_violation;

const COURSE_COLUMNS: &str = "c.id, c.course_code, c.course_name, c.credits, c.faculty_id, \
     c.schedule_days, c.schedule_time, c.created_at, c.updated_at";

/// Repository for the course catalog
#[derive(Clone)]
pub struct CourseRepository {
    db: DbConnection,
}

impl CourseRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    /// Insert a course. Returns false if the course code is taken.
    pub async fn store_course(&self, course: &Course) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO courses (id, course_code, course_name, credits, faculty_id,
                                 schedule_days, schedule_time, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&course.id)
        .bind(&course.course_code)
        .bind(&course.course_name)
        .bind(course.credits)
        .bind(&course.faculty_id)
        .bind(serde_json::to_string(&course.schedule.days)?)
        .bind(&course.schedule.time)
        .bind(&course.created_at)
        .bind(&course.updated_at)
        .execute(self.db.pool())
        .await;

        match result {
            Ok(_) => Ok(true),
            Err(e) if is_unique_violation(&e) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn get_course(&self, course_id: &str) -> Result<Option<Course>> {
        let row = sqlx::query(&format!("SELECT {} FROM courses c WHERE c.id = ?", COURSE_COLUMNS))
            .bind(course_id)
            .fetch_optional(self.db.pool())
            .await?;
        row.as_ref().map(course_from_row).transpose()
    }

    pub async fn find_by_code(&self, course_code: &str) -> Result<Option<Course>> {
        let row = sqlx::query(&format!("SELECT {} FROM courses c WHERE c.course_code = ?", COURSE_COLUMNS))
            .bind(course_code)
            .fetch_optional(self.db.pool())
            .await?;
        row.as_ref().map(course_from_row).transpose()
    }

    /// A course with its faculty name and enrolled student ids
    pub async fn get_course_details(&self, course_id: &str) -> Result<Option<CourseDetails>> {
        let row = sqlx::query(&format!(
            "SELECT {}, u.name AS faculty_name FROM courses c \
             LEFT JOIN users u ON u.id = c.faculty_id WHERE c.id = ?",
            COURSE_COLUMNS
        ))
        .bind(course_id)
        .fetch_optional(self.db.pool())
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let student_ids: Vec<String> = sqlx::query_scalar(
            "SELECT student_id FROM enrollments WHERE course_id = ? ORDER BY enrolled_at, student_id",
        )
        .bind(course_id)
        .fetch_all(self.db.pool())
        .await?;

        Ok(Some(CourseDetails {
            course: course_from_row(&row)?,
            faculty_name: row.try_get("faculty_name")?,
            student_ids,
        }))
    }

    /// Every course ordered by code, with faculty names and enrolled students
    pub async fn list_course_details(&self) -> Result<Vec<CourseDetails>> {
        let rows = sqlx::query(&format!(
            "SELECT {}, u.name AS faculty_name FROM courses c \
             LEFT JOIN users u ON u.id = c.faculty_id ORDER BY c.course_code",
            COURSE_COLUMNS
        ))
        .fetch_all(self.db.pool())
        .await?;

        let enrollment_rows = sqlx::query(
            "SELECT course_id, student_id FROM enrollments ORDER BY enrolled_at, student_id",
        )
        .fetch_all(self.db.pool())
        .await?;

        let mut students_by_course: HashMap<String, Vec<String>> = HashMap::new();
        for row in &enrollment_rows {
            students_by_course
                .entry(row.try_get("course_id")?)
                .or_default()
                .push(row.try_get("student_id")?);
        }

        rows.iter()
            .map(|row| -> Result<CourseDetails> {
                let course = course_from_row(row)?;
                let student_ids = students_by_course.remove(&course.id).unwrap_or_default();
                Ok(CourseDetails {
                    course,
                    faculty_name: row.try_get("faculty_name")?,
                    student_ids,
                })
            })
            .collect()
    }

    /// Give the course to `faculty_id` and set its schedule, unless another
    /// faculty member already holds it. Returns whether the claim succeeded.
    pub async fn assign_faculty(
        &self,
        course_id: &str,
        faculty_id: &str,
        schedule: &Schedule,
        updated_at: &str,
    ) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE courses
            SET faculty_id = ?, schedule_days = ?, schedule_time = ?, updated_at = ?
            WHERE id = ? AND (faculty_id IS NULL OR faculty_id = ?)
            "#,
        )
        .bind(faculty_id)
        .bind(serde_json::to_string(&schedule.days)?)
        .bind(&schedule.time)
        .bind(updated_at)
        .bind(course_id)
        .bind(faculty_id)
        .execute(self.db.pool())
        .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn count_courses(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM courses")
            .fetch_one(self.db.pool())
            .await?;
        Ok(count)
    }
}

pub(crate) fn course_from_row(row: &SqliteRow) -> Result<Course> {
    let days: String = row.try_get("schedule_days")?;
    Ok(Course {
        id: row.try_get("id")?,
        course_code: row.try_get("course_code")?,
        course_name: row.try_get("course_name")?,
        credits: row.try_get("credits")?,
        faculty_id: row.try_get("faculty_id")?,
        schedule: Schedule {
            days: serde_json::from_str(&days)?,
            time: row.try_get("schedule_time")?,
        },
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}
