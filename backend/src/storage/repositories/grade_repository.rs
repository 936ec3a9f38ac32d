use anyhow::{anyhow, Result};
use shared::Role;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use crate::domain::models::course::CourseRef;
use crate::domain::models::grade::{GradeRecord, ScorePatch};
use crate::domain::models::user::User;
use crate::storage::connection::DbConnection;

const GRADE_COLUMNS: &str =
    "g.student_id, g.course_id, g.quiz1, g.quiz2, g.quiz3, g.cat1, g.cat2, g.fat, g.created_at, g.updated_at";

/// Repository for per-(student, course) grade records
#[derive(Clone)]
pub struct GradeRepository {
    db: DbConnection,
}

impl GradeRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    pub async fn get_record(&self, student_id: &str, course_id: &str) -> Result<Option<GradeRecord>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM grade_records g WHERE g.student_id = ? AND g.course_id = ?",
            GRADE_COLUMNS
        ))
        .bind(student_id)
        .bind(course_id)
        .fetch_optional(self.db.pool())
        .await?;
        row.as_ref().map(grade_from_row).transpose()
    }

    /// Apply `patch` to the record, creating an empty one first if needed.
    ///
    /// The transaction opens with a write so it holds the write lock before
    /// reading. Concurrent patches then queue on the busy timeout instead of
    /// failing, and each one merges into the latest stored values.
    pub async fn merge_scores(
        &self,
        student_id: &str,
        course_id: &str,
        patch: &ScorePatch,
        now: &str,
    ) -> Result<GradeRecord> {
        let mut tx = self.db.pool().begin().await?;

        sqlx::query(
            r#"
            INSERT INTO grade_records (student_id, course_id, created_at, updated_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(student_id, course_id) DO NOTHING
            "#,
        )
        .bind(student_id)
        .bind(course_id)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        let row = sqlx::query(&format!(
            "SELECT {} FROM grade_records g WHERE g.student_id = ? AND g.course_id = ?",
            GRADE_COLUMNS
        ))
        .bind(student_id)
        .bind(course_id)
        .fetch_one(&mut *tx)
        .await?;

        let mut record = grade_from_row(&row)?;
        patch.apply(&mut record);
        record.updated_at = now.to_string();

        sqlx::query(
            r#"
            UPDATE grade_records
            SET quiz1 = ?, quiz2 = ?, quiz3 = ?, cat1 = ?, cat2 = ?, fat = ?, updated_at = ?
            WHERE student_id = ? AND course_id = ?
            "#,
        )
        .bind(record.quiz1)
        .bind(record.quiz2)
        .bind(record.quiz3)
        .bind(record.cat1)
        .bind(record.cat2)
        .bind(record.fat)
        .bind(&record.updated_at)
        .bind(student_id)
        .bind(course_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(record)
    }

    /// Every record of a course with its student, ordered by student name
    pub async fn list_for_course(&self, course_id: &str) -> Result<Vec<(GradeRecord, User)>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {}, u.id, u.name, u.email, u.role_id, u.role, u.password_hash, u.password_salt,
                   u.created_at AS user_created_at
            FROM grade_records g
            JOIN users u ON u.id = g.student_id
            WHERE g.course_id = ?
            ORDER BY u.name, u.id
            "#,
            GRADE_COLUMNS
        ))
        .bind(course_id)
        .fetch_all(self.db.pool())
        .await?;

        rows.iter()
            .map(|row| -> Result<(GradeRecord, User)> { Ok((grade_from_row(row)?, student_from_row(row)?)) })
            .collect()
    }

    /// Every record of a student with its course, ordered by course code
    pub async fn list_for_student(&self, student_id: &str) -> Result<Vec<(GradeRecord, CourseRef)>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {}, c.id AS course_ref_id, c.course_code, c.course_name
            FROM grade_records g
            JOIN courses c ON c.id = g.course_id
            WHERE g.student_id = ?
            ORDER BY c.course_code
            "#,
            GRADE_COLUMNS
        ))
        .bind(student_id)
        .fetch_all(self.db.pool())
        .await?;

        rows.iter()
            .map(|row| -> Result<(GradeRecord, CourseRef)> {
                let course = CourseRef {
                    id: row.try_get("course_ref_id")?,
                    course_code: row.try_get("course_code")?,
                    course_name: row.try_get("course_name")?,
                };
                Ok((grade_from_row(row)?, course))
            })
            .collect()
    }
}

fn grade_from_row(row: &SqliteRow) -> Result<GradeRecord> {
    Ok(GradeRecord {
        student_id: row.try_get("student_id")?,
        course_id: row.try_get("course_id")?,
        quiz1: row.try_get("quiz1")?,
        quiz2: row.try_get("quiz2")?,
        quiz3: row.try_get("quiz3")?,
        cat1: row.try_get("cat1")?,
        cat2: row.try_get("cat2")?,
        fat: row.try_get("fat")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

/// The student half of a grade/user join. `created_at` is aliased there
/// since both tables have one.
fn student_from_row(row: &SqliteRow) -> Result<User> {
    let role: String = row.try_get("role")?;
    Ok(User {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        email: row.try_get("email")?,
        role_id: row.try_get("role_id")?,
        role: Role::parse(&role).ok_or_else(|| anyhow!("unknown role in store: {}", role))?,
        password_hash: row.try_get("password_hash")?,
        password_salt: row.try_get("password_salt")?,
        created_at: row.try_get("user_created_at")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::test_utils::{file_db, insert_course, insert_user};

    async fn setup_test() -> GradeRepository {
        let db = DbConnection::init_test().await.expect("Failed to create test database");
        insert_user(&db, "s1", "Sam", Role::Student).await;
        insert_user(&db, "s2", "Ann", Role::Student).await;
        insert_course(&db, "c1", "CSE101", None).await;
        insert_course(&db, "c2", "BIO100", None).await;
        GradeRepository::new(db)
    }

    #[tokio::test]
    async fn test_merge_creates_then_preserves_untouched_fields() {
        let repo = setup_test().await;

        let first = ScorePatch {
            quiz1: Some(Some(8.0)),
            ..ScorePatch::default()
        };
        let created = repo.merge_scores("s1", "c1", &first, "t1").await.unwrap();
        assert_eq!(created.quiz1, Some(8.0));
        assert_eq!(created.created_at, "t1");

        let second = ScorePatch {
            cat1: Some(Some(40.0)),
            quiz1: None,
            ..ScorePatch::default()
        };
        let merged = repo.merge_scores("s1", "c1", &second, "t2").await.unwrap();
        assert_eq!(merged.quiz1, Some(8.0));
        assert_eq!(merged.cat1, Some(40.0));
        assert_eq!(merged.created_at, "t1");
        assert_eq!(merged.updated_at, "t2");

        assert_eq!(repo.get_record("s1", "c1").await.unwrap(), Some(merged));
    }

    #[tokio::test]
    async fn test_null_clears_a_score() {
        let repo = setup_test().await;
        let set = ScorePatch {
            fat: Some(Some(70.0)),
            ..ScorePatch::default()
        };
        repo.merge_scores("s1", "c1", &set, "t1").await.unwrap();

        let clear = ScorePatch {
            fat: Some(None),
            ..ScorePatch::default()
        };
        let record = repo.merge_scores("s1", "c1", &clear, "t2").await.unwrap();
        assert_eq!(record.fat, None);
    }

    #[tokio::test]
    async fn test_listings_join_students_and_courses() {
        let repo = setup_test().await;
        let patch = ScorePatch {
            quiz2: Some(Some(5.0)),
            ..ScorePatch::default()
        };
        repo.merge_scores("s1", "c1", &patch, "t1").await.unwrap();
        repo.merge_scores("s2", "c1", &patch, "t1").await.unwrap();
        repo.merge_scores("s1", "c2", &patch, "t1").await.unwrap();

        let by_course = repo.list_for_course("c1").await.unwrap();
        let names: Vec<&str> = by_course.iter().map(|(_, u)| u.name.as_str()).collect();
        assert_eq!(names, vec!["Ann", "Sam"]);
        assert_eq!(by_course[0].1.created_at, "2024-01-01T00:00:00Z");
        assert_eq!(by_course[0].0.created_at, "t1");

        let by_student = repo.list_for_student("s1").await.unwrap();
        let codes: Vec<&str> = by_student.iter().map(|(_, c)| c.course_code.as_str()).collect();
        assert_eq!(codes, vec!["BIO100", "CSE101"]);
    }

    fn single_score(field: usize, value: f64) -> ScorePatch {
        let mut patch = ScorePatch::default();
        match field {
            0 => patch.quiz1 = Some(Some(value)),
            1 => patch.quiz2 = Some(Some(value)),
            2 => patch.quiz3 = Some(Some(value)),
            3 => patch.cat1 = Some(Some(value)),
            4 => patch.cat2 = Some(Some(value)),
            _ => patch.fat = Some(Some(value)),
        }
        patch
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_merges_all_succeed() {
        let dir = tempfile::tempdir().unwrap();
        let db = file_db(&dir).await;
        insert_course(&db, "c1", "CSE101", None).await;
        for i in 0..20 {
            insert_user(&db, &format!("s{}", i), &format!("Student {}", i), Role::Student).await;
        }
        let repo = GradeRepository::new(db);

        let mut handles = Vec::new();
        // 24 patches to one shared record, one field each
        for i in 0..24 {
            let repo = repo.clone();
            handles.push(tokio::spawn(async move {
                repo.merge_scores("s0", "c1", &single_score(i % 6, 5.0), "t").await
            }));
        }
        // and one record per remaining student
        for i in 1..20 {
            let repo = repo.clone();
            handles.push(tokio::spawn(async move {
                repo.merge_scores(&format!("s{}", i), "c1", &single_score(5, 50.0), "t").await
            }));
        }

        let mut errors = Vec::new();
        for handle in handles {
            if let Err(e) = handle.await.unwrap() {
                errors.push(e.to_string());
            }
        }
        assert!(errors.is_empty(), "merges failed: {:?}", errors);

        let shared = repo.get_record("s0", "c1").await.unwrap().unwrap();
        assert_eq!(
            [shared.quiz1, shared.quiz2, shared.quiz3, shared.cat1, shared.cat2, shared.fat],
            [Some(5.0); 6]
        );
        assert_eq!(repo.list_for_course("c1").await.unwrap().len(), 20);
    }
}
