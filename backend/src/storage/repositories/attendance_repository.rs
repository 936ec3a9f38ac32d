use anyhow::{anyhow, Result};
use chrono::NaiveDate;
use shared::{AttendanceEntry, AttendanceStatus};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use crate::domain::models::attendance::{format_date, AttendanceLedger, AttendanceRecord, DATE_FORMAT};
use crate::domain::models::course::CourseRef;
use crate::storage::connection::DbConnection;

/// Repository for attendance ledgers and their dated records
#[derive(Clone)]
pub struct AttendanceRepository {
    db: DbConnection,
}

impl AttendanceRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    /// Record one day of attendance for a course.
    ///
    /// Missing ledgers are created and an existing record for the same day is
    /// overwritten. The whole batch commits or nothing does. Returns the
    /// number of entries written.
    pub async fn record_day(
        &self,
        course_id: &str,
        date: NaiveDate,
        entries: &[AttendanceEntry],
        now: &str,
    ) -> Result<usize> {
        let day = format_date(date);
        let mut tx = self.db.pool().begin().await?;

        for entry in entries {
            sqlx::query(
                r#"
                INSERT INTO attendance_ledgers (student_id, course_id, created_at, updated_at)
                VALUES (?, ?, ?, ?)
                ON CONFLICT(student_id, course_id) DO UPDATE SET updated_at = excluded.updated_at
                "#,
            )
            .bind(&entry.student_id)
            .bind(course_id)
            .bind(now)
            .bind(now)
            .execute(&mut *tx)
            .await?;

            sqlx::query(
                r#"
                INSERT INTO attendance_records (student_id, course_id, date, status)
                VALUES (?, ?, ?, ?)
                ON CONFLICT(student_id, course_id, date) DO UPDATE SET status = excluded.status
                "#,
            )
            .bind(&entry.student_id)
            .bind(course_id)
            .bind(&day)
            .bind(entry.status.as_str())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(entries.len())
    }

    /// A student's ledgers with their courses, ordered by course code
    pub async fn ledgers_for_student(&self, student_id: &str) -> Result<Vec<(AttendanceLedger, CourseRef)>> {
        let rows = sqlx::query(
            r#"
            SELECT l.student_id, l.course_id, c.course_code, c.course_name, r.date, r.status
            FROM attendance_ledgers l
            JOIN courses c ON c.id = l.course_id
            LEFT JOIN attendance_records r
                ON r.student_id = l.student_id AND r.course_id = l.course_id
            WHERE l.student_id = ?
            ORDER BY c.course_code, l.course_id, r.date
            "#,
        )
        .bind(student_id)
        .fetch_all(self.db.pool())
        .await?;

        let mut ledgers: Vec<(AttendanceLedger, CourseRef)> = Vec::new();
        for row in &rows {
            let course_id: String = row.try_get("course_id")?;
            let starts_new = ledgers.last().map_or(true, |(ledger, _)| ledger.course_id != course_id);
            if starts_new {
                let course = CourseRef {
                    id: course_id.clone(),
                    course_code: row.try_get("course_code")?,
                    course_name: row.try_get("course_name")?,
                };
                ledgers.push((empty_ledger(row.try_get("student_id")?, course_id), course));
            }
            if let (Some(record), Some((ledger, _))) = (record_from_row(row)?, ledgers.last_mut()) {
                ledger.records.push(record);
            }
        }
        Ok(ledgers)
    }

    /// Every ledger of a course, grouped by student
    pub async fn ledgers_for_course(&self, course_id: &str) -> Result<Vec<AttendanceLedger>> {
        let rows = sqlx::query(
            r#"
            SELECT l.student_id, l.course_id, r.date, r.status
            FROM attendance_ledgers l
            LEFT JOIN attendance_records r
                ON r.student_id = l.student_id AND r.course_id = l.course_id
            WHERE l.course_id = ?
            ORDER BY l.student_id, r.date
            "#,
        )
        .bind(course_id)
        .fetch_all(self.db.pool())
        .await?;

        let mut ledgers: Vec<AttendanceLedger> = Vec::new();
        for row in &rows {
            let student_id: String = row.try_get("student_id")?;
            if ledgers.last().map_or(true, |ledger| ledger.student_id != student_id) {
                ledgers.push(empty_ledger(student_id, course_id.to_string()));
            }
            if let (Some(record), Some(ledger)) = (record_from_row(row)?, ledgers.last_mut()) {
                ledger.records.push(record);
            }
        }
        Ok(ledgers)
    }
}

fn empty_ledger(student_id: String, course_id: String) -> AttendanceLedger {
    AttendanceLedger {
        student_id,
        course_id,
        records: Vec::new(),
    }
}

/// The record half of a ledger LEFT JOIN; `None` for a ledger with no records
fn record_from_row(row: &SqliteRow) -> Result<Option<AttendanceRecord>> {
    let date: Option<String> = row.try_get("date")?;
    let status: Option<String> = row.try_get("status")?;
    match (date, status) {
        (Some(date), Some(status)) => Ok(Some(AttendanceRecord {
            date: NaiveDate::parse_from_str(&date, DATE_FORMAT)?,
            status: AttendanceStatus::parse(&status)
                .ok_or_else(|| anyhow!("unknown attendance status in store: {}", status))?,
        })),
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::test_utils::{insert_course, insert_user};
    use shared::Role;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    fn entry(student_id: &str, status: AttendanceStatus) -> AttendanceEntry {
        AttendanceEntry {
            student_id: student_id.to_string(),
            status,
        }
    }

    async fn setup_test() -> AttendanceRepository {
        let db = DbConnection::init_test().await.expect("Failed to create test database");
        insert_user(&db, "s1", "Sam", Role::Student).await;
        insert_user(&db, "s2", "Ann", Role::Student).await;
        insert_course(&db, "c1", "CSE101", None).await;
        insert_course(&db, "c2", "BIO100", None).await;
        AttendanceRepository::new(db)
    }

    #[tokio::test]
    async fn test_same_day_is_overwritten_not_duplicated() {
        let repo = setup_test().await;

        repo.record_day("c1", day(4), &[entry("s1", AttendanceStatus::Absent)], "t1")
            .await
            .unwrap();
        repo.record_day("c1", day(4), &[entry("s1", AttendanceStatus::Present)], "t2")
            .await
            .unwrap();
        repo.record_day("c1", day(5), &[entry("s1", AttendanceStatus::Absent)], "t3")
            .await
            .unwrap();

        let ledgers = repo.ledgers_for_course("c1").await.unwrap();
        assert_eq!(ledgers.len(), 1);
        assert_eq!(ledgers[0].total(), 2);
        assert_eq!(ledgers[0].records[0].date, day(4));
        assert_eq!(ledgers[0].records[0].status, AttendanceStatus::Present);
        assert_eq!(ledgers[0].percentage(), 50);
    }

    #[tokio::test]
    async fn test_failed_batch_writes_nothing() {
        let repo = setup_test().await;

        let batch = [
            entry("s1", AttendanceStatus::Present),
            entry("ghost", AttendanceStatus::Present),
        ];
        assert!(repo.record_day("c1", day(4), &batch, "t1").await.is_err());

        assert!(repo.ledgers_for_course("c1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_student_view_groups_by_course() {
        let repo = setup_test().await;
        let both = [
            entry("s1", AttendanceStatus::Present),
            entry("s2", AttendanceStatus::Absent),
        ];
        repo.record_day("c1", day(4), &both, "t1").await.unwrap();
        repo.record_day("c2", day(4), &both, "t1").await.unwrap();
        repo.record_day("c2", day(6), &[entry("s1", AttendanceStatus::Absent)], "t1")
            .await
            .unwrap();

        let mine = repo.ledgers_for_student("s1").await.unwrap();
        let codes: Vec<&str> = mine.iter().map(|(_, c)| c.course_code.as_str()).collect();
        assert_eq!(codes, vec!["BIO100", "CSE101"]);
        assert_eq!(mine[0].0.total(), 2);
        assert_eq!(mine[0].0.present(), 1);
        assert_eq!(mine[1].0.percentage(), 100);

        assert_eq!(repo.ledgers_for_course("c1").await.unwrap().len(), 2);
    }
}
