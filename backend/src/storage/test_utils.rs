//! Fixtures for storage and service tests.

use shared::{Role, Schedule};

use crate::storage::connection::DbConnection;

/// Insert a bare user row with a predictable email and role id
pub async fn insert_user(db: &DbConnection, id: &str, name: &str, role: Role) {
    sqlx::query(
        "INSERT INTO users (id, name, email, role_id, role, password_hash, password_salt, created_at) \
         VALUES (?, ?, ?, ?, ?, 'hash', 'salt', '2024-01-01T00:00:00Z')",
    )
    .bind(id)
    .bind(name)
    .bind(format!("{}@college.test", id))
    .bind(format!("RID-{}", id))
    .bind(role.as_str())
    .execute(db.pool())
    .await
    .expect("Failed to insert test user");
}

/// Insert a course row, optionally already assigned to a faculty member
pub async fn insert_course(db: &DbConnection, id: &str, code: &str, faculty_id: Option<&str>) {
    sqlx::query(
        "INSERT INTO courses (id, course_code, course_name, credits, faculty_id, schedule_days, schedule_time, created_at, updated_at) \
         VALUES (?, ?, ?, 3, ?, ?, '', '2024-01-01T00:00:00Z', '2024-01-01T00:00:00Z')",
    )
    .bind(id)
    .bind(code)
    .bind(format!("{} Course", code))
    .bind(faculty_id)
    .bind(serde_json::to_string(&Schedule::default().days).expect("serializable"))
    .execute(db.pool())
    .await
    .expect("Failed to insert test course");
}

/// File-backed database inside `dir`, for tests that need several real connections
pub async fn file_db(dir: &tempfile::TempDir) -> DbConnection {
    let url = format!("sqlite:{}", dir.path().join("college.db").display());
    DbConnection::new(&url).await.expect("Failed to create file database")
}
