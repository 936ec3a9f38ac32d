use anyhow::Result;

use crate::domain::models::user::User;
use crate::storage::connection::DbConnection;
use crate::storage::repositories::user_repository::user_from_row;

/// Repository for issued bearer tokens
#[derive(Clone)]
pub struct SessionRepository {
    db: DbConnection,
}

impl SessionRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    pub async fn store_session(&self, token: &str, user_id: &str, expires_at: i64) -> Result<()> {
        sqlx::query("INSERT INTO sessions (token, user_id, expires_at) VALUES (?, ?, ?)")
            .bind(token)
            .bind(user_id)
            .bind(expires_at)
            .execute(self.db.pool())
            .await?;
        Ok(())
    }

    /// The owner of `token`, if the token exists and expires after `now`
    pub async fn find_user_by_token(&self, token: &str, now: i64) -> Result<Option<User>> {
        let row = sqlx::query(
            r#"
            SELECT u.id, u.name, u.email, u.role_id, u.role, u.password_hash, u.password_salt, u.created_at
            FROM sessions s
            JOIN users u ON u.id = s.user_id
            WHERE s.token = ? AND s.expires_at > ?
            "#,
        )
        .bind(token)
        .bind(now)
        .fetch_optional(self.db.pool())
        .await?;

        row.as_ref().map(user_from_row).transpose()
    }

    /// Drop every session that expired at or before `now`
    pub async fn delete_expired(&self, now: i64) -> Result<u64> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= ?")
            .bind(now)
            .execute(self.db.pool())
            .await?;
        Ok(result.rows_affected())
    }
}
