use anyhow::{anyhow, Result};
use shared::Role;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use crate::domain::models::user::User;
use crate::storage::connection::DbConnection;
use crate::storage::is_unique_violation;

const USER_COLUMNS: &str =
    "id, name, email, role_id, role, password_hash, password_salt, created_at";

/// Repository for user accounts
#[derive(Clone)]
pub struct UserRepository {
    db: DbConnection,
}

impl UserRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    /// Insert a user, making it an admin instead if the table is empty.
    ///
    /// The emptiness check and the insert are one statement, so two racing
    /// first registrations cannot both become admin. Returns the role that was
    /// stored, or `None` when email or role id is already taken.
    pub async fn register_user(&self, user: &User) -> Result<Option<Role>> {
        let result = sqlx::query(
            r#"
            INSERT INTO users (id, name, email, role_id, role, password_hash, password_salt, created_at)
            SELECT ?, ?, ?, ?,
                   CASE WHEN (SELECT COUNT(*) FROM users) = 0 THEN 'admin' ELSE ? END,
                   ?, ?, ?
            "#,
        )
        .bind(&user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.role_id)
        .bind(user.role.as_str())
        .bind(&user.password_hash)
        .bind(&user.password_salt)
        .bind(&user.created_at)
        .execute(self.db.pool())
        .await;

        match result {
            Ok(_) => {}
            Err(e) if is_unique_violation(&e) => return Ok(None),
            Err(e) => return Err(e.into()),
        }

        let stored = self
            .get_user(&user.id)
            .await?
            .ok_or_else(|| anyhow!("user {} vanished after insert", user.id))?;
        Ok(Some(stored.role))
    }

    /// Insert a user with exactly the given role. Returns false on a duplicate.
    pub async fn store_user(&self, user: &User) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO users (id, name, email, role_id, role, password_hash, password_salt, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.role_id)
        .bind(user.role.as_str())
        .bind(&user.password_hash)
        .bind(&user.password_salt)
        .bind(&user.created_at)
        .execute(self.db.pool())
        .await;

        match result {
            Ok(_) => Ok(true),
            Err(e) if is_unique_violation(&e) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn get_user(&self, user_id: &str) -> Result<Option<User>> {
        let row = sqlx::query(&format!("SELECT {} FROM users WHERE id = ?", USER_COLUMNS))
            .bind(user_id)
            .fetch_optional(self.db.pool())
            .await?;
        row.as_ref().map(user_from_row).transpose()
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let row = sqlx::query(&format!("SELECT {} FROM users WHERE email = ?", USER_COLUMNS))
            .bind(email)
            .fetch_optional(self.db.pool())
            .await?;
        row.as_ref().map(user_from_row).transpose()
    }

    pub async fn find_by_role_id(&self, role_id: &str) -> Result<Option<User>> {
        let row = sqlx::query(&format!("SELECT {} FROM users WHERE role_id = ?", USER_COLUMNS))
            .bind(role_id)
            .fetch_optional(self.db.pool())
            .await?;
        row.as_ref().map(user_from_row).transpose()
    }

    /// All users ordered by name
    pub async fn list_users(&self) -> Result<Vec<User>> {
        let rows = sqlx::query(&format!("SELECT {} FROM users ORDER BY name, id", USER_COLUMNS))
            .fetch_all(self.db.pool())
            .await?;
        rows.iter().map(user_from_row).collect()
    }

    /// Number of users holding any of the given roles
    pub async fn count_by_roles(&self, roles: &[Role]) -> Result<i64> {
        let mut total = 0;
        for role in roles {
            let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE role = ?")
                .bind(role.as_str())
                .fetch_one(self.db.pool())
                .await?;
            total += count;
        }
        Ok(total)
    }
}

pub(crate) fn user_from_row(row: &SqliteRow) -> Result<User> {
    let role: String = row.try_get("role")?;
    Ok(User {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        email: row.try_get("email")?,
        role_id: row.try_get("role_id")?,
        role: Role::parse(&role).ok_or_else(|| anyhow!("unknown role in store: {}", role))?,
        password_hash: row.try_get("password_hash")?,
        password_salt: row.try_get("password_salt")?,
        created_at: row.try_get("created_at")?,
    })
}
