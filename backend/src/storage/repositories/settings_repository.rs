use anyhow::Result;
use sqlx::Row;

use crate::domain::models::settings::CollegeSettings;
use crate::storage::connection::DbConnection;

const SINGLETON_KEY: &str = "singleton";

/// Repository for the single settings row
#[derive(Clone)]
pub struct SettingsRepository {
    db: DbConnection,
}

impl SettingsRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    pub async fn get_settings(&self) -> Result<Option<CollegeSettings>> {
        let row = sqlx::query(
            "SELECT college_name, address, email, phone FROM settings WHERE singleton = ?",
        )
        .bind(SINGLETON_KEY)
        .fetch_optional(self.db.pool())
        .await?;

        match row {
            Some(r) => Ok(Some(CollegeSettings {
                college_name: r.try_get("college_name")?,
                address: r.try_get("address")?,
                email: r.try_get("email")?,
                phone: r.try_get("phone")?,
            })),
            None => Ok(None),
        }
    }

    /// Insert or replace the settings row
    pub async fn store_settings(&self, settings: &CollegeSettings) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO settings (singleton, college_name, address, email, phone)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(singleton) DO UPDATE SET
                college_name = excluded.college_name,
                address = excluded.address,
                email = excluded.email,
                phone = excluded.phone
            "#,
        )
        .bind(SINGLETON_KEY)
        .bind(&settings.college_name)
        .bind(&settings.address)
        .bind(&settings.email)
        .bind(&settings.phone)
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    /// Insert `defaults` only if no settings row exists yet
    pub async fn store_if_missing(&self, defaults: &CollegeSettings) -> Result<()> {
        sqlx::query(
            r#"
            INSERT OR IGNORE INTO settings (singleton, college_name, address, email, phone)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(SINGLETON_KEY)
        .bind(&defaults.college_name)
        .bind(&defaults.address)
        .bind(&defaults.email)
        .bind(&defaults.phone)
        .execute(self.db.pool())
        .await?;
        Ok(())
    }
}
