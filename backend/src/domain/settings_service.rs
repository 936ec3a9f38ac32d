use shared::Role;
use tracing::info;

use crate::domain::access_gateway::{authorize, Identity};
use crate::domain::commands::settings::{CollegeStats, UpdateSettingsCommand};
use crate::domain::error::ServiceResult;
use crate::domain::models::settings::CollegeSettings;
use crate::storage::repositories::{CourseRepository, SettingsRepository, UserRepository};
use crate::storage::DbConnection;

/// College-wide settings and the admin dashboard counters
#[derive(Clone)]
pub struct SettingsService {
    settings: SettingsRepository,
    users: UserRepository,
    courses: CourseRepository,
}

impl SettingsService {
    pub fn new(db: DbConnection) -> Self {
        Self {
            settings: SettingsRepository::new(db.clone()),
            users: UserRepository::new(db.clone()),
            courses: CourseRepository::new(db),
        }
    }

    /// Current settings, writing the defaults on first read
    pub async fn get_settings(&self) -> ServiceResult<CollegeSettings> {
        if let Some(settings) = self.settings.get_settings().await? {
            return Ok(settings);
        }
        info!("No settings stored yet; writing defaults");
        self.settings.store_if_missing(&CollegeSettings::default()).await?;
        Ok(self.settings.get_settings().await?.unwrap_or_default())
    }

    /// Merge the provided fields into the stored settings
    pub async fn update_settings(&self, caller: &Identity, command: UpdateSettingsCommand) -> ServiceResult<CollegeSettings> {
        authorize(caller, Role::Admin)?;
        info!("Admin {} updating settings", caller.user_id);

        let mut settings = self.get_settings().await?;
        if let Some(college_name) = command.college_name {
            settings.college_name = college_name;
        }
        if let Some(address) = command.address {
            settings.address = address;
        }
        if let Some(email) = command.email {
            settings.email = email;
        }
        if let Some(phone) = command.phone {
            settings.phone = phone;
        }

        self.settings.store_settings(&settings).await?;
        Ok(settings)
    }

    pub async fn stats(&self, caller: &Identity) -> ServiceResult<CollegeStats> {
        authorize(caller, Role::Admin)?;

        Ok(CollegeStats {
            students: self.users.count_by_roles(&[Role::Student]).await?,
            faculty: self.users.count_by_roles(&[Role::Faculty, Role::Staff]).await?,
            courses: self.courses.count_courses().await?,
        })
    }
}
