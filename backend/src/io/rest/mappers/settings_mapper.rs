use shared::{SettingsResponse, StatsResponse, UpdateSettingsRequest};

use crate::domain::commands::settings::{CollegeStats, UpdateSettingsCommand};
use crate::domain::models::settings::CollegeSettings;

pub struct SettingsMapper;

impl SettingsMapper {
    pub fn to_update_command(dto: UpdateSettingsRequest) -> UpdateSettingsCommand {
        UpdateSettingsCommand {
            college_name: dto.college_name,
            address: dto.address,
            email: dto.email,
            phone: dto.phone,
        }
    }

    pub fn to_dto(settings: CollegeSettings) -> SettingsResponse {
        SettingsResponse {
            college_name: settings.college_name,
            address: settings.address,
            email: settings.email,
            phone: settings.phone,
        }
    }

    pub fn to_stats_dto(stats: CollegeStats) -> StatsResponse {
        StatsResponse {
            students: stats.students,
            faculty: stats.faculty,
            courses: stats.courses,
        }
    }
}
