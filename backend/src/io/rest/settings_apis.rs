//! # REST API for Settings and Stats

use axum::{
    extract::{rejection::JsonRejection, State},
    response::{IntoResponse, Json},
};
use tracing::info;

use crate::io::rest::auth::AuthUser;
use crate::io::rest::error::ApiResult;
use crate::io::rest::mappers::SettingsMapper;
use crate::AppState;
use shared::UpdateSettingsRequest;

pub async fn get_settings(
    State(state): State<AppState>,
    AuthUser(_caller): AuthUser,
) -> ApiResult<impl IntoResponse> {
    info!("GET /api/data/settings");

    let settings = state.settings_service.get_settings().await?;
    Ok(Json(SettingsMapper::to_dto(settings)))
}

pub async fn update_settings(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    body: Result<Json<UpdateSettingsRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    info!("POST /api/data/settings");
    let Json(request) = body?;

    let settings = state
        .settings_service
        .update_settings(&caller, SettingsMapper::to_update_command(request))
        .await?;
    Ok(Json(SettingsMapper::to_dto(settings)))
}

/// Head counts for the admin dashboard
pub async fn get_stats(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
) -> ApiResult<impl IntoResponse> {
    info!("GET /api/data/stats");

    let stats = state.settings_service.stats(&caller).await?;
    Ok(Json(SettingsMapper::to_stats_dto(stats)))
}
