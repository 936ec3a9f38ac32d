//! # REST API for the User Directory

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use tracing::info;

use crate::io::rest::auth::AuthUser;
use crate::io::rest::error::ApiResult;
use crate::io::rest::mappers::UserMapper;
use crate::AppState;
use shared::{CreateMemberRequest, UserResponse};

pub async fn list_users(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
) -> ApiResult<impl IntoResponse> {
    info!("GET /api/data/users");

    let users = state.user_service.list_users(&caller).await?;
    let response: Vec<UserResponse> = users.into_iter().map(UserMapper::to_dto).collect();
    Ok(Json(response))
}

pub async fn get_user(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(user_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    info!("GET /api/data/users/{}", user_id);

    let profile = state.user_service.get_user(&caller, &user_id).await?;
    Ok(Json(UserMapper::to_dto(profile)))
}

pub async fn create_student(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    body: Result<Json<CreateMemberRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    info!("POST /api/data/students");
    let Json(request) = body?;

    let user = state
        .user_service
        .create_student(&caller, UserMapper::to_create_member_command(request))
        .await?;
    Ok((StatusCode::CREATED, Json(UserMapper::to_new_user_dto(user))))
}

pub async fn create_staff(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    body: Result<Json<CreateMemberRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    info!("POST /api/data/staff");
    let Json(request) = body?;

    let user = state
        .user_service
        .create_staff(&caller, UserMapper::to_create_member_command(request))
        .await?;
    Ok((StatusCode::CREATED, Json(UserMapper::to_new_user_dto(user))))
}
