//! # REST API for Accounts
//!
//! Public endpoints: registration and login. Both return a bearer token.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use tracing::info;

use crate::io::rest::error::ApiResult;
use crate::io::rest::mappers::UserMapper;
use crate::AppState;
use shared::{LoginRequest, RegisterRequest};

/// Register a new account
pub async fn register(
    State(state): State<AppState>,
    body: Result<Json<RegisterRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    info!("POST /api/auth/register");
    let Json(request) = body?;

    let result = state.user_service.register(UserMapper::to_register_command(request)).await?;
    Ok((StatusCode::CREATED, Json(UserMapper::to_auth_dto(result))))
}

/// Exchange email and password for a token
pub async fn login(
    State(state): State<AppState>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    info!("POST /api/auth/login");
    let Json(request) = body?;

    let result = state.user_service.login(UserMapper::to_login_command(request)).await?;
    Ok(Json(UserMapper::to_auth_dto(result)))
}
