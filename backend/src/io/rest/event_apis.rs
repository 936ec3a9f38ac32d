//! # REST API for the Event Board

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use tracing::info;

use crate::io::rest::auth::AuthUser;
use crate::io::rest::error::ApiResult;
use crate::io::rest::mappers::EventMapper;
use crate::AppState;
use shared::{EventRequest, EventResponse, MessageResponse};

pub async fn list_events(
    State(state): State<AppState>,
    AuthUser(_caller): AuthUser,
) -> ApiResult<impl IntoResponse> {
    info!("GET /api/data/events");

    let events = state.event_service.list_events().await?;
    let response: Vec<EventResponse> = events.into_iter().map(EventMapper::to_dto).collect();
    Ok(Json(response))
}

pub async fn create_event(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    body: Result<Json<EventRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    info!("POST /api/data/events");
    let Json(request) = body?;

    let event = state
        .event_service
        .create_event(&caller, EventMapper::to_fields(request))
        .await?;
    Ok((StatusCode::CREATED, Json(EventMapper::to_dto(event))))
}

pub async fn get_event(
    State(state): State<AppState>,
    AuthUser(_caller): AuthUser,
    Path(event_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    info!("GET /api/data/events/{}", event_id);

    let event = state.event_service.get_event(&event_id).await?;
    Ok(Json(EventMapper::to_dto(event)))
}

pub async fn update_event(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(event_id): Path<String>,
    body: Result<Json<EventRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    info!("PUT /api/data/events/{}", event_id);
    let Json(request) = body?;

    let event = state
        .event_service
        .update_event(&caller, &event_id, EventMapper::to_fields(request))
        .await?;
    Ok(Json(EventMapper::to_dto(event)))
}

pub async fn delete_event(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(event_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    info!("DELETE /api/data/events/{}", event_id);

    state.event_service.delete_event(&caller, &event_id).await?;
    Ok(Json(MessageResponse::new("Event deleted successfully")))
}

pub async fn register_for_event(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(event_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    info!("POST /api/data/events/{}/register", event_id);

    state.event_service.register_for_event(&caller, &event_id).await?;
    Ok(Json(MessageResponse::new("Registered for event")))
}
