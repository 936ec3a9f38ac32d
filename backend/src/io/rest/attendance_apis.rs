//! # REST API for Attendance

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    response::{IntoResponse, Json},
};
use tracing::info;

use crate::io::rest::auth::AuthUser;
use crate::io::rest::error::ApiResult;
use crate::io::rest::mappers::AttendanceMapper;
use crate::AppState;
use shared::{AttendanceSummary, SubmitAttendanceRequest, SubmitAttendanceResponse};

/// Record a day of attendance for a course
pub async fn submit_attendance(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(course_id): Path<String>,
    body: Result<Json<SubmitAttendanceRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    info!("POST /api/data/attendance/{}", course_id);
    let Json(request) = body?;

    let recorded = state
        .attendance_service
        .submit_day(&caller, AttendanceMapper::to_submit_command(course_id, request))
        .await?;
    Ok(Json(SubmitAttendanceResponse {
        message: "Attendance submitted successfully".to_string(),
        recorded,
    }))
}

pub async fn get_my_attendance(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
) -> ApiResult<impl IntoResponse> {
    info!("GET /api/data/my/attendance");

    let ledgers = state.attendance_service.get_my_attendance(&caller).await?;
    let response: Vec<AttendanceSummary> = ledgers
        .into_iter()
        .map(|(ledger, course)| AttendanceMapper::to_summary_dto(ledger, course))
        .collect();
    Ok(Json(response))
}

pub async fn get_course_attendance(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(course_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    info!("GET /api/data/courses/{}/attendance", course_id);

    let sheet = state
        .attendance_service
        .get_course_attendance_sheet(&caller, &course_id)
        .await?;
    Ok(Json(AttendanceMapper::to_sheet_dto(sheet)))
}
