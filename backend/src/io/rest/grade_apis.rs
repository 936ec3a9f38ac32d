//! # REST API for Marks
//!
//! Score entry by the course's faculty plus the faculty, admin and student
//! read paths. Every response carries the derived percentages.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    response::{IntoResponse, Json},
};
use tracing::info;

use crate::io::rest::auth::AuthUser;
use crate::io::rest::error::ApiResult;
use crate::io::rest::mappers::GradeMapper;
use crate::AppState;
use shared::{GradeRecordResponse, UpdateScoresRequest};

/// Partially update one student's scores in a course
pub async fn upsert_scores(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path((student_id, course_id)): Path<(String, String)>,
    body: Result<Json<UpdateScoresRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    info!("PUT /api/data/marks/{}/{}", student_id, course_id);
    let Json(request) = body?;

    let record = state
        .grade_service
        .upsert_scores(&caller, GradeMapper::to_upsert_command(student_id, course_id, request))
        .await?;
    Ok(Json(GradeMapper::to_dto(record)))
}

pub async fn get_scores(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path((student_id, course_id)): Path<(String, String)>,
) -> ApiResult<impl IntoResponse> {
    info!("GET /api/data/marks/{}/{}", student_id, course_id);

    let record = state.grade_service.get_scores(&caller, &student_id, &course_id).await?;
    Ok(Json(GradeMapper::to_dto(record)))
}

pub async fn list_course_marks(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(course_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    info!("GET /api/data/courses/{}/marks", course_id);

    let records = state.grade_service.list_for_course(&caller, &course_id).await?;
    let response: Vec<GradeRecordResponse> = records
        .into_iter()
        .map(|(record, student)| GradeMapper::to_dto_with_student(record, student))
        .collect();
    Ok(Json(response))
}

pub async fn list_my_marks(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
) -> ApiResult<impl IntoResponse> {
    info!("GET /api/data/my/marks");

    let records = state.grade_service.list_for_student(&caller).await?;
    let response: Vec<GradeRecordResponse> = records
        .into_iter()
        .map(|(record, course)| GradeMapper::to_dto_with_course(record, course))
        .collect();
    Ok(Json(response))
}
