//! # REST API for the Course Catalog and Enrollment

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use tracing::info;

use crate::io::rest::auth::AuthUser;
use crate::io::rest::error::ApiResult;
use crate::io::rest::mappers::{CourseMapper, UserMapper};
use crate::AppState;
use shared::{CourseResponse, CreateCourseRequest, MessageResponse, SelectCourseRequest, StudentSummary};

pub async fn list_courses(
    State(state): State<AppState>,
    AuthUser(_caller): AuthUser,
) -> ApiResult<impl IntoResponse> {
    info!("GET /api/data/courses");

    let courses = state.course_service.list_courses().await?;
    let response: Vec<CourseResponse> = courses.into_iter().map(CourseMapper::to_dto).collect();
    Ok(Json(response))
}

pub async fn create_course(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    body: Result<Json<CreateCourseRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    info!("POST /api/data/courses");
    let Json(request) = body?;

    let course = state
        .course_service
        .create_course(&caller, CourseMapper::to_create_command(request))
        .await?;
    Ok((StatusCode::CREATED, Json(CourseMapper::to_dto(course))))
}

/// Faculty claims a course and sets its schedule
pub async fn select_course(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(course_id): Path<String>,
    body: Result<Json<SelectCourseRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    info!("PUT /api/data/courses/{}/select", course_id);
    let Json(request) = body?;

    let course = state
        .course_service
        .select_course(&caller, CourseMapper::to_select_command(course_id, request))
        .await?;
    Ok(Json(CourseMapper::to_dto(course)))
}

pub async fn get_roster(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(course_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    info!("GET /api/data/courses/{}/roster", course_id);

    let students = state.enrollment_service.roster(&caller, &course_id).await?;
    let response: Vec<StudentSummary> = students.into_iter().map(UserMapper::to_student_summary).collect();
    Ok(Json(response))
}

/// The calling student enrolls in a course
pub async fn enroll(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(course_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    info!("POST /api/data/courses/{}/register", course_id);

    state.enrollment_service.enroll(&caller, &course_id).await?;
    Ok(Json(MessageResponse::new("Successfully registered.")))
}
