//! # REST API Interface Layer
//!
//! HTTP handlers for the college backend. Handlers authenticate the caller,
//! map request DTOs to domain commands, call one service and map the result
//! back. Domain errors become status codes in [`error::ApiError`].

pub mod attendance_apis;
pub mod auth;
pub mod auth_apis;
pub mod course_apis;
pub mod error;
pub mod event_apis;
pub mod grade_apis;
pub mod mappers;
pub mod settings_apis;
pub mod user_apis;
