//! # Domain Module
//!
//! Business rules of the college backend: who may do what, how grades and
//! attendance are derived, and the services the REST layer calls into.
//! Services return [`error::ServiceError`]; storage failures arrive as
//! `anyhow::Error` and are wrapped as `ServiceError::Storage`.

pub mod access_gateway;
pub mod attendance_service;
pub mod commands;
pub mod course_service;
pub mod enrollment_service;
pub mod error;
pub mod event_service;
pub mod grade_service;
pub mod models;
pub mod settings_service;
pub mod user_service;

pub use access_gateway::{AccessGateway, Identity};
pub use attendance_service::AttendanceService;
pub use course_service::CourseService;
pub use enrollment_service::EnrollmentService;
pub use error::{ServiceError, ServiceResult, ValidationError};
pub use event_service::EventService;
pub use grade_service::GradeService;
pub use settings_service::SettingsService;
pub use user_service::UserService;
