//! # College Backend
//!
//! REST backend for college administration: accounts, courses, events,
//! grade ledgers and attendance ledgers.
//!
//! ## Architecture
//!
//! ```text
//! IO Layer (axum handlers, DTO mappers)
//!     ↓
//! Domain Layer (services, access checks, derived values)
//!     ↓
//! Storage Layer (sqlx repositories over SQLite)
//! ```

pub mod config;
pub mod domain;
pub mod io;
pub mod storage;

use anyhow::{Context, Result};
use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post, put},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::Config;
use crate::domain::{
    AccessGateway, AttendanceService, CourseService, EnrollmentService, EventService, GradeService,
    SettingsService, UserService,
};
use crate::io::rest::{
    attendance_apis, auth_apis, course_apis, event_apis, grade_apis, settings_apis, user_apis,
};
use crate::storage::DbConnection;

/// Main application state that holds all services
#[derive(Clone)]
pub struct AppState {
    pub access_gateway: AccessGateway,
    pub user_service: UserService,
    pub course_service: CourseService,
    pub enrollment_service: EnrollmentService,
    pub event_service: EventService,
    pub settings_service: SettingsService,
    pub grade_service: GradeService,
    pub attendance_service: AttendanceService,
}

impl AppState {
    /// Wire every service to one database
    pub fn new(db: DbConnection, session_ttl_hours: i64) -> Self {
        let access_gateway = AccessGateway::new(db.clone(), session_ttl_hours);
        Self {
            user_service: UserService::new(db.clone(), access_gateway.clone()),
            course_service: CourseService::new(db.clone()),
            enrollment_service: EnrollmentService::new(db.clone()),
            event_service: EventService::new(db.clone()),
            settings_service: SettingsService::new(db.clone()),
            grade_service: GradeService::new(db.clone()),
            attendance_service: AttendanceService::new(db),
            access_gateway,
        }
    }
}

/// Open the database and build the application state
pub async fn initialize_backend(config: &Config) -> Result<AppState> {
    info!("Setting up database at {}", config.database_url);
    let db = DbConnection::new(&config.database_url)
        .await
        .with_context(|| format!("Failed to open database {}", config.database_url))?;

    info!("Setting up domain services");
    Ok(AppState::new(db, config.session_ttl_hours))
}

/// Create the Axum router with all routes configured
pub fn create_router(app_state: AppState, cors_origin: &str) -> Result<Router> {
    let origin = cors_origin
        .parse::<HeaderValue>()
        .with_context(|| format!("Invalid CORS origin: {}", cors_origin))?;
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    let auth_routes = Router::new()
        .route("/register", post(auth_apis::register))
        .route("/login", post(auth_apis::login));

    let data_routes = Router::new()
        .route("/settings", get(settings_apis::get_settings).post(settings_apis::update_settings))
        .route("/stats", get(settings_apis::get_stats))
        .route("/users", get(user_apis::list_users))
        .route("/users/:id", get(user_apis::get_user))
        .route("/students", post(user_apis::create_student))
        .route("/staff", post(user_apis::create_staff))
        .route("/courses", get(course_apis::list_courses).post(course_apis::create_course))
        .route("/courses/:id/select", put(course_apis::select_course))
        .route("/courses/:id/roster", get(course_apis::get_roster))
        .route("/courses/:id/register", post(course_apis::enroll))
        .route("/courses/:id/marks", get(grade_apis::list_course_marks))
        .route("/courses/:id/attendance", get(attendance_apis::get_course_attendance))
        .route("/events", get(event_apis::list_events).post(event_apis::create_event))
        .route(
            "/events/:id",
            get(event_apis::get_event)
                .put(event_apis::update_event)
                .delete(event_apis::delete_event),
        )
        .route("/events/:id/register", post(event_apis::register_for_event))
        .route("/my/marks", get(grade_apis::list_my_marks))
        .route("/my/attendance", get(attendance_apis::get_my_attendance))
        .route(
            "/marks/:student_id/:course_id",
            get(grade_apis::get_scores).put(grade_apis::upsert_scores),
        )
        .route("/attendance/:course_id", post(attendance_apis::submit_attendance));

    let api_routes = Router::new()
        .nest("/auth", auth_routes)
        .nest("/data", data_routes);

    Ok(Router::new()
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state))
}
