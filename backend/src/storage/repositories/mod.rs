pub mod attendance_repository;
pub mod course_repository;
pub mod enrollment_repository;
pub mod event_repository;
pub mod grade_repository;
pub mod session_repository;
pub mod settings_repository;
pub mod user_repository;

pub use attendance_repository::AttendanceRepository;
pub use course_repository::CourseRepository;
pub use enrollment_repository::EnrollmentRepository;
pub use event_repository::EventRepository;
pub use grade_repository::GradeRepository;
pub use session_repository::SessionRepository;
pub use settings_repository::SettingsRepository;
pub use user_repository::UserRepository;
