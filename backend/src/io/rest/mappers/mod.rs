pub mod attendance_mapper;
pub mod course_mapper;
pub mod event_mapper;
pub mod grade_mapper;
pub mod settings_mapper;
pub mod user_mapper;

pub use attendance_mapper::AttendanceMapper;
pub use course_mapper::CourseMapper;
pub use event_mapper::EventMapper;
pub use grade_mapper::GradeMapper;
pub use settings_mapper::SettingsMapper;
pub use user_mapper::UserMapper;
