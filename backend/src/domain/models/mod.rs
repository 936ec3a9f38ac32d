pub mod attendance;
pub mod course;
pub mod event;
pub mod grade;
pub mod settings;
pub mod user;
