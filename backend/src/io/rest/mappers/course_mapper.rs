use shared::{CourseResponse, CourseSummary, CreateCourseRequest, PersonRef, SelectCourseRequest, Schedule};

use crate::domain::commands::courses::{CreateCourseCommand, SelectCourseCommand};
use crate::domain::models::course::{CourseDetails, CourseRef};

pub struct CourseMapper;

impl CourseMapper {
    pub fn to_create_command(dto: CreateCourseRequest) -> CreateCourseCommand {
        CreateCourseCommand {
            course_code: dto.course_code,
            course_name: dto.course_name,
            credits: dto.credits,
        }
    }

    pub fn to_select_command(course_id: String, dto: SelectCourseRequest) -> SelectCourseCommand {
        SelectCourseCommand {
            course_id,
            schedule: Schedule {
                days: dto.days,
                time: dto.time,
            },
        }
    }

    pub fn to_dto(details: CourseDetails) -> CourseResponse {
        let course = details.course;
        let faculty = match (course.faculty_id, details.faculty_name) {
            (Some(id), Some(name)) => Some(PersonRef { id, name }),
            _ => None,
        };
        CourseResponse {
            id: course.id,
            course_code: course.course_code,
            course_name: course.course_name,
            credits: course.credits,
            faculty,
            schedule: course.schedule,
            students: details.student_ids,
            created_at: course.created_at,
            updated_at: course.updated_at,
        }
    }

    pub fn to_summary(course: CourseRef) -> CourseSummary {
        CourseSummary {
            id: course.id,
            course_code: course.course_code,
            course_name: course.course_name,
        }
    }
}
