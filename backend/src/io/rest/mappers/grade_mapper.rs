use shared::{GradeRecordResponse, UpdateScoresRequest};

use crate::domain::commands::grades::UpsertScoresCommand;
use crate::domain::models::course::CourseRef;
use crate::domain::models::grade::{GradeRecord, ScorePatch};
use crate::domain::models::user::User;
use crate::io::rest::mappers::{CourseMapper, UserMapper};

pub struct GradeMapper;

impl GradeMapper {
    pub fn to_upsert_command(student_id: String, course_id: String, dto: UpdateScoresRequest) -> UpsertScoresCommand {
        UpsertScoresCommand {
            student_id,
            course_id,
            patch: ScorePatch {
                quiz1: dto.quiz1,
                quiz2: dto.quiz2,
                quiz3: dto.quiz3,
                cat1: dto.cat1,
                cat2: dto.cat2,
                fat: dto.fat,
            },
        }
    }

    /// The record with its derived percentages
    pub fn to_dto(record: GradeRecord) -> GradeRecordResponse {
        let breakdown = record.breakdown();
        GradeRecordResponse {
            student_id: record.student_id,
            course_id: record.course_id,
            quiz1: record.quiz1,
            quiz2: record.quiz2,
            quiz3: record.quiz3,
            cat1: record.cat1,
            cat2: record.cat2,
            fat: record.fat,
            internal_percentage: breakdown.internal_percentage,
            cat_percentage: breakdown.cat_percentage,
            fat_percentage: breakdown.fat_percentage,
            total_percentage: breakdown.total_percentage,
            created_at: record.created_at,
            updated_at: record.updated_at,
            student: None,
            course: None,
        }
    }

    pub fn to_dto_with_student(record: GradeRecord, student: User) -> GradeRecordResponse {
        GradeRecordResponse {
            student: Some(UserMapper::to_student_summary(student)),
            ..Self::to_dto(record)
        }
    }

    pub fn to_dto_with_course(record: GradeRecord, course: CourseRef) -> GradeRecordResponse {
        GradeRecordResponse {
            course: Some(CourseMapper::to_summary(course)),
            ..Self::to_dto(record)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dto_carries_derived_percentages() {
        let record = GradeRecord {
            student_id: "s".to_string(),
            course_id: "c".to_string(),
            quiz1: Some(8.0),
            quiz2: Some(6.0),
            quiz3: None,
            cat1: Some(40.0),
            cat2: None,
            fat: Some(70.0),
            created_at: "t".to_string(),
            updated_at: "t".to_string(),
        };

        let json = serde_json::to_value(GradeMapper::to_dto(record)).unwrap();
        assert_eq!(json["totalPercentage"], 73.0);
        assert_eq!(json["quiz3"], serde_json::Value::Null);
        assert!(json.get("student").is_none());
    }
}
