use shared::{AttendanceSheetResponse, AttendanceSummary, SubmitAttendanceRequest};

use crate::domain::commands::attendance::{AttendanceSheet, SubmitDayCommand};
use crate::domain::models::attendance::AttendanceLedger;
use crate::domain::models::course::CourseRef;
use crate::io::rest::mappers::{CourseMapper, UserMapper};

pub struct AttendanceMapper;

impl AttendanceMapper {
    pub fn to_submit_command(course_id: String, dto: SubmitAttendanceRequest) -> SubmitDayCommand {
        SubmitDayCommand {
            course_id,
            date: dto.date,
            entries: dto.attendance_data,
        }
    }

    pub fn to_summary_dto(ledger: AttendanceLedger, course: CourseRef) -> AttendanceSummary {
        AttendanceSummary {
            course: CourseMapper::to_summary(course),
            percentage: ledger.percentage(),
            present: ledger.present(),
            total: ledger.total(),
        }
    }

    pub fn to_sheet_dto(sheet: AttendanceSheet) -> AttendanceSheetResponse {
        AttendanceSheetResponse {
            roster: sheet.roster.into_iter().map(UserMapper::to_person_ref).collect(),
            records: sheet.records,
        }
    }
}
