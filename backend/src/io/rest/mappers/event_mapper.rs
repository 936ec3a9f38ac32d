use shared::{EventRequest, EventResponse, PersonRef};

use crate::domain::commands::events::EventFields;
use crate::domain::models::event::EventDetails;

pub struct EventMapper;

impl EventMapper {
    pub fn to_fields(dto: EventRequest) -> EventFields {
        EventFields {
            title: dto.title,
            date: dto.date,
            category: dto.category,
            location: dto.location,
            faculty_coordinator: dto.faculty_coordinator,
        }
    }

    pub fn to_dto(details: EventDetails) -> EventResponse {
        let event = details.event;
        let faculty_coordinator = match (event.faculty_coordinator_id, details.coordinator_name) {
            (Some(id), Some(name)) => Some(PersonRef { id, name }),
            _ => None,
        };
        EventResponse {
            id: event.id,
            title: event.title,
            date: event.date,
            category: event.category,
            location: event.location,
            faculty_coordinator,
            registered_students: details.student_ids,
            created_at: event.created_at,
            updated_at: event.updated_at,
        }
    }
}
