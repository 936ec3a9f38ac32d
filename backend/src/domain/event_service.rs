use chrono::Utc;
use shared::Role;
use tracing::info;

use crate::domain::access_gateway::{authorize, Identity};
use crate::domain::commands::events::EventFields;
use crate::domain::error::{ServiceError, ServiceResult, ValidationError};
use crate::domain::models::event::{normalize_event_date, Event, EventDetails};
use crate::storage::repositories::{EventRepository, UserRepository};
use crate::storage::DbConnection;

/// Campus events and student registrations
#[derive(Clone)]
pub struct EventService {
    events: EventRepository,
    users: UserRepository,
}

impl EventService {
    pub fn new(db: DbConnection) -> Self {
        Self {
            events: EventRepository::new(db.clone()),
            users: UserRepository::new(db),
        }
    }

    pub async fn create_event(&self, caller: &Identity, fields: EventFields) -> ServiceResult<EventDetails> {
        authorize(caller, Role::Admin)?;

        let title = ValidationError::require(fields.title, "title")?;
        let date = normalize_event_date(&ValidationError::require(fields.date, "date")?)?;
        let category = ValidationError::require(fields.category, "category")?;
        let location = ValidationError::require(fields.location, "location")?;
        let faculty_coordinator_id = self.resolve_coordinator(fields.faculty_coordinator).await?;

        info!("Creating event: title={}, date={}", title, date);

        let now = Utc::now().to_rfc3339();
        let event = Event {
            id: Event::generate_id(),
            title: title.trim().to_string(),
            date,
            category: category.trim().to_string(),
            location: location.trim().to_string(),
            faculty_coordinator_id,
            created_at: now.clone(),
            updated_at: now,
        };
        self.events.store_event(&event).await?;

        self.get_event(&event.id).await
    }

    /// All events, newest date first
    pub async fn list_events(&self) -> ServiceResult<Vec<EventDetails>> {
        let events = self.events.list_event_details().await?;
        info!("Found {} events", events.len());
        Ok(events)
    }

    pub async fn get_event(&self, event_id: &str) -> ServiceResult<EventDetails> {
        self.events
            .get_event_details(event_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Event not found"))
    }

    /// Change the provided fields of an event
    pub async fn update_event(&self, caller: &Identity, event_id: &str, fields: EventFields) -> ServiceResult<EventDetails> {
        authorize(caller, Role::Admin)?;
        info!("Updating event {}", event_id);

        let mut event = self.get_event(event_id).await?.event;

        if let Some(title) = fields.title {
            event.title = ValidationError::require(Some(title), "title")?.trim().to_string();
        }
        if let Some(date) = fields.date {
            event.date = normalize_event_date(&date)?;
        }
        if let Some(category) = fields.category {
            event.category = ValidationError::require(Some(category), "category")?.trim().to_string();
        }
        if let Some(location) = fields.location {
            event.location = ValidationError::require(Some(location), "location")?.trim().to_string();
        }
        if fields.faculty_coordinator.is_some() {
            event.faculty_coordinator_id = self.resolve_coordinator(fields.faculty_coordinator).await?;
        }
        event.updated_at = Utc::now().to_rfc3339();

        if !self.events.update_event(&event).await? {
            return Err(ServiceError::not_found("Event not found"));
        }
        self.get_event(event_id).await
    }

    pub async fn delete_event(&self, caller: &Identity, event_id: &str) -> ServiceResult<()> {
        authorize(caller, Role::Admin)?;
        info!("Deleting event {}", event_id);

        if !self.events.delete_event(event_id).await? {
            return Err(ServiceError::not_found("Event not found"));
        }
        Ok(())
    }

    /// The calling student signs up for an event
    pub async fn register_for_event(&self, caller: &Identity, event_id: &str) -> ServiceResult<()> {
        if !caller.is(Role::Student) {
            return Err(ServiceError::unauthorized("Only students can register"));
        }
        info!("Registering student {} for event {}", caller.user_id, event_id);

        let event = self.events.get_event_details(event_id).await?;
        let student = self.users.get_user(&caller.user_id).await?;
        if event.is_none() || student.is_none() {
            return Err(ServiceError::not_found("Event or student not found"));
        }

        if !self
            .events
            .register(event_id, &caller.user_id, &Utc::now().to_rfc3339())
            .await?
        {
            return Err(ServiceError::conflict("Already registered"));
        }
        Ok(())
    }

    /// A blank coordinator means none; anything else must name an existing user
    async fn resolve_coordinator(&self, coordinator: Option<String>) -> ServiceResult<Option<String>> {
        let Some(id) = coordinator.map(|id| id.trim().to_string()).filter(|id| !id.is_empty()) else {
            return Ok(None);
        };
        if self.users.get_user(&id).await?.is_none() {
            return Err(ServiceError::not_found("Faculty coordinator not found"));
        }
        Ok(Some(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::test_support::identity;
    use crate::storage::test_utils::insert_user;

    async fn create_test_service() -> EventService {
        let db = DbConnection::init_test().await.expect("Failed to create test database");
        insert_user(&db, "f1", "Dr. One", Role::Faculty).await;
        insert_user(&db, "s1", "Sam", Role::Student).await;
        EventService::new(db)
    }

    fn fields(title: &str, date: &str) -> EventFields {
        EventFields {
            title: Some(title.to_string()),
            date: Some(date.to_string()),
            category: Some("Technical".to_string()),
            location: Some("Lab 2".to_string()),
            faculty_coordinator: None,
        }
    }

    #[tokio::test]
    async fn test_event_lifecycle() {
        let service = create_test_service().await;
        let admin = identity("admin", Role::Admin);

        let mut request = fields("Hackathon", "2024-09-01");
        request.faculty_coordinator = Some("f1".to_string());
        let created = service.create_event(&admin, request).await.unwrap();
        assert_eq!(created.coordinator_name.as_deref(), Some("Dr. One"));
        assert_eq!(created.event.date, "2024-09-01T00:00:00.000Z");

        let update = EventFields {
            location: Some("Auditorium".to_string()),
            ..EventFields::default()
        };
        let updated = service.update_event(&admin, &created.event.id, update).await.unwrap();
        assert_eq!(updated.event.location, "Auditorium");
        assert_eq!(updated.event.title, "Hackathon");
        assert_eq!(updated.event.faculty_coordinator_id.as_deref(), Some("f1"));

        service.delete_event(&admin, &created.event.id).await.unwrap();
        assert!(matches!(
            service.get_event(&created.event.id).await,
            Err(ServiceError::NotFound(_))
        ));
        assert!(matches!(
            service.delete_event(&admin, &created.event.id).await,
            Err(ServiceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_create_event_validation() {
        let service = create_test_service().await;
        let admin = identity("admin", Role::Admin);

        let mut missing = fields("Fest", "2024-09-01");
        missing.location = None;
        assert!(matches!(
            service.create_event(&admin, missing).await,
            Err(ServiceError::Validation(ValidationError::MissingField("location")))
        ));
        assert!(matches!(
            service.create_event(&admin, fields("Fest", "someday")).await,
            Err(ServiceError::Validation(ValidationError::InvalidDate(_)))
        ));
        assert!(matches!(
            service.create_event(&identity("f1", Role::Faculty), fields("Fest", "2024-09-01")).await,
            Err(ServiceError::Unauthorized(_))
        ));

        let mut ghost = fields("Fest", "2024-09-01");
        ghost.faculty_coordinator = Some("ghost".to_string());
        assert!(matches!(service.create_event(&admin, ghost).await, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_events_listed_newest_first_and_registration_once() {
        let service = create_test_service().await;
        let admin = identity("admin", Role::Admin);
        service.create_event(&admin, fields("Old", "2024-01-01")).await.unwrap();
        let newer = service.create_event(&admin, fields("New", "2024-06-01")).await.unwrap();

        let titles: Vec<String> = service
            .list_events()
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.event.title)
            .collect();
        assert_eq!(titles, vec!["New", "Old"]);

        let sam = identity("s1", Role::Student);
        service.register_for_event(&sam, &newer.event.id).await.unwrap();
        assert!(matches!(
            service.register_for_event(&sam, &newer.event.id).await,
            Err(ServiceError::Conflict(_))
        ));
        assert!(matches!(
            service.register_for_event(&identity("f1", Role::Faculty), &newer.event.id).await,
            Err(ServiceError::Unauthorized(_))
        ));
        assert!(matches!(
            service.register_for_event(&sam, "missing").await,
            Err(ServiceError::NotFound(_))
        ));

        let details = service.get_event(&newer.event.id).await.unwrap();
        assert_eq!(details.student_ids, vec!["s1".to_string()]);
    }
}
