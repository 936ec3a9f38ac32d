use anyhow::Result;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use std::collections::HashMap;

use crate::domain::models::event::{Event, EventDetails};
use crate::storage::connection::DbConnection;
use crate::storage::is_unique_violation;

const EVENT_SELECT: &str = "SELECT e.id, e.title, e.date, e.category, e.location, \
     e.faculty_coordinator_id, e.created_at, e.updated_at, u.name AS coordinator_name \
     FROM events e LEFT JOIN users u ON u.id = e.faculty_coordinator_id";

/// Repository for events and event registrations
#[derive(Clone)]
pub struct EventRepository {
    db: DbConnection,
}

impl EventRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    pub async fn store_event(&self, event: &Event) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO events (id, title, date, category, location, faculty_coordinator_id, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&event.id)
        .bind(&event.title)
        .bind(&event.date)
        .bind(&event.category)
        .bind(&event.location)
        .bind(&event.faculty_coordinator_id)
        .bind(&event.created_at)
        .bind(&event.updated_at)
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    /// Overwrite an event's fields. Returns false if it does not exist.
    pub async fn update_event(&self, event: &Event) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE events
            SET title = ?, date = ?, category = ?, location = ?, faculty_coordinator_id = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&event.title)
        .bind(&event.date)
        .bind(&event.category)
        .bind(&event.location)
        .bind(&event.faculty_coordinator_id)
        .bind(&event.updated_at)
        .bind(&event.id)
        .execute(self.db.pool())
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete an event; its registrations go with it
    pub async fn delete_event(&self, event_id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM events WHERE id = ?")
            .bind(event_id)
            .execute(self.db.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn get_event_details(&self, event_id: &str) -> Result<Option<EventDetails>> {
        let row = sqlx::query(&format!("{} WHERE e.id = ?", EVENT_SELECT))
            .bind(event_id)
            .fetch_optional(self.db.pool())
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let student_ids: Vec<String> = sqlx::query_scalar(
            "SELECT student_id FROM event_registrations WHERE event_id = ? ORDER BY registered_at, student_id",
        )
        .bind(event_id)
        .fetch_all(self.db.pool())
        .await?;

        Ok(Some(details_from_row(&row, student_ids)?))
    }

    /// All events, most recent date first
    pub async fn list_event_details(&self) -> Result<Vec<EventDetails>> {
        let rows = sqlx::query(&format!("{} ORDER BY e.date DESC, e.created_at DESC", EVENT_SELECT))
            .fetch_all(self.db.pool())
            .await?;

        let registration_rows = sqlx::query(
            "SELECT event_id, student_id FROM event_registrations ORDER BY registered_at, student_id",
        )
        .fetch_all(self.db.pool())
        .await?;

        let mut students_by_event: HashMap<String, Vec<String>> = HashMap::new();
        for row in &registration_rows {
            students_by_event
                .entry(row.try_get("event_id")?)
                .or_default()
                .push(row.try_get("student_id")?);
        }

        rows.iter()
            .map(|row| -> Result<EventDetails> {
                let event_id: String = row.try_get("id")?;
                let student_ids = students_by_event.remove(&event_id).unwrap_or_default();
                details_from_row(row, student_ids)
            })
            .collect()
    }

    /// Add a registration. Returns false if the student was already registered.
    pub async fn register(&self, event_id: &str, student_id: &str, registered_at: &str) -> Result<bool> {
        let result = sqlx::query(
            "INSERT INTO event_registrations (event_id, student_id, registered_at) VALUES (?, ?, ?)",
        )
        .bind(event_id)
        .bind(student_id)
        .bind(registered_at)
        .execute(self.db.pool())
        .await;

        match result {
            Ok(_) => Ok(true),
            Err(e) if is_unique_violation(&e) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Ids of the events a student registered for
    pub async fn events_of(&self, student_id: &str) -> Result<Vec<String>> {
        let ids: Vec<String> = sqlx::query_scalar(
            "SELECT event_id FROM event_registrations WHERE student_id = ? ORDER BY registered_at, event_id",
        )
        .bind(student_id)
        .fetch_all(self.db.pool())
        .await?;
        Ok(ids)
    }
}

fn details_from_row(row: &SqliteRow, student_ids: Vec<String>) -> Result<EventDetails> {
    Ok(EventDetails {
        event: Event {
            id: row.try_get("id")?,
            title: row.try_get("title")?,
            date: row.try_get("date")?,
            category: row.try_get("category")?,
            location: row.try_get("location")?,
            faculty_coordinator_id: row.try_get("faculty_coordinator_id")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        },
        coordinator_name: row.try_get("coordinator_name")?,
        student_ids,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::test_utils::insert_user;
    use shared::Role;

    fn event(title: &str, date: &str, coordinator: Option<&str>) -> Event {
        Event {
            id: Event::generate_id(),
            title: title.to_string(),
            date: date.to_string(),
            category: "Cultural".to_string(),
            location: "Main Hall".to_string(),
            faculty_coordinator_id: coordinator.map(str::to_string),
            created_at: "2024-01-01T00:00:00Z".to_string(),
            updated_at: "2024-01-01T00:00:00Z".to_string(),
        }
    }

    #[tokio::test]
    async fn test_events_sorted_newest_first_with_coordinator() {
        let db = DbConnection::init_test().await.unwrap();
        insert_user(&db, "f1", "Dr. Rao", Role::Faculty).await;
        let repo = EventRepository::new(db);

        repo.store_event(&event("Old", "2024-01-10T00:00:00Z", None)).await.unwrap();
        repo.store_event(&event("New", "2024-05-10T00:00:00Z", Some("f1"))).await.unwrap();

        let events = repo.list_event_details().await.unwrap();
        assert_eq!(events[0].event.title, "New");
        assert_eq!(events[0].coordinator_name.as_deref(), Some("Dr. Rao"));
        assert_eq!(events[1].coordinator_name, None);
    }

    #[tokio::test]
    async fn test_registration_and_delete_cascade() {
        let db = DbConnection::init_test().await.unwrap();
        insert_user(&db, "s1", "Sam", Role::Student).await;
        let repo = EventRepository::new(db);
        let fest = event("Fest", "2024-02-01T00:00:00Z", None);
        repo.store_event(&fest).await.unwrap();

        assert!(repo.register(&fest.id, "s1", "now").await.unwrap());
        assert!(!repo.register(&fest.id, "s1", "now").await.unwrap());
        assert_eq!(repo.events_of("s1").await.unwrap(), vec![fest.id.clone()]);
        assert_eq!(
            repo.get_event_details(&fest.id).await.unwrap().unwrap().student_ids,
            vec!["s1".to_string()]
        );

        assert!(repo.delete_event(&fest.id).await.unwrap());
        assert!(!repo.delete_event(&fest.id).await.unwrap());
        assert!(repo.events_of("s1").await.unwrap().is_empty());
    }
}
