//! Event service implementation
//!
//! Listing and filtering for every user, create/update/delete and attendee
//! listing for administrators.

use tracing::{debug, info};

use crate::models::{Attendance, Event, EventRequest, EventStatus};
use crate::utils::errors::{ApiError, VpassError, Result};
use super::api::ApiClient;

/// Event service for the events resource
#[derive(Clone, Debug)]
pub struct EventService {
    api: ApiClient,
}

impl EventService {
    /// Create a new EventService instance
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// List all events
    pub async fn list_events(&self) -> Result<Vec<Event>> {
        let events: Vec<Event> = self.api.get_json("/api/events/").await?;
        debug!(count = events.len(), "Fetched events");
        Ok(events)
    }

    /// List events with the given server-computed status
    pub async fn filter_by_status(&self, status: EventStatus) -> Result<Vec<Event>> {
        let path = format!(
            "/api/events/filter_by_status/?status={}",
            urlencoding::encode(status.as_str())
        );
        let events: Vec<Event> = self.api.get_json(&path).await?;
        debug!(count = events.len(), status = %status, "Fetched filtered events");
        Ok(events)
    }

    /// Get a single event
    pub async fn get_event(&self, event_id: i64) -> Result<Event> {
        self.api
            .get_json(&format!("/api/events/{}/", event_id))
            .await
            .map_err(|e| not_found_as_event(e, event_id))
    }

    /// Create an event (admin)
    pub async fn create_event(&self, request: &EventRequest) -> Result<Event> {
        request.validate()?;
        let event: Event = self.api.post_json("/api/events/", request).await?;
        info!(event_id = event.id, title = %event.title, "Event created");
        Ok(event)
    }

    /// Replace an event (admin)
    pub async fn update_event(&self, event_id: i64, request: &EventRequest) -> Result<Event> {
        request.validate()?;
        let event: Event = self
            .api
            .put_json(&format!("/api/events/{}/", event_id), request)
            .await
            .map_err(|e| not_found_as_event(e, event_id))?;
        info!(event_id = event.id, "Event updated");
        Ok(event)
    }

    /// Delete an event (admin)
    pub async fn delete_event(&self, event_id: i64) -> Result<()> {
        self.api
            .delete(&format!("/api/events/{}/", event_id))
            .await
            .map_err(|e| not_found_as_event(e, event_id))?;
        info!(event_id = event_id, "Event deleted");
        Ok(())
    }

    /// Attendance records of an event (admin)
    pub async fn list_attendees(&self, event_id: i64) -> Result<Vec<Attendance>> {
        self.api
            .get_json(&format!("/api/events/{}/attendees/", event_id))
            .await
            .map_err(|e| not_found_as_event(e, event_id))
    }
}

fn not_found_as_event(err: VpassError, event_id: i64) -> VpassError {
    match err {
        VpassError::Api(ApiError::Server { status: 404, .. }) => VpassError::EventNotFound { event_id },
        other => other,
    }
}
