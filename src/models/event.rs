//! Event model

use std::fmt;
use std::str::FromStr;
use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};

use crate::utils::errors::VpassError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    #[serde(default)]
    pub category: EventCategory,
    /// 0 or absent means unlimited
    #[serde(default)]
    pub max_capacity: Option<u32>,
    #[serde(default)]
    pub semester: Semester,
    #[serde(default)]
    pub academic_year: Option<String>,
    #[serde(default = "default_template")]
    pub certificate_template: String,
    #[serde(default)]
    pub recurrence: Recurrence,
    #[serde(default)]
    pub recurrence_end_date: Option<DateTime<Utc>>,
    /// Path of the QR code image, relative to the API base URL
    #[serde(default)]
    pub qr_code: Option<String>,
    /// Computed by the backend from start/end
    #[serde(default)]
    pub status: Option<EventStatus>,
    #[serde(default)]
    pub created_by: Option<i64>,
}

fn default_template() -> String {
    "default".to_string()
}

impl Event {
    /// Whether the event caps attendance (0 means unlimited)
    pub fn has_capacity_limit(&self) -> bool {
        self.max_capacity.map_or(false, |cap| cap > 0)
    }
}

/// Body of `POST /api/events/` and `PUT /api/events/:id/`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventRequest {
    pub title: String,
    pub description: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub category: EventCategory,
    pub max_capacity: u32,
    pub certificate_template: String,
    pub recurrence: Recurrence,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recurrence_end_date: Option<DateTime<Utc>>,
    pub semester: Semester,
    pub academic_year: String,
}

impl EventRequest {
    pub fn new(title: impl Into<String>, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            start,
            end,
            category: EventCategory::Other,
            max_capacity: 0,
            certificate_template: default_template(),
            recurrence: Recurrence::None,
            recurrence_end_date: None,
            semester: Semester::None,
            academic_year: String::new(),
        }
    }

    /// Check the form before it is sent
    pub fn validate(&self) -> Result<(), VpassError> {
        if self.title.trim().is_empty() {
            return Err(VpassError::InvalidInput("Event title is required".to_string()));
        }
        if self.end <= self.start {
            return Err(VpassError::InvalidInput("Event end must be after its start".to_string()));
        }
        if self.recurrence != Recurrence::None {
            match self.recurrence_end_date {
                Some(until) if until > self.start => {}
                Some(_) => {
                    return Err(VpassError::InvalidInput(
                        "Recurrence end date must be after the event start".to_string(),
                    ))
                }
                None => {
                    return Err(VpassError::InvalidInput(
                        "Recurring events need a recurrence end date".to_string(),
                    ))
                }
            }
        }
        Ok(())
    }
}

impl From<&Event> for EventRequest {
    fn from(event: &Event) -> Self {
        Self {
            title: event.title.clone(),
            description: event.description.clone(),
            start: event.start,
            end: event.end,
            category: event.category,
            max_capacity: event.max_capacity.unwrap_or(0),
            certificate_template: event.certificate_template.clone(),
            recurrence: event.recurrence,
            recurrence_end_date: event.recurrence_end_date,
            semester: event.semester,
            academic_year: event.academic_year.clone().unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    Upcoming,
    Ongoing,
    Completed,
}

impl EventStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventStatus::Upcoming => "upcoming",
            EventStatus::Ongoing => "ongoing",
            EventStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for EventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventStatus {
    type Err = VpassError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "upcoming" => Ok(EventStatus::Upcoming),
            "ongoing" => Ok(EventStatus::Ongoing),
            "completed" => Ok(EventStatus::Completed),
            other => Err(VpassError::InvalidInput(format!(
                "Unknown event status: {}. Expected upcoming, ongoing or completed",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EventCategory {
    Seminar,
    Workshop,
    Conference,
    Training,
    Meeting,
    #[default]
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Semester {
    #[serde(rename = "1ST")]
    First,
    #[serde(rename = "2ND")]
    Second,
    #[serde(rename = "SUMMER")]
    Summer,
    #[default]
    #[serde(rename = "NONE", other)]
    None,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Recurrence {
    Daily,
    Weekly,
    Monthly,
    #[default]
    #[serde(other)]
    None,
}
