//! Attendance model

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};

use crate::utils::errors::VpassError;
use crate::utils::helpers::is_valid_email;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attendee {
    pub full_name: String,
    pub email: String,
    #[serde(default)]
    pub student_id: Option<String>,
}

impl Attendee {
    pub fn new(full_name: impl Into<String>, email: impl Into<String>, student_id: Option<String>) -> Self {
        Self {
            full_name: full_name.into(),
            email: email.into(),
            student_id: student_id.filter(|id| !id.trim().is_empty()),
        }
    }

    /// Time-in form rules: name and email required, student id optional
    pub fn validate(&self) -> Result<(), VpassError> {
        if self.full_name.trim().is_empty() {
            return Err(VpassError::InvalidInput("Full name is required".to_string()));
        }
        if self.email.trim().is_empty() {
            return Err(VpassError::InvalidInput("Email is required".to_string()));
        }
        if !is_valid_email(&self.email) {
            return Err(VpassError::InvalidInput(format!("Invalid email address: {}", self.email)));
        }
        if let Some(student_id) = &self.student_id {
            if student_id.chars().count() > 20 {
                return Err(VpassError::InvalidInput(
                    "Student ID cannot exceed 20 characters".to_string(),
                ));
            }
        }
        Ok(())
    }
}

/// One attendee's participation in one event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attendance {
    pub id: i64,
    pub event: i64,
    #[serde(default)]
    pub attendee: Option<Attendee>,
    #[serde(default, alias = "timestamp")]
    pub time_in: Option<DateTime<Utc>>,
    #[serde(default)]
    pub time_out: Option<DateTime<Utc>>,
    #[serde(default)]
    pub survey_completed: bool,
    #[serde(default)]
    pub certificate_ready: bool,
    #[serde(default)]
    pub certificate_approved: bool,
    #[serde(default)]
    pub certificate_reviewed: bool,
    #[serde(default)]
    pub event_title: Option<String>,
}

impl Attendance {
    pub fn attendee_email(&self) -> Option<&str> {
        self.attendee.as_ref().map(|a| a.email.as_str())
    }

    pub fn attendee_name(&self) -> &str {
        self.attendee
            .as_ref()
            .map(|a| a.full_name.as_str())
            .unwrap_or("Attendee")
    }

    /// Whether the certificate can be downloaded or emailed
    pub fn certificate_available(&self) -> bool {
        self.certificate_ready && self.certificate_reviewed && self.certificate_approved
    }
}

/// Body of `POST /api/attendances/time_in/`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeInRequest {
    pub event_id: i64,
    pub attendee: Attendee,
}

/// Snapshot returned by `GET /api/attendances/:id/check_completion/`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompletionStatus {
    pub time_out: bool,
    pub survey_completed: bool,
    pub event_has_survey: bool,
    pub certificate_ready: bool,
    pub certificate_reviewed: bool,
    pub certificate_approved: bool,
}

impl CompletionStatus {
    /// Flags that only ever move from false to true, paired with their names
    pub fn progress_flags(&self) -> [(&'static str, bool); 5] {
        [
            ("time_out", self.time_out),
            ("survey_completed", self.survey_completed),
            ("certificate_ready", self.certificate_ready),
            ("certificate_reviewed", self.certificate_reviewed),
            ("certificate_approved", self.certificate_approved),
        ]
    }

    /// Every stage satisfied and the certificate approved
    pub fn is_complete(&self) -> bool {
        self.progress_flags().iter().all(|(_, set)| *set)
    }
}

/// Body of `POST /api/attendances/:id/request_certificate_modification/`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModificationRequest {
    pub modifications: String,
}
