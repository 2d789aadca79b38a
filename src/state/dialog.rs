//! Confirmation and failure messages of the action dispatchers

use std::fmt;
use serde::Serialize;

use crate::utils::errors::{ApiError, VpassError};

/// Confirmation shown after a successful action
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub action: Action,
    pub message: String,
}

impl Notice {
    pub fn new(action: Action, message: impl Into<String>) -> Self {
        Self { action, message: message.into() }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// User-triggered actions that talk to the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Login,
    Register,
    TimeIn,
    TimeOut,
    SubmitSurvey,
    ApproveCertificate,
    RequestModification,
    DownloadCertificate,
    EmailCertificate,
    SaveEvent,
    DeleteEvent,
    CreateSurvey,
    UpdateSurvey,
    PasswordReset,
}

impl Action {
    /// Generic message used when the backend gave no detail
    pub fn failure_message(&self) -> &'static str {
        match self {
            Action::Login => "Login failed",
            Action::Register => "Registration failed",
            Action::TimeIn => "Time in failed",
            Action::TimeOut => "Failed to time out",
            Action::SubmitSurvey => "Failed to submit survey",
            Action::ApproveCertificate => "Failed to approve certificate",
            Action::RequestModification => "Failed to request modification",
            Action::DownloadCertificate => "Failed to download certificate",
            Action::EmailCertificate => "Failed to send certificate",
            Action::SaveEvent => "Failed to save event",
            Action::DeleteEvent => "Failed to delete event",
            Action::CreateSurvey => "Failed to create survey",
            Action::UpdateSurvey => "Failed to update survey",
            Action::PasswordReset => "Failed to request a password reset",
        }
    }
}

/// Text of the error dialog for a failed `action`
pub fn alert_text(action: Action, err: &VpassError) -> String {
    match err {
        VpassError::Api(ApiError::Network(_)) | VpassError::Api(ApiError::Timeout) => {
            "Network error. Please try again.".to_string()
        }
        other => other.user_message(action.failure_message()),
    }
}
