//! Attendance service implementation
//!
//! Time-in/time-out dispatchers, the completion-status poll and the
//! certificate review actions of one attendance record.

use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::models::{
    Attendance, Attendee, CompletionStatus, DetailMessage, ModificationRequest, TimeInRequest,
};
use crate::utils::errors::{ApiError, VpassError, Result};
use crate::utils::helpers::{certificate_file_name, format_bytes};
use crate::utils::logging::log_attendance_action;
use super::api::ApiClient;

/// Attendance service for the attendances resource
#[derive(Clone, Debug)]
pub struct AttendanceService {
    api: ApiClient,
}

impl AttendanceService {
    /// Create a new AttendanceService instance
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Record a time-in; the backend creates the attendee if needed
    pub async fn time_in(&self, event_id: i64, attendee: Attendee) -> Result<Attendance> {
        attendee.validate()?;
        let request = TimeInRequest { event_id, attendee };
        let attendance: Attendance = self.api.post_json("/api/attendances/time_in/", &request).await?;
        log_attendance_action(attendance.id, "time_in", Some(&request.attendee.email));
        Ok(attendance)
    }

    /// Record a time-out
    pub async fn time_out(&self, attendance_id: i64) -> Result<Attendance> {
        let attendance: Attendance = self
            .api
            .post_empty(&format!("/api/attendances/{}/time_out/", attendance_id))
            .await?;
        log_attendance_action(attendance_id, "time_out", None);
        Ok(attendance)
    }

    /// Fetch a fresh completion snapshot
    pub async fn check_completion(&self, attendance_id: i64) -> Result<CompletionStatus> {
        let status: CompletionStatus = self
            .api
            .get_json(&format!("/api/attendances/{}/check_completion/", attendance_id))
            .await?;
        debug!(attendance_id = attendance_id, status = ?status, "Fetched completion status");
        Ok(status)
    }

    /// Fetch one attendance record
    pub async fn get_attendance(&self, attendance_id: i64) -> Result<Attendance> {
        self.api
            .get_json(&format!("/api/attendances/{}/", attendance_id))
            .await
    }

    /// Attendance records (and so certificates) of one attendee
    pub async fn list_for_email(&self, email: &str) -> Result<Vec<Attendance>> {
        let path = format!("/api/attendances/?attendee__email={}", urlencoding::encode(email));
        self.api.get_json(&path).await
    }

    /// Approve the generated certificate
    pub async fn approve_certificate(&self, attendance_id: i64) -> Result<String> {
        let message: DetailMessage = self
            .api
            .post_empty(&format!("/api/attendances/{}/approve_certificate/", attendance_id))
            .await?;
        log_attendance_action(attendance_id, "approve_certificate", None);
        Ok(message.or("Certificate approved"))
    }

    /// Ask for changes to the generated certificate
    pub async fn request_modification(&self, attendance_id: i64, modifications: &str) -> Result<String> {
        let modifications = modifications.trim();
        if modifications.is_empty() {
            return Err(VpassError::InvalidInput(
                "Please describe the modifications you need".to_string(),
            ));
        }

        let request = ModificationRequest { modifications: modifications.to_string() };
        let message: DetailMessage = self
            .api
            .post_json(
                &format!("/api/attendances/{}/request_certificate_modification/", attendance_id),
                &request,
            )
            .await?;
        log_attendance_action(attendance_id, "request_certificate_modification", Some(modifications));
        Ok(message.or("Modification request submitted"))
    }

    /// Download the certificate PDF
    pub async fn download_certificate(&self, attendance_id: i64) -> Result<Vec<u8>> {
        let bytes = self
            .api
            .get_bytes(&format!("/api/attendances/{}/download_certificate/", attendance_id))
            .await?;
        info!(attendance_id = attendance_id, size = %format_bytes(bytes.len() as u64), "Certificate downloaded");
        Ok(bytes)
    }

    /// Download the certificate PDF into `dir` and return the written path
    pub async fn download_certificate_to(
        &self,
        attendance_id: i64,
        dir: &Path,
        event_title: Option<&str>,
    ) -> Result<PathBuf> {
        let bytes = self.download_certificate(attendance_id).await?;
        if bytes.is_empty() {
            return Err(ApiError::MalformedResponse("certificate body is empty".to_string()).into());
        }

        tokio::fs::create_dir_all(dir).await?;
        let path = dir.join(certificate_file_name(event_title, attendance_id));
        tokio::fs::write(&path, &bytes).await?;
        info!(attendance_id = attendance_id, path = %path.display(), "Certificate saved");
        Ok(path)
    }

    /// Have the backend email the certificate to the attendee
    pub async fn email_certificate(&self, attendance_id: i64) -> Result<String> {
        let message: DetailMessage = self
            .api
            .post_empty(&format!("/api/attendances/{}/email_certificate/", attendance_id))
            .await?;
        log_attendance_action(attendance_id, "email_certificate", None);
        Ok(message.or("Certificate sent"))
    }
}
