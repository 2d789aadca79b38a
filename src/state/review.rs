//! Certificate review screen
//!
//! Lets the attendee approve the generated certificate or ask for changes.
//! After an approval the screen sends the user back to the dashboard once
//! the redirect delay has passed.

use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, warn};

use crate::config::Settings;
use crate::models::{Attendance, CompletionStatus};
use crate::services::ServiceFactory;
use crate::utils::errors::{VpassError, Result};
use super::dialog::{Action, Notice};
use super::scheduler::{Navigation, ScheduledNavigation};

#[derive(Debug)]
pub struct CertificateReview {
    services: ServiceFactory,
    attendance: Attendance,
    status: Option<CompletionStatus>,
    redirect_delay: Duration,
    navigation_tx: UnboundedSender<Navigation>,
    pending_navigation: Option<ScheduledNavigation>,
    torn_down: bool,
}

impl CertificateReview {
    /// Load the attendance under review
    pub async fn open(
        services: ServiceFactory,
        settings: &Settings,
        attendance_id: i64,
    ) -> Result<(Self, UnboundedReceiver<Navigation>)> {
        let attendance = services.attendance_service.get_attendance(attendance_id).await?;
        let (navigation_tx, navigation_rx) = mpsc::unbounded_channel();

        let mut review = Self {
            services,
            attendance,
            status: None,
            redirect_delay: settings.redirect_delay(),
            navigation_tx,
            pending_navigation: None,
            torn_down: false,
        };

        if let Err(e) = review.refresh().await {
            warn!(attendance_id = attendance_id, error = %e, "Initial completion fetch failed");
        }

        Ok((review, navigation_rx))
    }

    pub fn attendance(&self) -> &Attendance {
        &self.attendance
    }

    pub fn status(&self) -> Option<CompletionStatus> {
        self.status
    }

    /// Generated, not yet approved
    pub fn can_approve(&self) -> bool {
        self.status
            .map(|s| s.certificate_ready && !s.certificate_approved)
            .unwrap_or_else(|| self.attendance.certificate_ready && !self.attendance.certificate_approved)
    }

    pub fn is_approved(&self) -> bool {
        self.status
            .map(|s| s.certificate_approved)
            .unwrap_or(self.attendance.certificate_approved)
    }

    pub fn has_pending_navigation(&self) -> bool {
        self.pending_navigation.as_ref().map_or(false, |nav| nav.is_pending())
    }

    fn ensure_active(&self) -> Result<()> {
        if self.torn_down {
            return Err(VpassError::InvalidStateTransition {
                from: "torn_down".to_string(),
                to: "active".to_string(),
            });
        }
        Ok(())
    }

    pub async fn refresh(&mut self) -> Result<CompletionStatus> {
        self.ensure_active()?;
        let status = self
            .services
            .attendance_service
            .check_completion(self.attendance.id)
            .await?;
        self.status = Some(status);
        Ok(status)
    }

    /// Approve, then schedule the return to the dashboard
    pub async fn approve(&mut self) -> Result<Notice> {
        self.ensure_active()?;
        if !self.can_approve() {
            return Err(VpassError::InvalidStateTransition {
                from: if self.is_approved() { "approved" } else { "not_generated" }.to_string(),
                to: "approved".to_string(),
            });
        }

        let detail = self
            .services
            .attendance_service
            .approve_certificate(self.attendance.id)
            .await?;

        if let Err(e) = self.refresh().await {
            warn!(attendance_id = self.attendance.id, error = %e, "Completion fetch after approval failed");
        }

        if !self.has_pending_navigation() {
            self.pending_navigation = Some(ScheduledNavigation::schedule(
                Navigation::Dashboard,
                self.redirect_delay,
                self.navigation_tx.clone(),
            ));
        }

        Ok(Notice::new(Action::ApproveCertificate, detail))
    }

    /// Ask the backend for changes to the certificate
    pub async fn request_modification(&mut self, modifications: &str) -> Result<Notice> {
        self.ensure_active()?;
        let detail = self
            .services
            .attendance_service
            .request_modification(self.attendance.id, modifications)
            .await?;

        if let Err(e) = self.refresh().await {
            warn!(attendance_id = self.attendance.id, error = %e, "Completion fetch after modification request failed");
        }

        Ok(Notice::new(Action::RequestModification, detail))
    }

    pub async fn download(&self, dir: &Path) -> Result<PathBuf> {
        self.ensure_active()?;
        self.services
            .attendance_service
            .download_certificate_to(self.attendance.id, dir, self.attendance.event_title.as_deref())
            .await
    }

    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;
        if let Some(mut nav) = self.pending_navigation.take() {
            nav.cancel();
        }
        debug!(attendance_id = self.attendance.id, "Review screen torn down");
    }
}

impl Drop for CertificateReview {
    fn drop(&mut self) {
        self.teardown();
    }
}
