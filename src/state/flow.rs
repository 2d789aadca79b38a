//! Check-in flow of one attendee at one event
//!
//! Holds the local view state (event, attendance, survey, last completion
//! snapshot) and drives it through the backend: every mutating action is
//! followed by a fresh completion fetch and the stage is re-selected from
//! the newest snapshot. Nothing is updated optimistically, so a failed
//! action leaves the flow exactly as it was.

use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info, warn};

use crate::config::Settings;
use crate::models::{Attendance, Attendee, CompletionStatus, Event, Survey};
use crate::services::ServiceFactory;
use crate::utils::errors::{VpassError, Result};
use crate::utils::logging::log_stage_transition;
use super::dialog::{Action, Notice};
use super::monitor::{MonotonicPolicy, StatusAnomaly, StatusMonitor};
use super::scheduler::{Navigation, ScheduledNavigation};
use super::stage::{select_stage, Stage, StageInput};

#[derive(Debug)]
pub struct CheckInFlow {
    services: ServiceFactory,
    event: Event,
    attendance: Option<Attendance>,
    survey: Option<Survey>,
    status: Option<CompletionStatus>,
    stage: Stage,
    monitor: StatusMonitor,
    redirect_delay: Duration,
    navigation_tx: UnboundedSender<Navigation>,
    pending_navigation: Option<ScheduledNavigation>,
    torn_down: bool,
}

impl CheckInFlow {
    /// Load the event and start at the time-in stage.
    ///
    /// The receiver yields the navigations the flow schedules.
    pub async fn open(
        services: ServiceFactory,
        settings: &Settings,
        event_id: i64,
    ) -> Result<(Self, UnboundedReceiver<Navigation>)> {
        let event = services.event_service.get_event(event_id).await?;
        info!(event_id = event.id, title = %event.title, "Check-in flow opened");
        Ok(Self::with_event(services, settings, event))
    }

    /// Start a flow for an already loaded event
    pub fn with_event(
        services: ServiceFactory,
        settings: &Settings,
        event: Event,
    ) -> (Self, UnboundedReceiver<Navigation>) {
        let (navigation_tx, navigation_rx) = mpsc::unbounded_channel();
        let flow = Self {
            services,
            event,
            attendance: None,
            survey: None,
            status: None,
            stage: Stage::TimeIn,
            monitor: StatusMonitor::new(MonotonicPolicy::from_strict(settings.flow.strict_monotonic)),
            redirect_delay: settings.redirect_delay(),
            navigation_tx,
            pending_navigation: None,
            torn_down: false,
        };
        (flow, navigation_rx)
    }

    /// Continue with an attendance recorded earlier
    pub async fn resume(&mut self, attendance_id: i64) -> Result<Stage> {
        self.ensure_active()?;
        let attendance = self.services.attendance_service.get_attendance(attendance_id).await?;
        if attendance.event != self.event.id {
            return Err(VpassError::InvalidInput(format!(
                "Attendance {} belongs to event {}, not {}",
                attendance_id, attendance.event, self.event.id
            )));
        }
        self.adopt_attendance(attendance);
        self.refresh().await
    }

    pub fn event(&self) -> &Event {
        &self.event
    }

    pub fn attendance(&self) -> Option<&Attendance> {
        self.attendance.as_ref()
    }

    pub fn survey(&self) -> Option<&Survey> {
        self.survey.as_ref()
    }

    pub fn status(&self) -> Option<CompletionStatus> {
        self.status
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn anomalies(&self) -> &[StatusAnomaly] {
        self.monitor.anomalies()
    }

    /// Whether a navigation is scheduled and has not fired yet
    pub fn has_pending_navigation(&self) -> bool {
        self.pending_navigation.as_ref().map_or(false, |nav| nav.is_pending())
    }

    fn attendance_id(&self) -> Result<i64> {
        self.attendance.as_ref().map(|a| a.id).ok_or(VpassError::NoAttendance)
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

    fn expect_stage(&self, allowed: &[Stage], to: &str) -> Result<()> {
        self.ensure_active()?;
        if allowed.contains(&self.stage) {
            Ok(())
        } else {
            Err(VpassError::InvalidStateTransition {
                from: self.stage.to_string(),
                to: to.to_string(),
            })
        }
    }

    fn adopt_attendance(&mut self, attendance: Attendance) {
        if self.attendance.as_ref().map(|a| a.id) != Some(attendance.id) {
            self.monitor.reset();
            self.status = None;
        }
        self.attendance = Some(attendance);
        self.apply_stage();
    }

    /// Time in; on success the returned attendance becomes local state
    pub async fn time_in(&mut self, attendee: Attendee) -> Result<Notice> {
        self.expect_stage(&[Stage::TimeIn], "time_in")?;

        let attendance = self
            .services
            .attendance_service
            .time_in(self.event.id, attendee)
            .await?;
        self.adopt_attendance(attendance);

        // The time-in itself succeeded; a failed follow-up fetch only leaves the stage as is
        if let Err(e) = self.refresh().await {
            warn!(error = %e, "Completion fetch after time in failed");
        }

        Ok(Notice::new(Action::TimeIn, "Time in successful!"))
    }

    /// Time out, then re-fetch completion status
    pub async fn time_out(&mut self) -> Result<Notice> {
        self.expect_stage(&[Stage::TimeOutPrompt], "time_out")?;
        let attendance_id = self.attendance_id()?;

        let updated = self.services.attendance_service.time_out(attendance_id).await?;
        self.attendance = Some(updated);

        if let Err(e) = self.refresh().await {
            warn!(error = %e, "Completion fetch after time out failed");
        }

        Ok(Notice::new(Action::TimeOut, "Time out successful! Please complete the survey."))
    }

    /// Submit answers (in question order) to the loaded survey
    pub async fn submit_survey(&mut self, raw_answers: &[String]) -> Result<Notice> {
        self.expect_stage(&[Stage::SurveyForm], "submit_survey")?;
        let attendance_id = self.attendance_id()?;
        let survey = self.survey.as_ref().ok_or_else(|| {
            VpassError::InvalidInput("No survey loaded for this event".to_string())
        })?;

        let answers = survey.build_answers(raw_answers)?;
        self.services
            .survey_service
            .submit_response(attendance_id, survey.id, answers)
            .await?;

        if let Err(e) = self.refresh().await {
            warn!(error = %e, "Completion fetch after survey failed");
        }

        Ok(Notice::new(Action::SubmitSurvey, "Survey submitted successfully!"))
    }

    /// Fetch completion status (and the survey, if still missing) and re-select the stage.
    ///
    /// On a failed status fetch the previous stage stays in place.
    pub async fn refresh(&mut self) -> Result<Stage> {
        self.ensure_active()?;
        let attendance_id = self.attendance_id()?;

        let attendances = &self.services.attendance_service;
        let surveys = &self.services.survey_service;
        // An empty survey is fetched again in case questions were added since
        let need_survey = self.survey.as_ref().map_or(true, |s| !s.has_questions());
        let event_id = self.event.id;

        let (status_result, survey_result) = futures::join!(
            attendances.check_completion(attendance_id),
            async move {
                if need_survey {
                    surveys.surveys_for_event(event_id).await.map(Some)
                } else {
                    Ok(None)
                }
            }
        );

        match survey_result {
            Ok(Some(found)) => {
                self.survey = found.into_iter().next();
            }
            Ok(None) => {}
            Err(e) => warn!(event_id = event_id, error = %e, "Failed to fetch surveys"),
        }

        let fetched = match status_result {
            Ok(status) => status,
            Err(e) => {
                warn!(attendance_id = attendance_id, error = %e, "Failed to check completion");
                self.apply_stage();
                return Err(e);
            }
        };

        let observed = self.monitor.observe(attendance_id, fetched);
        match observed {
            Ok((status, _)) => self.status = Some(status),
            Err(e) => {
                self.apply_stage();
                return Err(e);
            }
        }

        self.apply_stage();
        Ok(self.stage)
    }

    /// Re-fetch only if the current stage is waiting on the backend
    pub async fn poll(&mut self) -> Result<Stage> {
        if self.stage.awaits_backend() || matches!(self.stage, Stage::LoadingSurvey | Stage::SurveyEmpty) {
            self.refresh().await
        } else {
            Ok(self.stage)
        }
    }

    fn apply_stage(&mut self) {
        let next = select_stage(&StageInput {
            has_attendance: self.attendance.is_some(),
            status: self.status,
            survey_loaded: self.survey.is_some(),
            survey_empty: self.survey.as_ref().map_or(false, |s| !s.has_questions()),
        });

        let attendance_id = self.attendance.as_ref().map(|a| a.id);
        log_stage_transition(attendance_id, self.stage.as_str(), next.as_str());
        self.stage = next;

        if next.redirects_to_review() {
            let already_scheduled = self.pending_navigation.as_ref().map_or(false, |nav| {
                nav.is_pending() || nav.has_fired()
            });
            if let (false, Some(attendance_id)) = (already_scheduled, attendance_id) {
                self.pending_navigation = Some(ScheduledNavigation::schedule(
                    Navigation::CertificateReview { attendance_id },
                    self.redirect_delay,
                    self.navigation_tx.clone(),
                ));
            }
        } else if let Some(mut nav) = self.pending_navigation.take() {
            nav.cancel();
        }
    }

    /// Save the approved certificate into `dir`
    pub async fn download_certificate(&self, dir: &Path) -> Result<PathBuf> {
        self.expect_stage(&[Stage::CertificateReady], "download_certificate")?;
        self.services
            .attendance_service
            .download_certificate_to(self.attendance_id()?, dir, Some(&self.event.title))
            .await
    }

    /// Email the approved certificate to the attendee
    pub async fn email_certificate(&self) -> Result<Notice> {
        self.expect_stage(&[Stage::CertificateReady], "email_certificate")?;
        let attendance_id = self.attendance_id()?;
        let detail = self.services.attendance_service.email_certificate(attendance_id).await?;

        let message = match self.attendance.as_ref().and_then(|a| a.attendee_email()) {
            Some(email) => format!("Certificate sent successfully to {}", email),
            None => detail,
        };
        Ok(Notice::new(Action::EmailCertificate, message))
    }

    /// Cancel pending navigations; the flow accepts no further actions
    pub fn teardown(&mut self) {
        if let Some(mut nav) = self.pending_navigation.take() {
            nav.cancel();
        }
        self.torn_down = true;
        debug!(event_id = self.event.id, "Check-in flow torn down");
    }
}

impl Drop for CheckInFlow {
    fn drop(&mut self) {
        if !self.torn_down {
            self.teardown();
        }
    }
}
