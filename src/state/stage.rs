//! Stage gate of the check-in flow
//!
//! Maps what is known about an attendance (whether it exists, the latest
//! completion snapshot, whether the survey has been loaded) to the single
//! stage the attendee should see.

use std::fmt;
use serde::{Deserialize, Serialize};

use crate::models::CompletionStatus;

/// Everything the stage gate looks at
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StageInput {
    pub has_attendance: bool,
    /// `None` until the first completion fetch succeeds
    pub status: Option<CompletionStatus>,
    pub survey_loaded: bool,
    /// The loaded survey has no questions
    pub survey_empty: bool,
}

/// One visible stage of the attendance workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// No attendance yet: show the time-in form
    TimeIn,
    /// Timed in, not out
    TimeOutPrompt,
    /// Survey required but not fetched yet
    LoadingSurvey,
    /// Survey required and available
    SurveyForm,
    /// Survey loaded but it has no questions yet
    SurveyEmpty,
    /// No survey required; the backend is generating the certificate
    GeneratingCertificate,
    /// Survey done, certificate not generated yet
    AwaitingCertificate,
    /// Certificate generated but not reviewed: redirect to the review screen
    ReviewRequired,
    /// Certificate approved: download, email, print
    CertificateReady,
    /// Reviewed but not approved (modification requested)
    PendingReview,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::TimeIn => "time_in",
            Stage::TimeOutPrompt => "time_out_prompt",
            Stage::LoadingSurvey => "loading_survey",
            Stage::SurveyForm => "survey_form",
            Stage::SurveyEmpty => "survey_empty",
            Stage::GeneratingCertificate => "generating_certificate",
            Stage::AwaitingCertificate => "awaiting_certificate",
            Stage::ReviewRequired => "review_required",
            Stage::CertificateReady => "certificate_ready",
            Stage::PendingReview => "pending_review",
        }
    }

    /// Whether entering this stage schedules navigation to the review screen
    pub fn redirects_to_review(&self) -> bool {
        matches!(self, Stage::ReviewRequired)
    }

    /// Whether a later status fetch can move the attendee forward on its own
    pub fn awaits_backend(&self) -> bool {
        matches!(self, Stage::GeneratingCertificate | Stage::AwaitingCertificate)
    }

    /// Step shown on the 4-step progress bar
    pub fn progress_step(&self) -> u8 {
        match self {
            Stage::TimeIn => 1,
            Stage::TimeOutPrompt => 2,
            Stage::LoadingSurvey | Stage::SurveyForm | Stage::SurveyEmpty => 3,
            Stage::GeneratingCertificate | Stage::AwaitingCertificate => 3,
            Stage::ReviewRequired | Stage::CertificateReady | Stage::PendingReview => 4,
        }
    }

    /// One-line description for display
    pub fn headline(&self) -> &'static str {
        match self {
            Stage::TimeIn => "Step 1: Time in to this event",
            Stage::TimeOutPrompt => "Step 2: Time out when the event is over",
            Stage::LoadingSurvey => "Step 3: Loading survey...",
            Stage::SurveyForm => "Step 3: Complete the survey",
            Stage::SurveyEmpty => "Step 3: No survey questions available for this event yet",
            Stage::GeneratingCertificate => "All tasks complete! No survey required for this event. Generating your certificate...",
            Stage::AwaitingCertificate => "Survey received. Your certificate is being generated...",
            Stage::ReviewRequired => "Your certificate is ready for review. Redirecting to the review screen...",
            Stage::CertificateReady => "Congratulations! Your certificate is ready.",
            Stage::PendingReview => "Your certificate is pending review.",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Select the stage for `input`. First matching rule wins.
pub fn select_stage(input: &StageInput) -> Stage {
    if !input.has_attendance {
        return Stage::TimeIn;
    }

    let status = match input.status {
        Some(status) if status.time_out => status,
        _ => return Stage::TimeOutPrompt,
    };

    if !status.survey_completed {
        return match (status.event_has_survey, input.survey_loaded, input.survey_empty) {
            (true, false, _) => Stage::LoadingSurvey,
            (true, true, true) => Stage::SurveyEmpty,
            (true, true, false) => Stage::SurveyForm,
            (false, _, _) => Stage::GeneratingCertificate,
        };
    }

    match (status.certificate_ready, status.certificate_reviewed, status.certificate_approved) {
        (false, _, _) => Stage::AwaitingCertificate,
        (true, false, _) => Stage::ReviewRequired,
        (true, true, true) => Stage::CertificateReady,
        (true, true, false) => Stage::PendingReview,
    }
}
