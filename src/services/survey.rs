//! Survey service implementation

use tracing::{debug, info};

use crate::models::{
    Survey, SurveyAnswers, SurveyRequest, SurveyResponse, SurveyResponseRequest, SurveyResults,
};
use crate::utils::errors::Result;
use crate::utils::logging::log_attendance_action;
use super::api::ApiClient;

/// Survey service for surveys and survey responses
#[derive(Clone, Debug)]
pub struct SurveyService {
    api: ApiClient,
}

impl SurveyService {
    /// Create a new SurveyService instance
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Surveys attached to an event, in backend order
    pub async fn surveys_for_event(&self, event_id: i64) -> Result<Vec<Survey>> {
        let surveys: Vec<Survey> = self
            .api
            .get_json(&format!("/api/surveys/by_event/?event_id={}", event_id))
            .await?;
        debug!(event_id = event_id, count = surveys.len(), "Fetched surveys");
        Ok(surveys)
    }

    pub async fn get_survey(&self, survey_id: i64) -> Result<Survey> {
        self.api.get_json(&format!("/api/surveys/{}/", survey_id)).await
    }

    /// Create a survey for an event (admin)
    pub async fn create_survey(&self, request: &SurveyRequest) -> Result<Survey> {
        request.validate()?;
        let survey: Survey = self.api.post_json("/api/surveys/", request).await?;
        info!(survey_id = survey.id, event_id = survey.event, "Survey created");
        Ok(survey)
    }

    /// Replace the title and questions of a survey (admin)
    pub async fn update_survey(&self, survey_id: i64, request: &SurveyRequest) -> Result<Survey> {
        request.validate()?;
        let survey: Survey = self
            .api
            .put_json(&format!("/api/surveys/{}/", survey_id), request)
            .await?;
        info!(survey_id = survey.id, "Survey updated");
        Ok(survey)
    }

    pub async fn responses_for(&self, survey_id: i64) -> Result<Vec<SurveyResponse>> {
        let responses: Vec<SurveyResponse> = self
            .api
            .get_json(&format!("/api/survey-responses/?survey={}", survey_id))
            .await?;
        debug!(survey_id = survey_id, count = responses.len(), "Fetched survey responses");
        Ok(responses)
    }

    /// A survey and its responses, fetched together (admin)
    pub async fn results(&self, survey_id: i64) -> Result<SurveyResults> {
        let (survey, responses) = futures::join!(self.get_survey(survey_id), self.responses_for(survey_id));
        Ok(SurveyResults {
            survey: survey?,
            responses: responses?,
        })
    }

    /// Submit the answers of one attendance; the response body is ignored
    pub async fn submit_response(&self, attendance_id: i64, survey_id: i64, answers: SurveyAnswers) -> Result<()> {
        let request = SurveyResponseRequest {
            attendance: attendance_id,
            survey: survey_id,
            answers,
        };
        self.api.post_discard("/api/survey-responses/", &request).await?;
        log_attendance_action(attendance_id, "survey_submitted", None);
        Ok(())
    }
}
