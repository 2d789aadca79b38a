//! Integration tests for survey administration

use assert_matches::assert_matches;
use serde_json::json;
use serial_test::serial;
use vpass::models::{QuestionKind, SurveyRequest};
use vpass::VpassError;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, ResponseTemplate};

use crate::helpers::*;

fn feedback_request() -> SurveyRequest {
    SurveyRequest::new(
        EVENT_ID,
        "Post-event feedback",
        vec![
            ("How would you rate the event?".to_string(), QuestionKind::Rating),
            ("Would you attend again?".to_string(), QuestionKind::Yesno),
            ("Any comments?".to_string(), QuestionKind::Text),
        ],
    )
}

#[tokio::test]
#[serial]
async fn test_create_survey_sends_numbered_questions() {
    let ctx = TestContext::new().await;
    Mock::given(method("POST"))
        .and(path("/api/surveys/"))
        .and(body_partial_json(json!({
            "event": EVENT_ID,
            "is_active": true,
            "questions": [
                { "id": 1, "question": "How would you rate the event?", "type": "rating" },
                { "id": 2, "question": "Would you attend again?", "type": "yesno" },
                { "id": 3, "question": "Any comments?", "type": "text" },
            ],
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(surveys_json(EVENT_ID)[0].clone()))
        .expect(1)
        .mount(&ctx.backend.server)
        .await;

    let survey = ctx
        .signed_in_services()
        .survey_service
        .create_survey(&feedback_request())
        .await
        .unwrap();
    assert_eq!(survey.id, 5);
    assert_eq!(survey.questions.len(), 3);
}

#[tokio::test]
#[serial]
async fn test_invalid_survey_is_not_sent() {
    let ctx = TestContext::new().await;
    ctx.backend.mock_create_survey(surveys_json(EVENT_ID)[0].clone()).await;

    let empty = SurveyRequest::new(EVENT_ID, "Post-event feedback", vec![]);
    assert_matches!(
        ctx.signed_in_services().survey_service.create_survey(&empty).await,
        Err(VpassError::InvalidInput(_))
    );
    assert_eq!(ctx.backend.received("POST", "/api/surveys/").await, 0);
}

#[tokio::test]
#[serial]
async fn test_update_survey_replaces_it() {
    let ctx = TestContext::new().await;
    let mut updated = surveys_json(EVENT_ID)[0].clone();
    updated["title"] = json!("Revised feedback");
    ctx.backend.mock_update_survey(5, updated).await;

    let mut request = feedback_request();
    request.title = "Revised feedback".to_string();
    let survey = ctx
        .signed_in_services()
        .survey_service
        .update_survey(5, &request)
        .await
        .unwrap();

    assert_eq!(survey.title, "Revised feedback");
    assert_eq!(ctx.backend.received("PUT", "/api/surveys/5/").await, 1);
}

#[tokio::test]
#[serial]
async fn test_results_join_survey_and_responses() {
    let ctx = TestContext::new().await;
    let mut survey = surveys_json(EVENT_ID)[0].clone();
    survey["questions"] = json!([
        { "id": 1, "question": "How would you rate the event?", "type": "rating" },
        { "id": 2, "question": "Any comments?", "type": "text" },
    ]);
    ctx.backend.mock_survey(survey).await;
    ctx.backend
        .mock_survey_responses(
            5,
            json!([
                { "id": 1, "attendance": 40, "survey": 5, "answers": { "1": "5", "2": "Loved it" },
                  "submitted_at": "2024-05-01T12:30:00Z" },
                { "id": 2, "attendance": ATTENDANCE_ID, "survey": 5, "answers": { "0": "4" } },
            ]),
        )
        .await;

    let results = ctx.signed_in_services().survey_service.results(5).await.unwrap();
    assert_eq!(results.survey.title, "Post-event feedback");
    assert_eq!(results.responses.len(), 2);
    assert_eq!(results.answers_for(0), vec!["5", "4"]);
    assert_eq!(results.answers_for(1), vec!["Loved it"]);
}

#[tokio::test]
#[serial]
async fn test_results_for_missing_survey_fail() {
    let ctx = TestContext::new().await;
    Mock::given(method("GET"))
        .and(path("/api/surveys/77/"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "detail": "Not found." })))
        .mount(&ctx.backend.server)
        .await;
    ctx.backend.mock_survey_responses(77, json!([])).await;

    let err = ctx.signed_in_services().survey_service.results(77).await.unwrap_err();
    assert_eq!(err.user_message("Failed to load survey results"), "Not found.");
}
