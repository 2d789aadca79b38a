//! Mock VPass backend for testing
//!
//! Wraps a wiremock server with one setup method per backend endpoint the
//! client talks to.

use serde_json::{json, Value};
use wiremock::{
    matchers::{body_partial_json, header_exists, method, path, query_param},
    Mock, MockServer, ResponseTemplate,
};

pub struct BackendMockServer {
    pub server: MockServer,
}

impl BackendMockServer {
    pub async fn new() -> Self {
        Self { server: MockServer::start().await }
    }

    pub fn uri(&self) -> String {
        self.server.uri()
    }

    /// Requests received for `method_name path_name`
    pub async fn received(&self, method_name: &str, path_name: &str) -> usize {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter(|r| r.method.as_str() == method_name && r.url.path() == path_name)
            .count()
    }

    pub async fn mock_login(&self, token: &str, refresh: Option<&str>, user: Value) {
        Mock::given(method("POST"))
            .and(path("/api/auth/login/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "token": token,
                "refresh": refresh,
                "user": user,
            })))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_login_failure(&self, status: u16, detail: &str) {
        Mock::given(method("POST"))
            .and(path("/api/auth/login/"))
            .respond_with(ResponseTemplate::new(status).set_body_json(json!({ "detail": detail })))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_register(&self, token: &str, user: Value) {
        Mock::given(method("POST"))
            .and(path("/api/auth/register/"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "token": token,
                "user": user,
            })))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_verify(&self, status: u16, body: Value) {
        Mock::given(method("POST"))
            .and(path("/api/token/verify/"))
            .respond_with(ResponseTemplate::new(status).set_body_json(body))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_refresh(&self, refresh: &str, access: &str) {
        Mock::given(method("POST"))
            .and(path("/api/token/refresh/"))
            .and(body_partial_json(json!({ "refresh": refresh })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "access": access })))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_refresh_failure(&self) {
        Mock::given(method("POST"))
            .and(path("/api/token/refresh/"))
            .respond_with(
                ResponseTemplate::new(401).set_body_json(json!({ "detail": "Token is invalid or expired" })),
            )
            .mount(&self.server)
            .await;
    }

    pub async fn mock_events(&self, events: Value) {
        Mock::given(method("GET"))
            .and(path("/api/events/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(events))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_events_by_status(&self, status: &str, events: Value) {
        Mock::given(method("GET"))
            .and(path("/api/events/filter_by_status/"))
            .and(query_param("status", status))
            .respond_with(ResponseTemplate::new(200).set_body_json(events))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_event(&self, event: Value) {
        let id = event["id"].as_i64().unwrap_or_default();
        Mock::given(method("GET"))
            .and(path(format!("/api/events/{}/", id)))
            .respond_with(ResponseTemplate::new(200).set_body_json(event))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_event_missing(&self, event_id: i64) {
        Mock::given(method("GET"))
            .and(path(format!("/api/events/{}/", event_id)))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "detail": "Not found." })))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_create_event(&self, created: Value) {
        Mock::given(method("POST"))
            .and(path("/api/events/"))
            .and(header_exists("authorization"))
            .respond_with(ResponseTemplate::new(201).set_body_json(created))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_delete_event(&self, event_id: i64) {
        Mock::given(method("DELETE"))
            .and(path(format!("/api/events/{}/", event_id)))
            .respond_with(ResponseTemplate::new(204))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_attendees(&self, event_id: i64, attendances: Value) {
        Mock::given(method("GET"))
            .and(path(format!("/api/events/{}/attendees/", event_id)))
            .respond_with(ResponseTemplate::new(200).set_body_json(attendances))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_time_in(&self, attendance: Value) {
        Mock::given(method("POST"))
            .and(path("/api/attendances/time_in/"))
            .respond_with(ResponseTemplate::new(201).set_body_json(attendance))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_time_in_failure(&self, status: u16, body: Value) {
        Mock::given(method("POST"))
            .and(path("/api/attendances/time_in/"))
            .respond_with(ResponseTemplate::new(status).set_body_json(body))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_time_out(&self, attendance: Value) {
        let id = attendance["id"].as_i64().unwrap_or_default();
        Mock::given(method("POST"))
            .and(path(format!("/api/attendances/{}/time_out/", id)))
            .respond_with(ResponseTemplate::new(200).set_body_json(attendance))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_attendance(&self, attendance: Value) {
        let id = attendance["id"].as_i64().unwrap_or_default();
        Mock::given(method("GET"))
            .and(path(format!("/api/attendances/{}/", id)))
            .respond_with(ResponseTemplate::new(200).set_body_json(attendance))
            .mount(&self.server)
            .await;
    }

    /// Completion snapshot; with `times` the mock answers only that many requests
    pub async fn mock_completion(&self, attendance_id: i64, status: Value, times: Option<u64>) {
        let mock = Mock::given(method("GET"))
            .and(path(format!("/api/attendances/{}/check_completion/", attendance_id)))
            .respond_with(ResponseTemplate::new(200).set_body_json(status));
        let mock = match times {
            Some(n) => mock.up_to_n_times(n),
            None => mock,
        };
        mock.mount(&self.server).await;
    }

    pub async fn mock_completion_failure(&self, attendance_id: i64, status: u16) {
        Mock::given(method("GET"))
            .and(path(format!("/api/attendances/{}/check_completion/", attendance_id)))
            .respond_with(ResponseTemplate::new(status))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_surveys(&self, event_id: i64, surveys: Value) {
        Mock::given(method("GET"))
            .and(path("/api/surveys/by_event/"))
            .and(query_param("event_id", event_id.to_string()))
            .respond_with(ResponseTemplate::new(200).set_body_json(surveys))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_survey_response(&self) {
        Mock::given(method("POST"))
            .and(path("/api/survey-responses/"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": 1 })))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_approve(&self, attendance_id: i64) {
        Mock::given(method("POST"))
            .and(path(format!("/api/attendances/{}/approve_certificate/", attendance_id)))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "detail": "Certificate approved successfully" })),
            )
            .mount(&self.server)
            .await;
    }

    pub async fn mock_modification(&self, attendance_id: i64) {
        Mock::given(method("POST"))
            .and(path(format!("/api/attendances/{}/request_certificate_modification/", attendance_id)))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "detail": "Modification request submitted" })),
            )
            .mount(&self.server)
            .await;
    }

    pub async fn mock_download(&self, attendance_id: i64, bytes: &[u8]) {
        Mock::given(method("GET"))
            .and(path(format!("/api/attendances/{}/download_certificate/", attendance_id)))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "application/pdf")
                    .set_body_bytes(bytes.to_vec()),
            )
            .mount(&self.server)
            .await;
    }

    pub async fn mock_email(&self, attendance_id: i64) {
        Mock::given(method("POST"))
            .and(path(format!("/api/attendances/{}/email_certificate/", attendance_id)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "detail": "Certificate sent" })))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_attendances_for_email(&self, email: &str, attendances: Value) {
        Mock::given(method("GET"))
            .and(path("/api/attendances/"))
            .and(query_param("attendee__email", email))
            .respond_with(ResponseTemplate::new(200).set_body_json(attendances))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_password_reset(&self, email: &str) {
        Mock::given(method("POST"))
            .and(path("/api/auth/password-reset/"))
            .and(body_partial_json(json!({ "email": email })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_create_survey(&self, created: Value) {
        Mock::given(method("POST"))
            .and(path("/api/surveys/"))
            .respond_with(ResponseTemplate::new(201).set_body_json(created))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_update_survey(&self, survey_id: i64, updated: Value) {
        Mock::given(method("PUT"))
            .and(path(format!("/api/surveys/{}/", survey_id)))
            .respond_with(ResponseTemplate::new(200).set_body_json(updated))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_survey(&self, survey: Value) {
        let survey_id = survey["id"].as_i64().unwrap_or_default();
        Mock::given(method("GET"))
            .and(path(format!("/api/surveys/{}/", survey_id)))
            .respond_with(ResponseTemplate::new(200).set_body_json(survey))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_survey_responses(&self, survey_id: i64, responses: Value) {
        Mock::given(method("GET"))
            .and(path("/api/survey-responses/"))
            .and(query_param("survey", survey_id.to_string()))
            .respond_with(ResponseTemplate::new(200).set_body_json(responses))
            .mount(&self.server)
            .await;
    }
}
