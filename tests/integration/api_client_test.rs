//! Integration tests for the HTTP client error mapping

use assert_matches::assert_matches;
use serde_json::json;
use serial_test::serial;
use vpass::services::ServiceFactory;
use vpass::{ApiError, VpassError};
use wiremock::matchers::{header, header_exists, method, path};
use wiremock::{Mock, ResponseTemplate};

use crate::helpers::*;

#[tokio::test]
#[serial]
async fn test_requests_carry_bearer_token_and_request_id() {
    let ctx = TestContext::new().await;
    Mock::given(method("GET"))
        .and(path("/api/events/"))
        .and(header("authorization", "Bearer test-token"))
        .and(header_exists("x-request-id"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&ctx.backend.server)
        .await;

    let services = ctx.signed_in_services();
    assert!(services.event_service.list_events().await.unwrap().is_empty());
}

#[tokio::test]
#[serial]
async fn test_unauthorized_is_distinguished() {
    let ctx = TestContext::new().await;
    Mock::given(method("GET"))
        .and(path("/api/events/"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(json!({ "detail": "Authentication credentials were not provided." })),
        )
        .mount(&ctx.backend.server)
        .await;

    let err = ctx.services().event_service.list_events().await.unwrap_err();
    assert!(err.is_unauthorized());
    assert_matches!(err, VpassError::Api(ApiError::Unauthorized { detail: Some(_) }));
}

#[tokio::test]
#[serial]
async fn test_field_errors_become_detail() {
    let ctx = TestContext::new().await;
    ctx.backend
        .mock_time_in_failure(400, json!({ "email": ["Enter a valid email address."] }))
        .await;

    let err = ctx
        .signed_in_services()
        .attendance_service
        .time_in(EVENT_ID, random_attendee())
        .await
        .unwrap_err();
    assert_eq!(err.user_message("Time in failed"), "email: Enter a valid email address.");
}

#[tokio::test]
#[serial]
async fn test_malformed_body_is_reported() {
    let ctx = TestContext::new().await;
    Mock::given(method("GET"))
        .and(path(format!("/api/attendances/{}/check_completion/", ATTENDANCE_ID)))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&ctx.backend.server)
        .await;

    let err = ctx
        .signed_in_services()
        .attendance_service
        .check_completion(ATTENDANCE_ID)
        .await
        .unwrap_err();
    assert_matches!(err, VpassError::Api(ApiError::MalformedResponse(_)));
}

#[tokio::test]
#[serial]
async fn test_unreachable_backend_is_a_network_error() {
    let mut ctx = TestContext::new().await;
    // Nothing listens on the discard port
    ctx.settings.api.base_url = "http://127.0.0.1:9".to_string();
    let services = ServiceFactory::new(&ctx.settings).unwrap();

    let err = services.event_service.list_events().await.unwrap_err();
    assert_matches!(err, VpassError::Api(ApiError::Network(_)) | VpassError::Api(ApiError::Timeout));
    assert!(err.is_recoverable());
}
