//! Integration tests for the certificate review screen

use assert_matches::assert_matches;
use serial_test::serial;
use std::time::Duration;
use vpass::state::{CertificateReview, Navigation};
use vpass::VpassError;

use crate::helpers::*;

async fn mount_attendance(ctx: &TestContext) {
    ctx.backend
        .mock_attendance(attendance_json(ATTENDANCE_ID, EVENT_ID, &random_attendee()))
        .await;
}

#[tokio::test]
#[serial]
async fn test_approve_then_return_to_dashboard() {
    let ctx = TestContext::new().await;
    mount_attendance(&ctx).await;
    ctx.backend
        .mock_completion(ATTENDANCE_ID, status_json([true, true, true, true, false, false]), Some(1))
        .await;
    ctx.backend
        .mock_completion(ATTENDANCE_ID, status_json([true, true, true, true, true, true]), None)
        .await;
    ctx.backend.mock_approve(ATTENDANCE_ID).await;

    let (mut review, mut navigation) =
        CertificateReview::open(ctx.signed_in_services(), &ctx.settings, ATTENDANCE_ID)
            .await
            .unwrap();
    assert!(review.can_approve());

    let notice = review.approve().await.unwrap();
    assert_eq!(notice.message, "Certificate approved successfully");
    assert!(review.is_approved());
    assert!(!review.can_approve());

    let next = tokio::time::timeout(Duration::from_secs(2), navigation.recv())
        .await
        .expect("Dashboard navigation should fire");
    assert_eq!(next, Some(Navigation::Dashboard));

    // Approving twice is refused locally
    assert_matches!(review.approve().await, Err(VpassError::InvalidStateTransition { .. }));
    assert_eq!(
        ctx.backend
            .received("POST", &format!("/api/attendances/{}/approve_certificate/", ATTENDANCE_ID))
            .await,
        1
    );
}

#[tokio::test]
#[serial]
async fn test_teardown_after_approval_cancels_navigation() {
    let ctx = TestContext::with_redirect_delay(200).await;
    mount_attendance(&ctx).await;
    ctx.backend
        .mock_completion(ATTENDANCE_ID, status_json([true, true, true, true, false, false]), None)
        .await;
    ctx.backend.mock_approve(ATTENDANCE_ID).await;

    let (mut review, mut navigation) =
        CertificateReview::open(ctx.signed_in_services(), &ctx.settings, ATTENDANCE_ID)
            .await
            .unwrap();
    review.approve().await.unwrap();
    assert!(review.has_pending_navigation());

    review.teardown();
    tokio::time::sleep(Duration::from_millis(400)).await;
    assert!(navigation.try_recv().is_err());
}

#[tokio::test]
#[serial]
async fn test_request_modification_requires_text() {
    let ctx = TestContext::new().await;
    mount_attendance(&ctx).await;
    ctx.backend
        .mock_completion(ATTENDANCE_ID, status_json([true, true, true, true, false, false]), Some(1))
        .await;
    ctx.backend
        .mock_completion(ATTENDANCE_ID, status_json([true, true, true, true, true, false]), None)
        .await;
    ctx.backend.mock_modification(ATTENDANCE_ID).await;

    let (mut review, _navigation) =
        CertificateReview::open(ctx.signed_in_services(), &ctx.settings, ATTENDANCE_ID)
            .await
            .unwrap();

    assert_matches!(review.request_modification("   ").await, Err(VpassError::InvalidInput(_)));

    let notice = review.request_modification("Please fix the spelling of my name").await.unwrap();
    assert_eq!(notice.message, "Modification request submitted");
    assert_matches!(review.status(), Some(status) if status.certificate_reviewed && !status.certificate_approved);
}

#[tokio::test]
#[serial]
async fn test_empty_certificate_body_is_an_error() {
    let ctx = TestContext::new().await;
    mount_attendance(&ctx).await;
    ctx.backend
        .mock_completion(ATTENDANCE_ID, status_json([true, true, true, true, true, true]), None)
        .await;
    ctx.backend.mock_download(ATTENDANCE_ID, b"").await;

    let (review, _navigation) =
        CertificateReview::open(ctx.signed_in_services(), &ctx.settings, ATTENDANCE_ID)
            .await
            .unwrap();

    assert_matches!(
        review.download(&ctx.download_dir()).await,
        Err(VpassError::Api(vpass::ApiError::MalformedResponse(_)))
    );
}

#[tokio::test]
#[serial]
async fn test_closed_review_screen_refuses_actions() {
    let ctx = TestContext::with_redirect_delay(100).await;
    mount_attendance(&ctx).await;
    ctx.backend
        .mock_completion(ATTENDANCE_ID, status_json([true, true, true, true, false, false]), None)
        .await;
    ctx.backend.mock_approve(ATTENDANCE_ID).await;
    ctx.backend.mock_modification(ATTENDANCE_ID).await;

    let (mut review, mut navigation) =
        CertificateReview::open(ctx.signed_in_services(), &ctx.settings, ATTENDANCE_ID)
            .await
            .unwrap();
    assert!(review.can_approve());
    review.teardown();

    assert_matches!(review.approve().await, Err(VpassError::InvalidStateTransition { .. }));
    assert_matches!(
        review.request_modification("Wrong date").await,
        Err(VpassError::InvalidStateTransition { .. })
    );
    assert_matches!(review.refresh().await, Err(VpassError::InvalidStateTransition { .. }));
    assert_matches!(
        review.download(&ctx.download_dir()).await,
        Err(VpassError::InvalidStateTransition { .. })
    );
    assert!(!review.has_pending_navigation());

    tokio::time::sleep(Duration::from_millis(300)).await;
    assert!(navigation.try_recv().is_err());
    assert_eq!(
        ctx.backend
            .received("POST", &format!("/api/attendances/{}/approve_certificate/", ATTENDANCE_ID))
            .await,
        0
    );
}
