//! Integration tests for the authentication shell

use assert_matches::assert_matches;
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::json;
use serial_test::serial;
use vpass::models::User;
use vpass::services::Permission;
use vpass::state::{alert_text, Action, AuthState, Session};
use vpass::VpassError;

use crate::helpers::*;

fn jwt_expiring_in(seconds: i64) -> String {
    let exp = Utc::now().timestamp() + seconds;
    encode(
        &Header::default(),
        &json!({ "user_id": 3, "exp": exp }),
        &EncodingKey::from_secret(b"backend-signing-key"),
    )
    .expect("Failed to sign test token")
}

async fn store_session(ctx: &TestContext, token: String, refresh: Option<&str>, expires_in: Duration) {
    let user: User = serde_json::from_value(user_json("ana@school.edu", false)).unwrap();
    let now = Utc::now();
    let session = Session {
        token,
        refresh: refresh.map(str::to_string),
        user,
        issued_at: now,
        expires_at: now + expires_in,
    };
    ctx.session_store().save(&session).await.unwrap();
}

#[tokio::test]
#[serial]
async fn test_login_stores_session_and_logout_clears_it() {
    let ctx = TestContext::new().await;
    let token = jwt_expiring_in(3_600);
    ctx.backend
        .mock_login(&token, Some("refresh-1"), user_json("ana@school.edu", false))
        .await;

    let mut shell = ctx.shell().await;
    assert_eq!(*shell.state(), AuthState::Unauthenticated);

    let notice = shell.login("ana@school.edu", "secret", true).await.unwrap();
    assert_eq!(notice.message, "Welcome, Ana Reyes!");
    assert_matches!(shell.state(), AuthState::Authenticated { is_admin: false, .. });
    assert!(shell.services().api.has_token());

    let session = shell.session().unwrap();
    assert_eq!(session.refresh.as_deref(), Some("refresh-1"));
    assert!(session.expires_at > Utc::now() + Duration::minutes(55));
    assert!(ctx.session_store().exists().await);

    assert!(shell.require(Permission::User).is_ok());
    assert_matches!(shell.require(Permission::Admin), Err(VpassError::PermissionDenied(_)));

    shell.logout().await.unwrap();
    assert_eq!(*shell.state(), AuthState::Unauthenticated);
    assert!(!shell.services().api.has_token());
    assert!(!ctx.session_store().exists().await);
    assert_matches!(shell.logout().await, Err(VpassError::InvalidStateTransition { .. }));
}

#[tokio::test]
#[serial]
async fn test_failed_login_shows_backend_detail() {
    let ctx = TestContext::new().await;
    ctx.backend.mock_login_failure(400, "Invalid email or password").await;

    let mut shell = ctx.shell().await;
    let err = shell.login("ana@school.edu", "wrong", false).await.unwrap_err();

    assert_eq!(alert_text(Action::Login, &err), "Invalid email or password");
    assert_eq!(*shell.state(), AuthState::Unauthenticated);
    assert!(!ctx.session_store().exists().await);
}

#[tokio::test]
#[serial]
async fn test_login_requires_all_fields() {
    let ctx = TestContext::new().await;
    let mut shell = ctx.shell().await;

    let err = shell.login("", "", false).await.unwrap_err();
    assert_eq!(alert_text(Action::Login, &err), "Please fill in all fields");
    assert_eq!(*shell.state(), AuthState::Unauthenticated);
    assert_eq!(ctx.backend.received("POST", "/api/auth/login/").await, 0);
}

#[tokio::test]
#[serial]
async fn test_register_checks_password_confirmation() {
    let ctx = TestContext::new().await;
    ctx.backend.mock_register("opaque-token", user_json("new@school.edu", false)).await;
    let mut shell = ctx.shell().await;

    let err = shell.register("new@school.edu", "one", "two").await.unwrap_err();
    assert_eq!(alert_text(Action::Register, &err), "Passwords don't match!");
    assert_eq!(*shell.state(), AuthState::Unauthenticated);

    let notice = shell.register("new@school.edu", "secret", "secret").await.unwrap();
    assert_eq!(notice.message, "Registration successful!");
    assert_matches!(shell.state(), AuthState::Authenticated { .. });

    // Opaque tokens get the default lifetime
    let session = shell.session().unwrap();
    assert_eq!(
        session.expires_at - session.issued_at,
        Duration::seconds(ctx.settings.session.default_ttl_seconds as i64)
    );
}

#[tokio::test]
#[serial]
async fn test_stored_session_is_verified_at_startup() {
    let ctx = TestContext::new().await;
    store_session(&ctx, jwt_expiring_in(3_600), None, Duration::hours(1)).await;
    ctx.backend
        .mock_verify(200, json!({ "user": user_json("ana@school.edu", true) }))
        .await;

    let mut shell = ctx.shell().await;
    assert_eq!(*shell.state(), AuthState::Verifying);

    let user = shell.verify().await.unwrap();
    assert!(user.is_admin());
    assert!(shell.is_admin());
    assert!(shell.require(Permission::Admin).is_ok());
}

#[tokio::test]
#[serial]
async fn test_rejected_session_returns_to_login() {
    let ctx = TestContext::new().await;
    store_session(&ctx, jwt_expiring_in(3_600), None, Duration::hours(1)).await;
    ctx.backend
        .mock_verify(401, json!({ "detail": "Token is invalid or expired" }))
        .await;

    let mut shell = ctx.shell().await;
    assert_matches!(shell.verify().await, Err(VpassError::SessionExpired));
    assert_eq!(*shell.state(), AuthState::Unauthenticated);
    assert!(!ctx.session_store().exists().await);
}

#[tokio::test]
#[serial]
async fn test_session_near_expiry_is_refreshed() {
    let ctx = TestContext::new().await;
    let fresh = jwt_expiring_in(3_600);
    store_session(&ctx, jwt_expiring_in(60), Some("refresh-1"), Duration::seconds(60)).await;
    ctx.backend.mock_refresh("refresh-1", &fresh).await;
    ctx.backend.mock_verify(200, json!({})).await;

    let mut shell = ctx.shell().await;
    shell.verify().await.unwrap();

    assert_eq!(ctx.backend.received("POST", "/api/token/refresh/").await, 1);
    let session = shell.session().unwrap();
    assert_eq!(session.token, fresh);
    assert!(session.expires_at > Utc::now() + Duration::minutes(55));

    let stored = ctx.session_store().load().await.unwrap().unwrap();
    assert_eq!(stored.token, fresh);
    assert_eq!(stored.refresh.as_deref(), Some("refresh-1"));
}

#[tokio::test]
#[serial]
async fn test_failed_refresh_signs_out() {
    let ctx = TestContext::new().await;
    store_session(&ctx, jwt_expiring_in(30), Some("refresh-1"), Duration::seconds(30)).await;
    ctx.backend.mock_refresh_failure().await;

    let mut shell = ctx.shell().await;
    assert_matches!(shell.verify().await, Err(VpassError::SessionExpired));
    assert_eq!(*shell.state(), AuthState::Unauthenticated);
    assert_eq!(ctx.backend.received("POST", "/api/token/verify/").await, 0);
}

#[tokio::test]
#[serial]
async fn test_expired_session_without_refresh_token() {
    let ctx = TestContext::new().await;
    store_session(&ctx, "opaque".to_string(), None, Duration::seconds(-10)).await;

    let mut shell = ctx.shell().await;
    assert_matches!(shell.verify().await, Err(VpassError::SessionExpired));
    assert_eq!(*shell.state(), AuthState::Unauthenticated);
}

#[tokio::test]
#[serial]
async fn test_login_while_signed_in_is_rejected() {
    let ctx = TestContext::new().await;
    ctx.backend
        .mock_login("opaque", None, user_json("ana@school.edu", false))
        .await;

    let mut shell = ctx.shell().await;
    shell.login("ana@school.edu", "secret", false).await.unwrap();
    assert_matches!(
        shell.login("ana@school.edu", "secret", false).await,
        Err(VpassError::InvalidStateTransition { .. })
    );
}

#[tokio::test]
#[serial]
async fn test_password_reset_request() {
    let ctx = TestContext::new().await;
    ctx.backend.mock_password_reset("ana@school.edu").await;
    let services = ctx.services();

    assert_matches!(
        services.auth_service.request_password_reset("not-an-email").await,
        Err(VpassError::InvalidInput(_))
    );

    let message = services.auth_service.request_password_reset("ana@school.edu").await.unwrap();
    assert_eq!(message, "If the email is registered, a reset link has been sent");
    assert_eq!(ctx.backend.received("POST", "/api/auth/password-reset/").await, 1);
}

#[tokio::test]
#[serial]
async fn test_malformed_stored_token_is_dropped() {
    let ctx = TestContext::new().await;
    store_session(&ctx, jwt_expiring_in(3_600), None, Duration::hours(1)).await;
    ctx.backend
        .mock_verify(400, json!({ "token": ["This field may not be blank."] }))
        .await;

    let mut shell = ctx.shell().await;
    assert_matches!(shell.verify().await, Err(VpassError::SessionExpired));
    assert_eq!(*shell.state(), AuthState::Unauthenticated);
    assert!(!shell.services().api.has_token());
    assert!(!ctx.session_store().exists().await);
}

#[tokio::test]
#[serial]
async fn test_unwritable_session_file_leaves_shell_signed_out() {
    let ctx = TestContext::new().await;
    ctx.backend
        .mock_login("opaque", None, user_json("ana@school.edu", false))
        .await;

    let mut shell = ctx.shell().await;
    // A directory where the session file belongs makes every save fail
    std::fs::create_dir_all(&ctx.settings.session.storage_path).unwrap();

    assert_matches!(
        shell.login("ana@school.edu", "secret", true).await,
        Err(VpassError::Io(_))
    );
    assert_eq!(*shell.state(), AuthState::Unauthenticated);
    assert!(!shell.services().api.has_token());

    // A retry is a fresh login attempt, not a stuck transition
    assert_matches!(
        shell.login("ana@school.edu", "secret", true).await,
        Err(VpassError::Io(_))
    );
    assert_eq!(ctx.backend.received("POST", "/api/auth/login/").await, 2);
}
