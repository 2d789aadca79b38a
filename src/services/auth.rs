//! Authentication service implementation
//!
//! This service wraps the backend's login, registration, token verification,
//! token refresh and password reset endpoints. Whether a user may do
//! something is decided by the backend; the client only derives the
//! admin/user split from the returned user payload.

use serde_json::json;
use tracing::{info, warn, debug};

use crate::models::{
    AuthResponse, DetailMessage, LoginRequest, RefreshResponse, RegisterRequest, User, VerifyResponse,
};
use crate::utils::errors::{VpassError, Result};
use crate::utils::helpers::{is_valid_email, username_from_email};
use super::api::ApiClient;

/// Permission levels for client-side gating
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Permission {
    /// Attendee views: events, check-in, certificates
    User,
    /// Event management views
    Admin,
}

impl Permission {
    /// Permission granted by a user payload
    pub fn of(user: &User) -> Self {
        if user.is_admin() {
            Permission::Admin
        } else {
            Permission::User
        }
    }

    pub fn allows(&self, required: Permission) -> bool {
        match required {
            Permission::User => true,
            Permission::Admin => *self == Permission::Admin,
        }
    }
}

/// Authentication service for the auth and token endpoints
#[derive(Clone, Debug)]
pub struct AuthService {
    api: ApiClient,
}

impl AuthService {
    /// Create a new AuthService instance
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Exchange credentials for tokens and the user payload
    pub async fn login(&self, email: &str, password: &str, stay_signed_in: bool) -> Result<AuthResponse> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(VpassError::InvalidInput("Please fill in all fields".to_string()));
        }

        let request = LoginRequest {
            email: email.trim().to_string(),
            password: password.to_string(),
            stay_signed_in,
        };

        match self.api.post_json::<_, AuthResponse>("/api/auth/login/", &request).await {
            Ok(response) => {
                self.log_auth_event(&request.email, "login", true, None);
                Ok(response)
            }
            Err(e) => {
                self.log_auth_event(&request.email, "login", false, Some(&e.to_string()));
                Err(e)
            }
        }
    }

    /// Create an account; the username is the local part of the email
    pub async fn register(&self, email: &str, password: &str, confirm_password: &str) -> Result<AuthResponse> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(VpassError::InvalidInput("Please fill in all fields".to_string()));
        }
        if password != confirm_password {
            return Err(VpassError::InvalidInput("Passwords don't match!".to_string()));
        }
        if !is_valid_email(email) {
            return Err(VpassError::InvalidInput(format!("Invalid email address: {}", email)));
        }

        let email = email.trim();
        let request = RegisterRequest {
            username: username_from_email(email),
            email: email.to_string(),
            password: password.to_string(),
            first_name: String::new(),
            last_name: String::new(),
        };

        let response: AuthResponse = self.api.post_json("/api/auth/register/", &request).await?;
        self.log_auth_event(email, "register", true, None);
        Ok(response)
    }

    /// Ask the backend whether `token` is still valid.
    ///
    /// Returns the user payload when the backend includes one.
    pub async fn verify_token(&self, token: &str) -> Result<Option<User>> {
        debug!("Verifying stored token");
        let response: VerifyResponse = self
            .api
            .post_json("/api/token/verify/", &json!({ "token": token }))
            .await?;
        Ok(response.user)
    }

    /// Trade a refresh token for a new access token
    pub async fn refresh_token(&self, refresh: &str) -> Result<RefreshResponse> {
        let response: RefreshResponse = self
            .api
            .post_json("/api/token/refresh/", &json!({ "refresh": refresh }))
            .await?;
        info!("Access token refreshed");
        Ok(response)
    }

    /// Start the password reset email flow
    pub async fn request_password_reset(&self, email: &str) -> Result<String> {
        if !is_valid_email(email) {
            return Err(VpassError::InvalidInput(format!("Invalid email address: {}", email)));
        }
        let message: DetailMessage = self
            .api
            .post_json("/api/auth/password-reset/", &json!({ "email": email.trim() }))
            .await?;
        Ok(message.or("If the email is registered, a reset link has been sent"))
    }

    /// Log authentication event
    pub fn log_auth_event(&self, email: &str, action: &str, success: bool, details: Option<&str>) {
        if success {
            info!(
                email = email,
                action = action,
                details = details,
                "Authentication event: success"
            );
        } else {
            warn!(
                email = email,
                action = action,
                details = details,
                "Authentication event: failure"
            );
        }
    }
}
