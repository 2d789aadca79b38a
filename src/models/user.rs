//! User and authentication payloads

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub username: Option<String>,
    pub email: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub is_staff: bool,
    #[serde(default)]
    pub is_superuser: bool,
    #[serde(default)]
    pub role: Option<String>,
}

impl User {
    /// Single flag gating the admin root view
    pub fn is_admin(&self) -> bool {
        self.is_staff || self.is_superuser || self.role.as_deref() == Some("ADMIN")
    }

    pub fn display_name(&self) -> String {
        let full = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        if full.is_empty() {
            self.username.clone().unwrap_or_else(|| self.email.clone())
        } else {
            full
        }
    }
}

/// Body of `POST /api/auth/login/`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    pub stay_signed_in: bool,
}

/// Body of `POST /api/auth/register/`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

/// Response of login and register
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    #[serde(default)]
    pub refresh: Option<String>,
    pub user: User,
}

/// Response of `POST /api/token/refresh/`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshResponse {
    pub access: String,
    /// Present when the backend rotates refresh tokens
    #[serde(default)]
    pub refresh: Option<String>,
}

/// Response of `POST /api/token/verify/`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VerifyResponse {
    #[serde(default)]
    pub user: Option<User>,
}

/// Generic `{ "detail": "..." }` message body
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DetailMessage {
    #[serde(default)]
    pub detail: Option<String>,
}

impl DetailMessage {
    pub fn or(self, fallback: &str) -> String {
        self.detail.unwrap_or_else(|| fallback.to_string())
    }
}
