//! Authentication shell
//!
//! Tracks whether the user is signed in and keeps the stored session and
//! the API client's bearer token in step. The admin/user split of the
//! root view is read from the user payload of the session.

use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::{SessionConfig, Settings};
use crate::models::{AuthResponse, User};
use crate::services::{Permission, ServiceFactory};
use crate::utils::errors::{VpassError, Result};
use crate::utils::logging::log_user_action;
use super::dialog::{Action, Notice};
use super::storage::SessionStore;

/// Credentials of a signed-in user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    #[serde(default)]
    pub refresh: Option<String>,
    pub user: User,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// Build a session from a login or register response
    pub fn from_auth(response: AuthResponse, default_ttl: Duration, now: DateTime<Utc>) -> Self {
        let expires_at = token_expiry(&response.token).unwrap_or(now + default_ttl);
        Self {
            token: response.token,
            refresh: response.refresh,
            user: response.user,
            issued_at: now,
            expires_at,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    pub fn expires_within(&self, margin: Duration, now: DateTime<Utc>) -> bool {
        now + margin >= self.expires_at
    }

    pub fn is_admin(&self) -> bool {
        self.user.is_admin()
    }

    /// Adopt a refreshed access token
    fn renew(&mut self, access: String, refresh: Option<String>, default_ttl: Duration, now: DateTime<Utc>) {
        self.expires_at = token_expiry(&access).unwrap_or(now + default_ttl);
        self.token = access;
        self.issued_at = now;
        if refresh.is_some() {
            self.refresh = refresh;
        }
    }
}

#[derive(Debug, Deserialize)]
struct ExpiryClaim {
    #[serde(default)]
    exp: Option<i64>,
}

/// Expiry of a JWT access token, read without checking its signature.
///
/// Returns `None` for opaque tokens and tokens without an `exp` claim.
pub fn token_expiry(token: &str) -> Option<DateTime<Utc>> {
    let mut validation = Validation::default();
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    let data = decode::<ExpiryClaim>(token, &DecodingKey::from_secret(&[]), &validation).ok()?;
    data.claims.exp.and_then(|exp| Utc.timestamp_opt(exp, 0).single())
}

/// Where the shell is in the sign-in lifecycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    Unauthenticated,
    /// Credentials are present but not confirmed yet
    Verifying,
    Authenticated { user: User, is_admin: bool },
}

impl AuthState {
    pub fn name(&self) -> &'static str {
        match self {
            AuthState::Unauthenticated => "unauthenticated",
            AuthState::Verifying => "verifying",
            AuthState::Authenticated { .. } => "authenticated",
        }
    }
}

#[derive(Debug)]
pub struct AuthShell {
    services: ServiceFactory,
    store: SessionStore,
    config: SessionConfig,
    state: AuthState,
    session: Option<Session>,
}

impl AuthShell {
    /// Load any stored session. The shell starts in `Verifying` when one exists.
    pub async fn start(services: ServiceFactory, settings: &Settings) -> Result<Self> {
        let store = SessionStore::from_config(&settings.session);
        Self::with_store(services, store, settings.session.clone()).await
    }

    pub async fn with_store(services: ServiceFactory, store: SessionStore, config: SessionConfig) -> Result<Self> {
        let session = store.load().await?;
        let state = match &session {
            Some(session) => {
                services.api.set_token(Some(session.token.clone()));
                AuthState::Verifying
            }
            None => AuthState::Unauthenticated,
        };
        debug!(state = state.name(), "Auth shell started");

        Ok(Self {
            services,
            store,
            config,
            state,
            session,
        })
    }

    pub fn state(&self) -> &AuthState {
        &self.state
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn services(&self) -> &ServiceFactory {
        &self.services
    }

    pub fn current_user(&self) -> Option<&User> {
        match &self.state {
            AuthState::Authenticated { user, .. } => Some(user),
            _ => None,
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self.state, AuthState::Authenticated { is_admin: true, .. })
    }

    fn default_ttl(&self) -> Duration {
        Duration::seconds(self.config.default_ttl_seconds as i64)
    }

    fn refresh_margin(&self) -> Duration {
        Duration::seconds(self.config.refresh_margin_seconds as i64)
    }

    fn transition(&mut self, next: AuthState) -> Result<()> {
        let allowed = matches!(
            (&self.state, &next),
            (AuthState::Unauthenticated, AuthState::Verifying)
                | (AuthState::Verifying, AuthState::Authenticated { .. })
                | (AuthState::Verifying, AuthState::Unauthenticated)
                | (AuthState::Authenticated { .. }, AuthState::Unauthenticated)
        );
        if !allowed {
            return Err(VpassError::InvalidStateTransition {
                from: self.state.name().to_string(),
                to: next.name().to_string(),
            });
        }
        debug!(from = self.state.name(), to = next.name(), "Auth state transition");
        self.state = next;
        Ok(())
    }

    async fn authenticate(&mut self, session: Session) -> Result<()> {
        if let Err(e) = self.store.save(&session).await {
            warn!(error = %e, "Failed to store session");
            if let Err(clear_err) = self.clear().await {
                warn!(error = %clear_err, "Failed to remove stale session file");
            }
            return Err(e);
        }
        self.services.api.set_token(Some(session.token.clone()));
        let user = session.user.clone();
        let is_admin = user.is_admin();
        self.session = Some(session);
        self.transition(AuthState::Authenticated { user, is_admin })
    }

    async fn clear(&mut self) -> Result<()> {
        self.services.api.set_token(None);
        self.session = None;
        if self.state != AuthState::Unauthenticated {
            self.transition(AuthState::Unauthenticated)?;
        }
        self.store.delete().await
    }

    /// Sign in with email and password
    pub async fn login(&mut self, email: &str, password: &str, stay_signed_in: bool) -> Result<Notice> {
        self.transition(AuthState::Verifying)?;

        match self.services.auth_service.login(email, password, stay_signed_in).await {
            Ok(response) => {
                let session = Session::from_auth(response, self.default_ttl(), Utc::now());
                log_user_action(&session.user.email, "login", None);
                let name = session.user.display_name();
                self.authenticate(session).await?;
                Ok(Notice::new(Action::Login, format!("Welcome, {}!", name)))
            }
            Err(e) => {
                self.clear().await?;
                Err(e)
            }
        }
    }

    /// Create an account and sign in with it
    pub async fn register(&mut self, email: &str, password: &str, confirm_password: &str) -> Result<Notice> {
        self.transition(AuthState::Verifying)?;

        match self.services.auth_service.register(email, password, confirm_password).await {
            Ok(response) => {
                let session = Session::from_auth(response, self.default_ttl(), Utc::now());
                log_user_action(&session.user.email, "register", None);
                self.authenticate(session).await?;
                Ok(Notice::new(Action::Register, "Registration successful!"))
            }
            Err(e) => {
                self.clear().await?;
                Err(e)
            }
        }
    }

    /// Confirm the stored session with the backend
    pub async fn verify(&mut self) -> Result<&User> {
        if self.state != AuthState::Verifying {
            return Err(VpassError::InvalidStateTransition {
                from: self.state.name().to_string(),
                to: "authenticated".to_string(),
            });
        }

        self.ensure_fresh().await?;
        let Some(session) = self.session.clone() else {
            return Err(VpassError::SessionExpired);
        };

        match self.services.auth_service.verify_token(&session.token).await {
            Ok(returned) => {
                let mut session = session;
                if let Some(user) = returned {
                    session.user = user;
                }
                self.authenticate(session).await?;
            }
            Err(e) if e.is_credential_rejection() => {
                warn!(email = %session.user.email, "Stored session rejected by the backend");
                self.clear().await?;
                return Err(VpassError::SessionExpired);
            }
            Err(e) => return Err(e),
        }

        self.current_user().ok_or(VpassError::SessionExpired)
    }

    /// Refresh the access token when it is about to expire
    pub async fn ensure_fresh(&mut self) -> Result<()> {
        self.ensure_fresh_at(Utc::now()).await
    }

    pub async fn ensure_fresh_at(&mut self, now: DateTime<Utc>) -> Result<()> {
        let Some(session) = self.session.as_ref() else {
            return Ok(());
        };
        if !session.expires_within(self.refresh_margin(), now) {
            return Ok(());
        }

        let Some(refresh) = session.refresh.clone() else {
            if session.is_expired(now) {
                info!(email = %session.user.email, "Session expired");
                self.clear().await?;
                return Err(VpassError::SessionExpired);
            }
            return Ok(());
        };

        match self.services.auth_service.refresh_token(&refresh).await {
            Ok(response) => {
                let ttl = self.default_ttl();
                if let Some(session) = self.session.as_mut() {
                    session.renew(response.access, response.refresh, ttl, now);
                    self.services.api.set_token(Some(session.token.clone()));
                    self.store.save(session).await?;
                }
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Token refresh failed, signing out");
                self.clear().await?;
                Err(VpassError::SessionExpired)
            }
        }
    }

    /// Sign out and forget the stored session
    pub async fn logout(&mut self) -> Result<()> {
        if self.state == AuthState::Unauthenticated {
            return Err(VpassError::InvalidStateTransition {
                from: self.state.name().to_string(),
                to: "unauthenticated".to_string(),
            });
        }
        if let Some(user) = self.current_user() {
            log_user_action(&user.email, "logout", None);
        }
        self.clear().await
    }

    /// Signed-in user holding at least `required`
    pub fn require(&self, required: Permission) -> Result<&User> {
        let user = self
            .current_user()
            .ok_or_else(|| VpassError::Authentication("Please log in first".to_string()))?;
        if !Permission::of(user).allows(required) {
            return Err(VpassError::PermissionDenied(
                "This action requires an administrator account".to_string(),
            ));
        }
        Ok(user)
    }
}
