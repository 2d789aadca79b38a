//! Error handling for VPass
//!
//! This module defines the main error types used throughout the client
//! and provides a unified error handling strategy.

use thiserror::Error;

/// Main error type for the VPass client
#[derive(Error, Debug)]
pub enum VpassError {
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Event not found: {event_id}")]
    EventNotFound { event_id: i64 },

    #[error("No attendance recorded yet")]
    NoAttendance,

    #[error("Invalid state transition: {from} -> {to}")]
    InvalidStateTransition { from: String, to: String },

    #[error("Completion status regressed: {fields:?}")]
    NonMonotonicStatus { fields: Vec<String> },

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Session expired")]
    SessionExpired,

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Backend API specific errors
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("network failure: {0}")]
    Network(String),

    #[error("request timed out")]
    Timeout,

    #[error("HTTP {status}: {}", detail.as_deref().unwrap_or("no detail"))]
    Server { status: u16, detail: Option<String> },

    #[error("unauthorized: {}", detail.as_deref().unwrap_or("no detail"))]
    Unauthorized { detail: Option<String> },

    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

/// Result type alias for VPass operations
pub type Result<T> = std::result::Result<T, VpassError>;

/// Result type alias for raw API calls
pub type ApiResult<T> = std::result::Result<T, ApiError>;

impl ApiError {
    /// Server-provided detail text, if the backend sent one
    pub fn detail(&self) -> Option<&str> {
        match self {
            ApiError::Server { detail, .. } => detail.as_deref(),
            ApiError::Unauthorized { detail } => detail.as_deref(),
            _ => None,
        }
    }

    /// HTTP status of the failed response, when one was received
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Server { status, .. } => Some(*status),
            ApiError::Unauthorized { .. } => Some(401),
            _ => None,
        }
    }
}

impl VpassError {
    /// Collapse the error into the single alert text shown to the user.
    ///
    /// Server detail wins; local validation messages are shown as-is;
    /// everything else falls back to the caller's generic message.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            VpassError::Api(api) => api
                .detail()
                .map(str::to_string)
                .unwrap_or_else(|| fallback.to_string()),
            VpassError::InvalidInput(msg) => msg.clone(),
            VpassError::PermissionDenied(msg) => msg.clone(),
            VpassError::SessionExpired => "Your session has expired. Please log in again.".to_string(),
            _ => fallback.to_string(),
        }
    }

    /// Check if the backend rejected our credentials
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, VpassError::Api(ApiError::Unauthorized { .. }) | VpassError::SessionExpired)
    }

    /// Check if the backend refused a token outright (401, 403 or 400)
    pub fn is_credential_rejection(&self) -> bool {
        match self {
            VpassError::Api(ApiError::Unauthorized { .. }) => true,
            VpassError::Api(ApiError::Server { status, .. }) => matches!(status, 400 | 403),
            _ => false,
        }
    }

    /// Check if the error is recoverable
    pub fn is_recoverable(&self) -> bool {
        match self {
            VpassError::Api(ApiError::Network(_)) => true,
            VpassError::Api(ApiError::Timeout) => true,
            VpassError::Api(ApiError::Server { status, .. }) => *status >= 500,
            VpassError::Api(ApiError::Unauthorized { .. }) => false,
            VpassError::Api(ApiError::MalformedResponse(_)) => false,
            VpassError::Config(_) => false,
            VpassError::PermissionDenied(_) => false,
            VpassError::EventNotFound { .. } => false,
            VpassError::NoAttendance => false,
            VpassError::InvalidStateTransition { .. } => false,
            VpassError::NonMonotonicStatus { .. } => true,
            VpassError::Http(_) => true,
            VpassError::Serialization(_) => false,
            VpassError::Io(_) => true,
            VpassError::UrlParse(_) => false,
            VpassError::Authentication(_) => false,
            VpassError::SessionExpired => false,
            VpassError::InvalidInput(_) => false,
        }
    }

    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            VpassError::Config(_) => ErrorSeverity::Critical,
            VpassError::Io(_) => ErrorSeverity::Critical,
            VpassError::PermissionDenied(_) => ErrorSeverity::Warning,
            VpassError::Authentication(_) => ErrorSeverity::Warning,
            VpassError::SessionExpired => ErrorSeverity::Warning,
            VpassError::NonMonotonicStatus { .. } => ErrorSeverity::Warning,
            VpassError::InvalidInput(_) => ErrorSeverity::Info,
            _ => ErrorSeverity::Error,
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "INFO"),
            ErrorSeverity::Warning => write!(f, "WARN"),
            ErrorSeverity::Error => write!(f, "ERROR"),
            ErrorSeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}
