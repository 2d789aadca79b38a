//! VPass client
//!
//! Terminal client for the VPass event attendance and certificate system.
//! This library provides the backend API client, the attendee check-in
//! flow with its stage gate, certificate review, session handling and the
//! command handlers of the `vpass` binary.

pub mod config;
pub mod handlers;
pub mod services;
pub mod models;
pub mod state;
pub mod utils;

// Re-export commonly used types
pub use config::Settings;
pub use utils::errors::{VpassError, ApiError, Result};

// Re-export main components for easy access
pub use services::ServiceFactory;
pub use state::{AuthShell, CheckInFlow, CertificateReview, Stage};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Get library information
pub fn info() -> String {
    format!("{} v{}", NAME, VERSION)
}
