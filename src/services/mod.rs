//! Services module
//!
//! This module contains one client service per backend resource

pub mod api;
pub mod attendance;
pub mod auth;
pub mod events;
pub mod survey;

// Re-export commonly used services
pub use api::ApiClient;
pub use attendance::AttendanceService;
pub use auth::{AuthService, Permission};
pub use events::EventService;
pub use survey::SurveyService;

use crate::config::settings::Settings;
use crate::utils::errors::Result;

/// Service factory for creating and managing all services.
///
/// All services share one [`ApiClient`], so a token set on the factory's
/// client is seen by every service.
#[derive(Clone, Debug)]
pub struct ServiceFactory {
    pub api: ApiClient,
    pub auth_service: AuthService,
    pub event_service: EventService,
    pub attendance_service: AttendanceService,
    pub survey_service: SurveyService,
}

impl ServiceFactory {
    /// Create a new ServiceFactory with all services initialized
    pub fn new(settings: &Settings) -> Result<Self> {
        let api = ApiClient::new(settings)?;

        Ok(Self {
            auth_service: AuthService::new(api.clone()),
            event_service: EventService::new(api.clone()),
            attendance_service: AttendanceService::new(api.clone()),
            survey_service: SurveyService::new(api.clone()),
            api,
        })
    }
}
