//! Configuration validation module
//! 
//! This module provides validation functions for client configuration
//! to ensure all required settings are properly configured.

use crate::utils::errors::{VpassError, Result};
use super::Settings;

/// Validate all configuration settings
pub fn validate_settings(settings: &Settings) -> Result<()> {
    validate_api_config(&settings.api)?;
    validate_session_config(&settings.session)?;
    validate_flow_config(&settings.flow)?;
    validate_logging_config(&settings.logging)?;

    Ok(())
}

/// Validate backend API configuration
fn validate_api_config(config: &super::ApiConfig) -> Result<()> {
    if config.base_url.is_empty() {
        return Err(VpassError::Config(
            "API base URL is required".to_string()
        ));
    }

    let url = url::Url::parse(&config.base_url)
        .map_err(|e| VpassError::Config(format!("Invalid API base URL {}: {}", config.base_url, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(VpassError::Config(
            format!("API base URL must be http or https, got {}", url.scheme())
        ));
    }

    if config.timeout_seconds == 0 {
        return Err(VpassError::Config(
            "API timeout must be greater than 0".to_string()
        ));
    }

    Ok(())
}

/// Validate session storage configuration
fn validate_session_config(config: &super::SessionConfig) -> Result<()> {
    if config.storage_path.is_empty() {
        return Err(VpassError::Config(
            "Session storage path is required".to_string()
        ));
    }

    if config.default_ttl_seconds == 0 {
        return Err(VpassError::Config(
            "Default session lifetime must be greater than 0".to_string()
        ));
    }

    if config.refresh_margin_seconds >= config.default_ttl_seconds {
        return Err(VpassError::Config(
            "Refresh margin must be shorter than the session lifetime".to_string()
        ));
    }

    Ok(())
}

/// Validate check-in flow configuration
fn validate_flow_config(config: &super::FlowConfig) -> Result<()> {
    if config.redirect_delay_ms > 60_000 {
        return Err(VpassError::Config(
            "Redirect delay cannot exceed 60 seconds".to_string()
        ));
    }

    Ok(())
}

/// Validate logging configuration
fn validate_logging_config(config: &super::LoggingConfig) -> Result<()> {
    if config.level.is_empty() {
        return Err(VpassError::Config(
            "Log level is required".to_string()
        ));
    }
    
    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if !valid_levels.contains(&config.level.as_str()) {
        return Err(VpassError::Config(
            format!("Invalid log level: {}. Valid levels: {:?}", config.level, valid_levels)
        ));
    }
    
    Ok(())
}
