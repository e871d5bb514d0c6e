//! Configuration validation module
//!
//! This module provides validation functions for application configuration
//! to ensure all required settings are properly configured.

use url::Url;

use crate::utils::errors::{AdminError, Result};
use super::Settings;

const MAX_RETRIES: u32 = 5;

/// Validate all configuration settings
pub fn validate_settings(settings: &Settings) -> Result<()> {
    validate_api_config(&settings.api)?;
    validate_cache_config(&settings.cache)?;
    validate_logging_config(&settings.logging)?;

    Ok(())
}

/// Validate API configuration
fn validate_api_config(config: &super::ApiConfig) -> Result<()> {
    if config.base_url.is_empty() {
        return Err(AdminError::Config(
            "API base URL is required".to_string()
        ));
    }

    let url = Url::parse(&config.base_url)
        .map_err(|e| AdminError::Config(format!("Invalid API base URL '{}': {}", config.base_url, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(AdminError::Config(
            format!("API base URL must use http or https, got '{}'", url.scheme())
        ));
    }

    if config.timeout_seconds == 0 {
        return Err(AdminError::Config(
            "API timeout must be greater than 0".to_string()
        ));
    }

    Ok(())
}

/// Validate query cache configuration
fn validate_cache_config(config: &super::CacheConfig) -> Result<()> {
    if config.retry > MAX_RETRIES {
        return Err(AdminError::Config(
            format!("Cache retry count {} exceeds the maximum of {}", config.retry, MAX_RETRIES)
        ));
    }

    Ok(())
}

/// Validate logging configuration
fn validate_logging_config(config: &super::LoggingConfig) -> Result<()> {
    if config.level.is_empty() {
        return Err(AdminError::Config(
            "Log level is required".to_string()
        ));
    }

    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if !valid_levels.contains(&config.level.as_str()) {
        return Err(AdminError::Config(
            format!("Invalid log level: {}. Valid levels: {:?}", config.level, valid_levels)
        ));
    }

    let valid_formats = ["pretty", "json"];
    if !valid_formats.contains(&config.format.as_str()) {
        return Err(AdminError::Config(
            format!("Invalid log format: {}. Valid formats: {:?}", config.format, valid_formats)
        ));
    }

    if matches!(&config.directory, Some(dir) if dir.trim().is_empty()) {
        return Err(AdminError::Config(
            "Log directory must not be blank when set".to_string()
        ));
    }

    Ok(())
}
