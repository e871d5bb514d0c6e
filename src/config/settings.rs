//! Application settings management
//!
//! This module defines the configuration structure and provides methods
//! for loading settings from TOML files and environment variables.

use serde::{Deserialize, Serialize};

/// Main application configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    pub api: ApiConfig,
    pub cache: CacheConfig,
    pub logging: LoggingConfig,
}

/// Remote events API configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
    /// Base URL including the `/api` prefix
    pub base_url: String,
    pub timeout_seconds: u64,
    pub user_agent: String,
}

/// Query cache configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    /// How long a successful result is served without refetching
    pub stale_time_seconds: u64,
    /// Extra attempts after a failed fetch before an error is surfaced
    pub retry: u32,
    pub retry_delay_ms: u64,
    pub refetch_on_focus: bool,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    /// Directory for the daily rolling log file; stdout only when unset
    pub directory: Option<String>,
    /// "pretty" or "json"
    pub format: String,
}

impl Settings {
    /// Load settings from `config.toml` (if present) and environment variables
    pub fn new() -> Result<Self, config::ConfigError> {
        Self::load(None)
    }

    /// Load settings layered as defaults, then a TOML file, then `EVENT_ADMIN_*` variables
    pub fn load(path: Option<&str>) -> Result<Self, config::ConfigError> {
        let file = match path {
            Some(path) => config::File::with_name(path).required(true),
            None => config::File::with_name("config").required(false),
        };

        let settings = config::Config::builder()
            .add_source(config::Config::try_from(&Settings::default())?)
            .add_source(file)
            .add_source(
                config::Environment::with_prefix("EVENT_ADMIN")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        settings.try_deserialize()
    }

    /// Validate configuration settings
    pub fn validate(&self) -> Result<(), crate::utils::errors::AdminError> {
        super::validation::validate_settings(self)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            cache: CacheConfig::default(),
            logging: LoggingConfig {
                level: "info".to_string(),
                directory: None,
                format: "pretty".to_string(),
            },
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000/api".to_string(),
            timeout_seconds: 10,
            user_agent: format!("event-admin/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            stale_time_seconds: 30,
            retry: 1,
            retry_delay_ms: 0,
            refetch_on_focus: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.api.base_url, "http://localhost:5000/api");
        assert_eq!(settings.cache.retry, 1);
        assert!(!settings.cache.refetch_on_focus);
        assert!(settings.validate().is_ok());
    }

    #[test]
    #[serial]
    fn test_load_from_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("admin.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "[api]\nbase_url = \"https://events.example.com/api\"\n\n[cache]\nretry = 2").unwrap();

        let settings = Settings::load(Some(path.to_str().unwrap())).unwrap();
        assert_eq!(settings.api.base_url, "https://events.example.com/api");
        assert_eq!(settings.cache.retry, 2);
        // untouched sections keep their defaults
        assert_eq!(settings.api.timeout_seconds, 10);
        assert_eq!(settings.logging.level, "info");
    }

    #[test]
    #[serial]
    fn test_load_from_environment() {
        std::env::set_var("EVENT_ADMIN_API__TIMEOUT_SECONDS", "3");
        let settings = Settings::load(None);
        std::env::remove_var("EVENT_ADMIN_API__TIMEOUT_SECONDS");

        assert_eq!(settings.unwrap().api.timeout_seconds, 3);
    }
}
