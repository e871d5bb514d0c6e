//! Error handling for the event administration console
//!
//! This module defines the main error types used throughout the application
//! and provides a unified error handling strategy.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::state::schema::ValidationErrors;

/// Main error type for the administration console
#[derive(Error, Debug)]
pub enum AdminError {
    #[error("API error: {0}")]
    Api(ApiError),

    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Configuration loading error: {0}")]
    ConfigLoad(#[from] config::ConfigError),

    #[error("Invalid state transition: {from} -> {to}")]
    InvalidStateTransition { from: String, to: String },

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Remote API failures.
///
/// Data-only so a failure can be stored in the query cache and handed to
/// every reader that shared the failed fetch.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("Failed to {operation} {resource}: {reason}")]
    RequestFailed {
        resource: Resource,
        operation: Operation,
        status: Option<u16>,
        reason: String,
    },

    /// The server refused the payload and named the offending fields
    #[error("Failed to {operation} {resource}: {reason}")]
    Rejected {
        resource: Resource,
        operation: Operation,
        reason: String,
        errors: ValidationErrors,
    },

    #[error("{resource} {id} not found")]
    NotFound { resource: Resource, id: i64 },
}

impl ApiError {
    /// Build a `RequestFailed` without an HTTP status (transport or decode failure)
    pub fn request_failed(resource: Resource, operation: Operation, reason: impl Into<String>) -> Self {
        ApiError::RequestFailed {
            resource,
            operation,
            status: None,
            reason: reason.into(),
        }
    }

    /// Whether the cache may retry the fetch that produced this error
    pub fn is_retryable(&self) -> bool {
        match self {
            ApiError::RequestFailed { .. } => true,
            ApiError::Rejected { .. } | ApiError::NotFound { .. } => false,
        }
    }

    /// Short reason suitable for a notification
    pub fn reason(&self) -> String {
        match self {
            ApiError::RequestFailed { reason, .. } | ApiError::Rejected { reason, .. } => reason.clone(),
            ApiError::NotFound { resource, id } => format!("{} {} not found", resource, id),
        }
    }

    pub fn resource(&self) -> Resource {
        match self {
            ApiError::RequestFailed { resource, .. } => *resource,
            ApiError::Rejected { resource, .. } => *resource,
            ApiError::NotFound { resource, .. } => *resource,
        }
    }
}

impl From<ApiError> for AdminError {
    /// Field errors from the server surface like local validation errors
    fn from(error: ApiError) -> Self {
        match error {
            ApiError::Rejected { errors, .. } if !errors.is_empty() => AdminError::Validation(errors),
            other => AdminError::Api(other),
        }
    }
}

/// Remote resource kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Resource {
    Event,
    Participant,
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resource::Event => write!(f, "event"),
            Resource::Participant => write!(f, "participant"),
        }
    }
}

/// Operations the API adapter performs on a resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    List,
    Get,
    Create,
    Update,
    Delete,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::List => write!(f, "list"),
            Operation::Get => write!(f, "fetch"),
            Operation::Create => write!(f, "create"),
            Operation::Update => write!(f, "update"),
            Operation::Delete => write!(f, "delete"),
        }
    }
}

/// Result type alias for console operations
pub type Result<T> = std::result::Result<T, AdminError>;

/// Result type alias for API adapter operations
pub type ApiResult<T> = std::result::Result<T, ApiError>;

impl AdminError {
    /// Check if the error is recoverable
    pub fn is_recoverable(&self) -> bool {
        match self {
            AdminError::Api(e) => e.is_retryable(),
            AdminError::Validation(_) => true,
            AdminError::Config(_) => false,
            AdminError::ConfigLoad(_) => false,
            AdminError::InvalidStateTransition { .. } => true,
            AdminError::Http(_) => true,
            AdminError::Serialization(_) => false,
            AdminError::Io(_) => true,
            AdminError::UrlParse(_) => false,
            AdminError::InvalidInput(_) => true,
        }
    }

    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            AdminError::Config(_) => ErrorSeverity::Critical,
            AdminError::ConfigLoad(_) => ErrorSeverity::Critical,
            AdminError::Validation(_) => ErrorSeverity::Info,
            AdminError::InvalidInput(_) => ErrorSeverity::Info,
            AdminError::InvalidStateTransition { .. } => ErrorSeverity::Warning,
            AdminError::Api(ApiError::NotFound { .. }) => ErrorSeverity::Warning,
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
