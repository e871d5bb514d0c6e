//! Event administration console
//!
//! Lists, creates, edits and deletes events and their participants against
//! a remote HTTP API. The library provides the API client, a shared query
//! cache with invalidation, a validated form controller and the text
//! screens used by the `event-admin` binary.

pub mod config;
pub mod handlers;
pub mod models;
pub mod services;
pub mod state;
pub mod utils;

// Re-export commonly used types
pub use config::Settings;
pub use utils::errors::{AdminError, ApiError, Result};

// Re-export main components for easy access
pub use services::ServiceFactory;
pub use state::{FormController, QueryCache, QueryKey};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Get library information
pub fn info() -> String {
    format!("{} v{}", NAME, VERSION)
}
