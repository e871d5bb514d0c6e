//! Client-side state: query cache, form controller and their supporting types

pub mod effects;
pub mod form;
pub mod query_cache;
pub mod query_key;
pub mod schema;

// Re-export commonly used state components
pub use effects::{Host, Notification, NotificationLevel, Route};
pub use form::{FormController, FormState, SubmitOutcome};
pub use query_cache::{CacheEvent, CacheStats, QueryCache, QueryResult, QueryStatus, QueryWatch};
pub use query_key::QueryKey;
pub use schema::{Rule, Schema, ValidationErrors};
