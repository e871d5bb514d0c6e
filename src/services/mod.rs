//! Services module
//!
//! The API client plus the entity services the screens call

pub mod api;
pub mod events;
pub mod participants;

// Re-export commonly used services
pub use api::ApiClient;
pub use events::{EventForm, EventService, DELETE_EVENT_PROMPT};
pub use participants::{ParticipantForm, ParticipantService, DELETE_PARTICIPANT_PROMPT};

use crate::config::settings::Settings;
use crate::state::QueryCache;
use crate::utils::errors::{AdminError, Result};

/// Whether a submitted form creates a new entity or replaces an existing one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormTarget {
    Create,
    Edit(i64),
}

impl FormTarget {
    pub fn verb(&self) -> &'static str {
        match self {
            FormTarget::Create => "create",
            FormTarget::Edit(_) => "update",
        }
    }

    pub fn past_tense(&self) -> &'static str {
        match self {
            FormTarget::Create => "created",
            FormTarget::Edit(_) => "updated",
        }
    }
}

/// Text shown to the user for a failed write
pub(crate) fn failure_reason(error: &AdminError) -> String {
    match error {
        AdminError::Api(api) => api.reason(),
        AdminError::InvalidInput(message) => message.clone(),
        AdminError::Validation(errors) => errors.to_string(),
        other => other.to_string(),
    }
}

/// Service factory wiring the API client and shared cache into the entity services
#[derive(Clone, Debug)]
pub struct ServiceFactory {
    pub api: ApiClient,
    pub cache: QueryCache,
    pub events: EventService,
    pub participants: ParticipantService,
}

impl ServiceFactory {
    /// Create all services from settings
    pub fn new(settings: &Settings) -> Result<Self> {
        let api = ApiClient::new(&settings.api)?;
        let cache = QueryCache::new(settings.cache.clone());
        Ok(Self::with_parts(api, cache))
    }

    pub fn with_parts(api: ApiClient, cache: QueryCache) -> Self {
        let events = EventService::new(api.clone(), cache.clone());
        let participants = ParticipantService::new(api.clone(), cache.clone(), events.clone());

        Self {
            api,
            cache,
            events,
            participants,
        }
    }
}
