//! Event service
//!
//! Reads go through the query cache; writes go through the API client and
//! then invalidate every key whose result embeds the written event.

use chrono::NaiveDate;
use tracing::info;

use super::api::ApiClient;
use super::{failure_reason, FormTarget};
use crate::models::{event_schema, Event, EventDraft, Participant};
use crate::state::{FormController, Host, Notification, QueryCache, QueryKey, QueryResult, Route, SubmitOutcome};
use crate::utils::errors::{AdminError, ApiResult, Result};
use crate::utils::logging::log_user_action;

pub const DELETE_EVENT_PROMPT: &str = "Are you sure you want to delete this event? This action cannot be undone.";

pub type EventForm = FormController<EventDraft>;

#[derive(Clone, Debug)]
pub struct EventService {
    api: ApiClient,
    cache: QueryCache,
}

impl EventService {
    pub fn new(api: ApiClient, cache: QueryCache) -> Self {
        Self { api, cache }
    }

    pub async fn events(&self) -> QueryResult<Vec<Event>> {
        let api = self.api.clone();
        self.cache
            .read(QueryKey::Events, move || {
                let api = api.clone();
                async move { api.list_events().await }
            })
            .await
    }

    pub async fn event(&self, id: i64) -> QueryResult<Event> {
        let api = self.api.clone();
        self.cache
            .read(QueryKey::Event(id), move || {
                let api = api.clone();
                async move { api.get_event(id).await }
            })
            .await
    }

    pub async fn event_participants(&self, event_id: i64) -> QueryResult<Vec<Participant>> {
        let api = self.api.clone();
        self.cache
            .read(QueryKey::EventParticipants(event_id), move || {
                let api = api.clone();
                async move { api.list_event_participants(event_id).await }
            })
            .await
    }

    /// Blank create form dated `today`
    pub fn create_form(&self, today: NaiveDate) -> EventForm {
        FormController::new("event", event_schema(), EventDraft::blank(today))
    }

    /// Edit form pre-filled from the cached or freshly fetched event
    pub async fn edit_form(&self, id: i64) -> ApiResult<EventForm> {
        let event = self.event(id).await.into_result(&QueryKey::Event(id))?;
        Ok(FormController::new("event", event_schema(), EventDraft::from_event(&event)))
    }

    /// Submit an event form and apply its effects
    pub async fn submit(&self, form: &EventForm, target: FormTarget, host: &dyn Host) -> SubmitOutcome<Event> {
        let api = self.api.clone();
        let outcome = form
            .submit(|draft| async move {
                let payload = draft.to_payload()?;
                let event = match target {
                    FormTarget::Create => api.create_event(&payload).await?,
                    FormTarget::Edit(id) => api.update_event(id, &payload).await?,
                };
                Ok::<Event, AdminError>(event)
            })
            .await;

        match &outcome {
            SubmitOutcome::Submitted(event) => {
                let marked = self
                    .cache
                    .invalidate_many(&QueryKey::affected_by_event_write(event.id));
                info!(event_id = event.id, invalidated = marked, "Event saved");
                log_user_action(target.verb(), Some(Route::EventDetail(event.id).to_string().as_str()), None);

                host.notify(Notification::success(format!("Event {} successfully", target.past_tense())));
                host.navigate(Route::Events);
            }
            SubmitOutcome::Failed(error) => {
                host.notify(Notification::error(format!(
                    "Failed to {} event: {}",
                    target.verb(),
                    failure_reason(error)
                )));
            }
            SubmitOutcome::Invalid(_) | SubmitOutcome::Busy => {}
        }

        outcome
    }

    /// Delete an event after confirmation. Returns `Ok(false)` when the user declined.
    pub async fn delete(&self, id: i64, host: &dyn Host) -> Result<bool> {
        if !host.confirm(DELETE_EVENT_PROMPT) {
            log_user_action("delete_cancelled", Some(Route::EventDetail(id).to_string().as_str()), None);
            return Ok(false);
        }

        match self.api.delete_event(id).await {
            Ok(()) => {
                // participants are removed with the event
                let marked = self.cache.invalidate_where(|key| {
                    key.depends_on_event(id) || matches!(key, QueryKey::Participants | QueryKey::Participant(_))
                });
                info!(event_id = id, invalidated = marked, "Event deleted");
                log_user_action("delete", Some(Route::EventDetail(id).to_string().as_str()), None);

                host.notify(Notification::success("Event deleted successfully"));
                host.navigate(Route::Events);
                Ok(true)
            }
            Err(error) => {
                host.notify(Notification::error(format!("Failed to delete event: {}", error.reason())));
                Err(error.into())
            }
        }
    }
}
