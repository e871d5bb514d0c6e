//! Participant service

use tracing::info;

use super::api::ApiClient;
use super::events::EventService;
use super::{failure_reason, FormTarget};
use crate::models::{participant_schema, Participant, ParticipantDraft};
use crate::state::{FormController, Host, Notification, QueryCache, QueryKey, QueryResult, Route, SubmitOutcome};
use crate::utils::errors::{AdminError, ApiResult, Result};
use crate::utils::logging::log_user_action;

pub const DELETE_PARTICIPANT_PROMPT: &str = "Are you sure you want to delete this participant?";

pub type ParticipantForm = FormController<ParticipantDraft>;

#[derive(Clone, Debug)]
pub struct ParticipantService {
    api: ApiClient,
    cache: QueryCache,
    events: EventService,
}

impl ParticipantService {
    pub fn new(api: ApiClient, cache: QueryCache, events: EventService) -> Self {
        Self { api, cache, events }
    }

    pub async fn participants(&self) -> QueryResult<Vec<Participant>> {
        let api = self.api.clone();
        self.cache
            .read(QueryKey::Participants, move || {
                let api = api.clone();
                async move { api.list_participants().await }
            })
            .await
    }

    pub async fn participant(&self, id: i64) -> QueryResult<Participant> {
        let api = self.api.clone();
        self.cache
            .read(QueryKey::Participant(id), move || {
                let api = api.clone();
                async move { api.get_participant(id).await }
            })
            .await
    }

    /// Form whose event picker offers exactly `selectable_events`
    pub fn participant_form(
        &self,
        defaults: ParticipantDraft,
        selectable_events: impl IntoIterator<Item = i64>,
    ) -> ParticipantForm {
        FormController::new("participant", participant_schema(selectable_events), defaults)
    }

    /// Create form, optionally bound to an event, offering the currently known events
    pub async fn create_form(&self, event_id: Option<i64>) -> ApiResult<ParticipantForm> {
        let selectable = self.selectable_events().await?;
        let defaults = event_id.map(ParticipantDraft::for_event).unwrap_or_default();
        Ok(self.participant_form(defaults, selectable))
    }

    /// Edit form pre-filled from the participant
    pub async fn edit_form(&self, id: i64) -> ApiResult<ParticipantForm> {
        let participant = self.participant(id).await.into_result(&QueryKey::Participant(id))?;
        let selectable = self.selectable_events().await?;
        Ok(self.participant_form(ParticipantDraft::from_participant(&participant), selectable))
    }

    async fn selectable_events(&self) -> ApiResult<Vec<i64>> {
        let events = self.events.events().await.into_result(&QueryKey::Events)?;
        Ok(events.iter().map(|event| event.id).collect())
    }

    /// Submit a participant form, then navigate to `return_to`
    pub async fn submit(
        &self,
        form: &ParticipantForm,
        target: FormTarget,
        return_to: Route,
        host: &dyn Host,
    ) -> SubmitOutcome<Participant> {
        // the form was opened on the participant's current event
        let previous_event = match target {
            FormTarget::Edit(id) => form.defaults().event_id.or_else(|| {
                self.cache
                    .peek::<Participant>(&QueryKey::Participant(id))
                    .data()
                    .map(|participant| participant.event_id)
            }),
            FormTarget::Create => None,
        };

        let api = self.api.clone();
        let outcome = form
            .submit(|draft| async move {
                let payload = draft.to_payload()?;
                let participant = match target {
                    FormTarget::Create => api.create_participant(&payload).await?,
                    FormTarget::Edit(id) => api.update_participant(id, &payload).await?,
                };
                Ok::<Participant, AdminError>(participant)
            })
            .await;

        match &outcome {
            SubmitOutcome::Submitted(participant) => {
                let marked = self.invalidate_after_write(participant, previous_event);
                info!(participant_id = participant.id, invalidated = marked, "Participant saved");
                log_user_action(
                    target.verb(),
                    Some(Route::ParticipantEdit(participant.id).to_string().as_str()),
                    None,
                );

                host.notify(Notification::success(format!(
                    "Participant {} successfully",
                    target.past_tense()
                )));
                host.navigate(return_to);
            }
            SubmitOutcome::Failed(error) => {
                host.notify(Notification::error(format!(
                    "Failed to {} participant: {}",
                    target.verb(),
                    failure_reason(error)
                )));
            }
            SubmitOutcome::Invalid(_) | SubmitOutcome::Busy => {}
        }

        outcome
    }

    /// Delete a participant after confirmation. Returns `Ok(false)` when the user declined.
    pub async fn delete(&self, participant: &Participant, host: &dyn Host) -> Result<bool> {
        if !host.confirm(DELETE_PARTICIPANT_PROMPT) {
            log_user_action(
                "delete_cancelled",
                Some(Route::ParticipantEdit(participant.id).to_string().as_str()),
                None,
            );
            return Ok(false);
        }

        match self.api.delete_participant(participant.id).await {
            Ok(()) => {
                let marked = self.invalidate_after_write(participant, None);
                info!(participant_id = participant.id, invalidated = marked, "Participant deleted");
                log_user_action(
                    "delete",
                    Some(Route::ParticipantEdit(participant.id).to_string().as_str()),
                    None,
                );

                host.notify(Notification::success("Participant deleted successfully"));
                Ok(true)
            }
            Err(error) => {
                host.notify(Notification::error(format!(
                    "Failed to delete participant: {}",
                    error.reason()
                )));
                Err(error.into())
            }
        }
    }

    /// Participant lists plus the event payloads that embed them
    fn invalidate_after_write(&self, participant: &Participant, previous_event: Option<i64>) -> usize {
        let keys = QueryKey::affected_by_participant_write(participant.id, participant.event_id, previous_event);
        self.cache.invalidate_where(|key| {
            keys.contains(key)
                || key.depends_on_event(participant.event_id)
                || previous_event.map_or(false, |previous| key.depends_on_event(previous))
        })
    }
}
