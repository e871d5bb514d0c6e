//! Participant model

use std::collections::BTreeSet;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::null_as_default;
use crate::state::schema::{min_length, Rule, Schema};
use crate::utils::errors::{AdminError, Result};
use crate::utils::helpers::{contains_ignore_case, is_valid_email};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    pub id: i64,
    pub event_id: i64,
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub registration_date: Option<NaiveDateTime>,
}

impl Participant {
    pub fn matches_search(&self, term: &str) -> bool {
        contains_ignore_case(&self.name, term) || contains_ignore_case(&self.email, term)
    }
}

/// Request body for create and full-replace update
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantPayload {
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub event_id: i64,
}

/// Participant form values as typed by the user
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantDraft {
    pub name: String,
    pub email: String,
    pub phone: String,
    /// Unset until an event is chosen
    pub event_id: Option<i64>,
}

impl ParticipantDraft {
    /// Empty form already bound to an event
    pub fn for_event(event_id: i64) -> Self {
        Self {
            event_id: Some(event_id),
            ..Self::default()
        }
    }

    pub fn from_participant(participant: &Participant) -> Self {
        Self {
            name: participant.name.clone(),
            email: participant.email.clone(),
            phone: participant.phone.clone().unwrap_or_default(),
            event_id: Some(participant.event_id),
        }
    }

    pub fn to_payload(&self) -> Result<ParticipantPayload> {
        let event_id = self
            .event_id
            .ok_or_else(|| AdminError::InvalidInput("No event selected".to_string()))?;
        let phone = self.phone.trim();

        Ok(ParticipantPayload {
            name: self.name.clone(),
            email: self.email.trim().to_string(),
            phone: (!phone.is_empty()).then(|| phone.to_string()),
            event_id,
        })
    }
}

/// Validation rules for the participant form
///
/// `selectable_events` are the ids offered in the event picker; a draft
/// pointing anywhere else is rejected.
pub fn participant_schema(selectable_events: impl IntoIterator<Item = i64>) -> Schema<ParticipantDraft> {
    let selectable: BTreeSet<i64> = selectable_events.into_iter().collect();

    Schema::new()
        .field("name", vec![
            min_length(|d: &ParticipantDraft| d.name.as_str(), 2, "Name must be at least 2 characters."),
        ])
        .field("email", vec![
            Rule::new(|d: &ParticipantDraft| is_valid_email(d.email.trim()), "Please enter a valid email address."),
        ])
        .field("event_id", vec![
            Rule::new(|d: &ParticipantDraft| d.event_id.map_or(false, |id| id > 0), "Please select an event."),
            Rule::new(
                move |d: &ParticipantDraft| d.event_id.map_or(false, |id| selectable.contains(&id)),
                "Selected event does not exist.",
            ),
        ])
}
