//! Data models for the events API

pub mod event;
pub mod participant;

pub use event::{event_schema, Event, EventDraft, EventPayload, Schedule};
pub use participant::{participant_schema, Participant, ParticipantDraft, ParticipantPayload};

use serde::{Deserialize, Deserializer};

/// Decode an explicit JSON `null` as the type's default
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
