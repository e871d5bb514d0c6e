//! Query identities used by the query cache

use std::fmt;

use serde::Serialize;

use crate::utils::errors::{Operation, Resource};

/// Identity of one logical read; two reads with equal keys share a cache entry
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "id", rename_all = "camelCase")]
pub enum QueryKey {
    /// `["events"]`
    Events,
    /// `["event", id]`
    Event(i64),
    /// `["eventParticipants", event_id]`
    EventParticipants(i64),
    /// `["participants"]`
    Participants,
    /// `["participant", id]`
    Participant(i64),
}

impl QueryKey {
    pub fn kind(&self) -> &'static str {
        match self {
            QueryKey::Events => "events",
            QueryKey::Event(_) => "event",
            QueryKey::EventParticipants(_) => "eventParticipants",
            QueryKey::Participants => "participants",
            QueryKey::Participant(_) => "participant",
        }
    }

    /// Resource returned by the fetch behind this key
    pub fn resource(&self) -> Resource {
        match self {
            QueryKey::Events | QueryKey::Event(_) => Resource::Event,
            QueryKey::EventParticipants(_) | QueryKey::Participants | QueryKey::Participant(_) => {
                Resource::Participant
            }
        }
    }

    pub fn operation(&self) -> Operation {
        match self {
            QueryKey::Event(_) | QueryKey::Participant(_) => Operation::Get,
            _ => Operation::List,
        }
    }

    /// Whether this key's result could contain data about the given event
    pub fn depends_on_event(&self, event_id: i64) -> bool {
        match self {
            QueryKey::Events => true,
            QueryKey::Event(id) | QueryKey::EventParticipants(id) => *id == event_id,
            _ => false,
        }
    }

    /// Keys whose results change when an event is created or updated
    pub fn affected_by_event_write(event_id: i64) -> Vec<QueryKey> {
        vec![QueryKey::Events, QueryKey::Event(event_id)]
    }

    /// Keys whose results change when a participant of `event_id` is written.
    /// A participant moved between events also affects the previous event's list.
    pub fn affected_by_participant_write(
        participant_id: i64,
        event_id: i64,
        previous_event_id: Option<i64>,
    ) -> Vec<QueryKey> {
        let mut keys = vec![
            QueryKey::Participants,
            QueryKey::Participant(participant_id),
            QueryKey::EventParticipants(event_id),
        ];
        if let Some(previous) = previous_event_id.filter(|prev| *prev != event_id) {
            keys.push(QueryKey::EventParticipants(previous));
        }
        keys
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryKey::Events | QueryKey::Participants => write!(f, "[\"{}\"]", self.kind()),
            QueryKey::Event(id) | QueryKey::EventParticipants(id) | QueryKey::Participant(id) => {
                write!(f, "[\"{}\", {}]", self.kind(), id)
            }
        }
    }
}
