//! JSON fixtures shaped like the events API responses

use serde_json::{json, Value};

use event_admin::models::{EventDraft, ParticipantDraft};

/// Event as returned by the API, with embedded participants
pub fn event_json(id: i64, title: &str, participants: Vec<Value>) -> Value {
    json!({
        "id": id,
        "title": title,
        "description": "A full day of talks and workshops",
        "start_date": "2024-03-10T09:00:00",
        "end_date": "2024-03-10T17:00:00",
        "location": "Main Hall",
        "max_participants": 100,
        "created_at": "2024-02-01T12:00:00.123456",
        "updated_at": "2024-02-01T12:00:00.123456",
        "participants": participants
    })
}

pub fn participant_json(id: i64, event_id: i64, name: &str, email: &str) -> Value {
    json!({
        "id": id,
        "event_id": event_id,
        "name": name,
        "email": email,
        "phone": null,
        "registration_date": "2024-02-02T08:30:00"
    })
}

pub fn ada(event_id: i64) -> Value {
    participant_json(1, event_id, "Ada Lovelace", "ada@example.com")
}

pub fn grace(event_id: i64) -> Value {
    participant_json(2, event_id, "Grace Hopper", "grace@example.com")
}

/// Draft that passes every event rule
pub fn valid_event_draft() -> EventDraft {
    EventDraft {
        title: "Tech Conference".to_string(),
        description: "A full day of talks and workshops".to_string(),
        date: "2024-03-10".to_string(),
        time: String::new(),
        location: "Main Hall".to_string(),
        organizer: "ACME".to_string(),
        max_participants: "100".to_string(),
    }
}

/// Request body the API receives for `valid_event_draft`
pub fn valid_event_payload() -> Value {
    json!({
        "title": "Tech Conference",
        "description": "A full day of talks and workshops",
        "start_date": "2024-03-10T09:00:00",
        "end_date": "2024-03-10T17:00:00",
        "location": "Main Hall",
        "max_participants": 100
    })
}

pub fn valid_participant_draft(event_id: i64) -> ParticipantDraft {
    ParticipantDraft {
        name: "Ada Lovelace".to_string(),
        email: "ada@example.com".to_string(),
        phone: String::new(),
        event_id: Some(event_id),
    }
}
