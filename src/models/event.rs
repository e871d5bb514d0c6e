//! Event model

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use super::participant::Participant;
use super::null_as_default;
use crate::state::schema::{min_length, optional, required, Rule, Schema};
use crate::utils::errors::{AdminError, Result};
use crate::utils::helpers::{contains_ignore_case, format_time, parse_date, parse_positive_int, parse_time};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: i64,
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    pub start_date: NaiveDateTime,
    pub end_date: NaiveDateTime,
    #[serde(default, deserialize_with = "null_as_default")]
    pub location: String,
    #[serde(default)]
    pub organizer: Option<String>,
    #[serde(default)]
    pub max_participants: Option<u32>,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub updated_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub participants: Vec<Participant>,
}

impl Event {
    pub fn date(&self) -> NaiveDate {
        self.start_date.date()
    }

    pub fn start_time(&self) -> NaiveTime {
        self.start_date.time()
    }

    /// "attending/capacity", or just the count when the event has no capacity
    pub fn capacity_label(&self, participant_count: usize) -> String {
        match self.max_participants {
            Some(max) => format!("{}/{}", participant_count, max),
            None => participant_count.to_string(),
        }
    }

    /// Capacity is advisory; this only informs the screens
    pub fn is_full(&self, participant_count: usize) -> bool {
        self.max_participants
            .map_or(false, |max| participant_count >= max as usize)
    }

    pub fn matches_search(&self, term: &str) -> bool {
        contains_ignore_case(&self.title, term)
            || contains_ignore_case(&self.description, term)
            || contains_ignore_case(&self.location, term)
    }
}

/// Request body for create and full-replace update
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventPayload {
    pub title: String,
    pub description: String,
    pub start_date: NaiveDateTime,
    pub end_date: NaiveDateTime,
    pub location: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_participants: Option<u32>,
}

const DEFAULT_START: (u32, u32) = (9, 0);
const DEFAULT_END: (u32, u32) = (17, 0);
const DEFAULT_DURATION_HOURS: u32 = 8;

/// Start and end instants derived from a form's date and optional time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schedule {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl Schedule {
    /// Without a time the event runs 09:00-17:00. With a time it ends eight
    /// hours later on the same calendar date, hours taken modulo 24, so a
    /// late start produces an end earlier in that day.
    pub fn derive(date: NaiveDate, time: Option<NaiveTime>) -> Self {
        let (start_time, end_time) = match time {
            Some(time) => {
                let start = hm(time.hour(), time.minute());
                let end = hm((time.hour() + DEFAULT_DURATION_HOURS) % 24, time.minute());
                (start, end)
            }
            None => (hm(DEFAULT_START.0, DEFAULT_START.1), hm(DEFAULT_END.0, DEFAULT_END.1)),
        };

        Self {
            start: date.and_time(start_time),
            end: date.and_time(end_time),
        }
    }
}

fn hm(hour: u32, minute: u32) -> NaiveTime {
    // hour < 24 and minute < 60 by construction
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or_default()
}

/// Event form values as typed by the user
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventDraft {
    pub title: String,
    pub description: String,
    /// `YYYY-MM-DD`
    pub date: String,
    /// `HH:MM`, optional
    pub time: String,
    pub location: String,
    pub organizer: String,
    pub max_participants: String,
}

impl EventDraft {
    /// Empty create form dated `today`
    pub fn blank(today: NaiveDate) -> Self {
        Self {
            date: today.format("%Y-%m-%d").to_string(),
            ..Self::default()
        }
    }

    /// Edit form pre-filled from an existing event
    pub fn from_event(event: &Event) -> Self {
        Self {
            title: event.title.clone(),
            description: event.description.clone(),
            date: event.date().format("%Y-%m-%d").to_string(),
            time: format_time(event.start_time()),
            location: event.location.clone(),
            organizer: event.organizer.clone().unwrap_or_default(),
            max_participants: event
                .max_participants
                .map(|n| n.to_string())
                .unwrap_or_default(),
        }
    }

    pub fn schedule(&self) -> Result<Schedule> {
        let date = parse_date(&self.date)
            .ok_or_else(|| AdminError::InvalidInput(format!("Invalid event date: '{}'", self.date)))?;

        let time = if self.time.trim().is_empty() {
            None
        } else {
            Some(parse_time(&self.time).ok_or_else(|| {
                AdminError::InvalidInput(format!("Invalid event time: '{}'", self.time))
            })?)
        };

        Ok(Schedule::derive(date, time))
    }

    /// Build the request body; the organizer stays client-side
    pub fn to_payload(&self) -> Result<EventPayload> {
        let schedule = self.schedule()?;
        let max_participants = if self.max_participants.trim().is_empty() {
            None
        } else {
            Some(parse_positive_int(&self.max_participants).ok_or_else(|| {
                AdminError::InvalidInput(format!(
                    "Invalid maximum participants: '{}'",
                    self.max_participants
                ))
            })?)
        };

        Ok(EventPayload {
            title: self.title.clone(),
            description: self.description.clone(),
            start_date: schedule.start,
            end_date: schedule.end,
            location: self.location.clone(),
            max_participants,
        })
    }
}

/// Validation rules for the event form
pub fn event_schema() -> Schema<EventDraft> {
    Schema::new()
        .field("title", vec![
            min_length(|d: &EventDraft| d.title.as_str(), 3, "Title must be at least 3 characters."),
        ])
        .field("description", vec![
            min_length(|d: &EventDraft| d.description.as_str(), 10, "Description must be at least 10 characters."),
        ])
        .field("date", vec![
            required(|d: &EventDraft| d.date.as_str(), "Event date is required."),
            Rule::new(|d: &EventDraft| parse_date(&d.date).is_some(), "Event date must be a valid date."),
        ])
        .field("location", vec![
            min_length(|d: &EventDraft| d.location.as_str(), 3, "Location must be at least 3 characters."),
        ])
        .field("max_participants", vec![
            optional(
                |d: &EventDraft| d.max_participants.as_str(),
                |v| parse_positive_int(v).is_some(),
                "Maximum participants must be a positive integer.",
            ),
        ])
}
