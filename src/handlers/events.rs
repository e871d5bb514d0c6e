//! Event screens

use chrono::NaiveDate;
use tracing::debug;

use super::{render_query, render_validation_errors};
use crate::models::{Event, EventDraft, Participant};
use crate::services::{FormTarget, ServiceFactory};
use crate::state::{Host, QueryKey, Route, SubmitOutcome};
use crate::utils::errors::Result;
use crate::utils::helpers::{format_date, format_time, format_timestamp, pluralize, truncate_text};

const DESCRIPTION_PREVIEW: usize = 60;

/// Event list, filtered by title, description or location
pub fn render_event_list(events: &[Event], search: Option<&str>) -> String {
    let term = search.map(str::trim).filter(|term| !term.is_empty());
    let matching: Vec<&Event> = events
        .iter()
        .filter(|event| term.map_or(true, |term| event.matches_search(term)))
        .collect();

    if matching.is_empty() {
        return match term {
            Some(term) => format!("No events match '{}'.", term),
            None => "No events found. Create your first event to get started.".to_string(),
        };
    }

    let mut lines = vec![format!("Events ({})", matching.len())];
    for event in matching {
        lines.push(format!(
            "  #{:<4} {} | {} {} | {} | {}",
            event.id,
            event.title,
            format_date(event.date()),
            format_time(event.start_time()),
            event.location,
            event.capacity_label(event.participants.len()),
        ));
        if !event.description.is_empty() {
            lines.push(format!("        {}", truncate_text(&event.description, DESCRIPTION_PREVIEW)));
        }
    }
    lines.join("\n")
}

/// Event detail with its participants
pub fn render_event_detail(event: &Event, participants: &[Participant]) -> String {
    let mut lines = vec![
        format!("{} (#{})", event.title, event.id),
        format!("Date:      {}", format_date(event.date())),
        format!(
            "Time:      {} - {}",
            format_time(event.start_date.time()),
            format_time(event.end_date.time())
        ),
        format!("Location:  {}", event.location),
    ];
    if let Some(organizer) = event.organizer.as_deref().filter(|o| !o.is_empty()) {
        lines.push(format!("Organizer: {}", organizer));
    }

    let capacity = event.capacity_label(participants.len());
    if event.is_full(participants.len()) {
        lines.push(format!("Capacity:  {} (full)", capacity));
    } else {
        lines.push(format!("Capacity:  {}", capacity));
    }

    if !event.description.is_empty() {
        lines.push(String::new());
        lines.push(event.description.clone());
    }

    lines.push(String::new());
    if participants.is_empty() {
        lines.push("No participants registered yet.".to_string());
    } else {
        lines.push(pluralize(participants.len(), "participant", "participants"));
        for participant in participants {
            let mut line = render_participant_line(participant);
            if let Some(registered) = participant.registration_date {
                line.push_str(&format!(" (registered {})", format_timestamp(registered)));
            }
            lines.push(line);
        }
    }

    lines.join("\n")
}

pub(crate) fn render_participant_line(participant: &Participant) -> String {
    let mut line = format!("  #{:<4} {} <{}>", participant.id, participant.name, participant.email);
    if let Some(phone) = participant.phone.as_deref().filter(|p| !p.is_empty()) {
        line.push_str(&format!(" {}", phone));
    }
    line
}

/// `/events`
pub async fn handle_events_list(services: &ServiceFactory, search: Option<&str>) -> String {
    let events = services.events.events().await;
    render_query(&events, Route::Events, |events| render_event_list(events, search))
}

/// `/events/{id}`
pub async fn handle_event_detail(services: &ServiceFactory, id: i64) -> String {
    debug!(event_id = id, "Rendering event detail");
    // rendered keys refetch eagerly if a write lands while the screen is up
    let _rendered = [
        services.cache.watch(QueryKey::Event(id)),
        services.cache.watch(QueryKey::EventParticipants(id)),
    ];
    let (event, participants) = tokio::join!(
        services.events.event(id),
        services.events.event_participants(id)
    );

    render_query(&event, Route::Events, |event| match participants.data() {
        Some(participants) => render_event_detail(event, participants),
        None => render_event_detail(event, &event.participants),
    })
}

/// `/events/create`
pub async fn handle_event_create(
    services: &ServiceFactory,
    today: NaiveDate,
    fill: impl FnOnce(&mut EventDraft),
    host: &dyn Host,
) -> Result<String> {
    let form = services.events.create_form(today);
    form.edit(fill)?;
    let outcome = services.events.submit(&form, FormTarget::Create, host).await;
    Ok(render_event_outcome(&outcome))
}

/// `/events/edit/{id}`
pub async fn handle_event_edit(
    services: &ServiceFactory,
    id: i64,
    change: impl FnOnce(&mut EventDraft),
    host: &dyn Host,
) -> Result<String> {
    let form = match services.events.edit_form(id).await {
        Ok(form) => form,
        Err(error) => {
            let result = services.cache.peek::<Event>(&QueryKey::Event(id));
            if result.is_not_found() {
                return Ok(render_query(&result, Route::Events, |_| String::new()));
            }
            return Err(error.into());
        }
    };

    form.edit(change)?;
    let outcome = services.events.submit(&form, FormTarget::Edit(id), host).await;
    Ok(render_event_outcome(&outcome))
}

/// Delete from the list or detail screen
pub async fn handle_event_delete(services: &ServiceFactory, id: i64, host: &dyn Host) -> Result<String> {
    if services.events.delete(id, host).await? {
        Ok(format!("Event #{} deleted.", id))
    } else {
        Ok("Deletion cancelled.".to_string())
    }
}

fn render_event_outcome(outcome: &SubmitOutcome<Event>) -> String {
    match outcome {
        SubmitOutcome::Submitted(event) => format!("Saved event #{}: {}", event.id, event.title),
        SubmitOutcome::Invalid(errors) => {
            format!("Please fix the following:\n{}", render_validation_errors(errors))
        }
        SubmitOutcome::Failed(error) => format!("Not saved: {}", error),
        SubmitOutcome::Busy => "A save is already in progress.".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    fn at(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S").unwrap()
    }

    fn event(id: i64, title: &str, location: &str) -> Event {
        Event {
            id,
            title: title.to_string(),
            description: "An evening of talks and demos".to_string(),
            start_date: at("2024-03-10T18:00:00"),
            end_date: at("2024-03-10T02:00:00"),
            location: location.to_string(),
            organizer: None,
            max_participants: Some(2),
            created_at: None,
            updated_at: None,
            participants: Vec::new(),
        }
    }

    fn participant(id: i64, name: &str) -> Participant {
        Participant {
            id,
            event_id: 1,
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            phone: None,
            registration_date: None,
        }
    }

    #[test]
    fn test_list_search_filters_by_location() {
        let events = vec![event(1, "Rust Meetup", "Berlin"), event(2, "Go Meetup", "Paris")];

        let all = render_event_list(&events, None);
        assert!(all.starts_with("Events (2)"));

        let filtered = render_event_list(&events, Some("paris"));
        assert!(filtered.contains("Go Meetup"));
        assert!(!filtered.contains("Rust Meetup"));

        assert_eq!(render_event_list(&events, Some("Tokyo")), "No events match 'Tokyo'.");
        assert!(render_event_list(&[], Some("  ")).starts_with("No events found"));
    }

    #[test]
    fn test_detail_shows_capacity_and_participants() {
        let detail = render_event_detail(&event(1, "Rust Meetup", "Berlin"), &[
            participant(1, "Ada"),
            participant(2, "Grace"),
        ]);

        assert!(detail.contains("Capacity:  2/2 (full)"));
        assert!(detail.contains("Time:      18:00 - 02:00"));
        assert!(detail.contains("2 participants"));
        assert!(detail.contains("<grace@example.com>"));
    }

    #[test]
    fn test_detail_shows_registration_time() {
        let mut ada = participant(1, "Ada");
        ada.registration_date = Some(at("2024-03-01T10:05:00"));
        let detail = render_event_detail(&event(1, "Rust Meetup", "Berlin"), &[ada, participant(2, "Grace")]);

        assert!(detail.contains("<ada@example.com> (registered 2024-03-01 10:05)"));
        assert!(detail.ends_with("<grace@example.com>"));
    }

    #[test]
    fn test_detail_without_participants() {
        let detail = render_event_detail(&event(1, "Rust Meetup", "Berlin"), &[]);
        assert!(detail.contains("No participants registered yet."));
        assert!(detail.contains("Capacity:  0/2"));
    }
}
