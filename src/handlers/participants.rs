//! Participant screens

use std::collections::HashMap;

use super::events::render_participant_line;
use super::{render_query, render_validation_errors};
use crate::models::{Event, Participant, ParticipantDraft};
use crate::services::{FormTarget, ServiceFactory};
use crate::state::{Host, QueryKey, Route, SubmitOutcome};
use crate::utils::errors::Result;

/// Participant list filtered by name or email, each with its event title
pub fn render_participant_list(participants: &[Participant], events: &[Event], search: Option<&str>) -> String {
    let titles: HashMap<i64, &str> = events.iter().map(|e| (e.id, e.title.as_str())).collect();
    let term = search.map(str::trim).filter(|term| !term.is_empty());
    let matching: Vec<&Participant> = participants
        .iter()
        .filter(|p| term.map_or(true, |term| p.matches_search(term)))
        .collect();

    if matching.is_empty() {
        return match term {
            Some(term) => format!("No participants match '{}'.", term),
            None => "No participants found.".to_string(),
        };
    }

    let mut lines = vec![format!("Participants ({})", matching.len())];
    for participant in matching {
        let event = titles
            .get(&participant.event_id)
            .map(|title| title.to_string())
            .unwrap_or_else(|| format!("event #{}", participant.event_id));
        lines.push(format!("{} | {}", render_participant_line(participant), event));
    }
    lines.join("\n")
}

/// `/participants`
pub async fn handle_participants_list(services: &ServiceFactory, search: Option<&str>) -> String {
    let (participants, events) = tokio::join!(services.participants.participants(), services.events.events());
    let events: &[Event] = events.data().map(Vec::as_slice).unwrap_or(&[]);

    render_query(&participants, Route::Participants, |participants| {
        render_participant_list(participants, events, search)
    })
}

/// `/participants/create`, optionally pre-bound to an event
pub async fn handle_participant_create(
    services: &ServiceFactory,
    event_id: Option<i64>,
    fill: impl FnOnce(&mut ParticipantDraft),
    host: &dyn Host,
) -> Result<String> {
    let form = services.participants.create_form(event_id).await?;
    form.edit(fill)?;

    let return_to = event_id.map_or(Route::Participants, Route::EventDetail);
    let outcome = services
        .participants
        .submit(&form, FormTarget::Create, return_to, host)
        .await;
    Ok(render_participant_outcome(&outcome))
}

/// `/participants/edit/{id}`
pub async fn handle_participant_edit(
    services: &ServiceFactory,
    id: i64,
    change: impl FnOnce(&mut ParticipantDraft),
    host: &dyn Host,
) -> Result<String> {
    let form = match services.participants.edit_form(id).await {
        Ok(form) => form,
        Err(error) => {
            let result = services.cache.peek::<Participant>(&QueryKey::Participant(id));
            if result.is_not_found() {
                return Ok(render_query(&result, Route::Participants, |_| String::new()));
            }
            return Err(error.into());
        }
    };

    form.edit(change)?;
    let outcome = services
        .participants
        .submit(&form, FormTarget::Edit(id), Route::Participants, host)
        .await;
    Ok(render_participant_outcome(&outcome))
}

/// Delete from the list or event detail screen
pub async fn handle_participant_delete(services: &ServiceFactory, id: i64, host: &dyn Host) -> Result<String> {
    let participant = services.participants.participant(id).await;
    let participant = match participant.into_result(&QueryKey::Participant(id)) {
        Ok(participant) => participant,
        Err(error) if !error.is_retryable() => return Ok(format!("{}.", error.reason())),
        Err(error) => return Err(error.into()),
    };

    if services.participants.delete(&participant, host).await? {
        Ok(format!("Participant #{} deleted.", id))
    } else {
        Ok("Deletion cancelled.".to_string())
    }
}

fn render_participant_outcome(outcome: &SubmitOutcome<Participant>) -> String {
    match outcome {
        SubmitOutcome::Submitted(participant) => {
            format!("Saved participant #{}: {}", participant.id, participant.name)
        }
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

    fn participant(id: i64, event_id: i64, name: &str, email: &str) -> Participant {
        Participant {
            id,
            event_id,
            name: name.to_string(),
            email: email.to_string(),
            phone: Some("+1234567890".to_string()),
            registration_date: None,
        }
    }

    fn event(id: i64, title: &str) -> Event {
        let at = NaiveDateTime::parse_from_str("2024-03-10T09:00:00", "%Y-%m-%dT%H:%M:%S").unwrap();
        Event {
            id,
            title: title.to_string(),
            description: String::new(),
            start_date: at,
            end_date: at,
            location: "Hall".to_string(),
            organizer: None,
            max_participants: None,
            created_at: None,
            updated_at: None,
            participants: Vec::new(),
        }
    }

    #[test]
    fn test_list_shows_event_titles() {
        let list = render_participant_list(
            &[participant(1, 1, "Ada", "ada@example.com"), participant(2, 9, "Grace", "grace@example.com")],
            &[event(1, "Rust Meetup")],
            None,
        );

        assert!(list.contains("Ada <ada@example.com> +1234567890 | Rust Meetup"));
        assert!(list.contains("| event #9"));
    }

    #[test]
    fn test_list_search_by_email() {
        let participants = [participant(1, 1, "Ada", "ada@example.com"), participant(2, 1, "Grace", "grace@navy.mil")];
        let list = render_participant_list(&participants, &[], Some("navy"));

        assert!(list.starts_with("Participants (1)"));
        assert!(list.contains("Grace"));
        assert_eq!(render_participant_list(&participants, &[], Some("zzz")), "No participants match 'zzz'.");
    }
}
