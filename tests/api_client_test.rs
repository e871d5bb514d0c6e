//! Events API client against a mock server

mod helpers;

use std::time::Duration;

use assert_matches::assert_matches;
use chrono::NaiveDate;
use serde_json::json;

use event_admin::config::ApiConfig;
use event_admin::models::{EventPayload, ParticipantPayload};
use event_admin::services::ApiClient;
use event_admin::utils::errors::{ApiError, Operation, Resource};
use helpers::*;

#[tokio::test]
async fn test_list_events_decodes_nested_participants() {
    init_test_logging();
    let mock = ApiMockServer::new().await;
    mock.respond("GET", "/events", 200, json!([event_json(1, "Tech Conference", vec![ada(1), grace(1)])]))
        .await;

    let events = mock.client().list_events().await.unwrap();

    assert_eq!(events.len(), 1);
    assert_eq!(events[0].title, "Tech Conference");
    assert_eq!(events[0].participants.len(), 2);
    assert_eq!(events[0].date(), NaiveDate::from_ymd_opt(2024, 3, 10).unwrap());
}

#[tokio::test]
async fn test_null_optional_fields_decode() {
    let mock = ApiMockServer::new().await;
    let mut event = event_json(3, "Sparse", vec![]);
    event["description"] = json!(null);
    event["location"] = json!(null);
    event["max_participants"] = json!(null);
    mock.respond("GET", "/events/3", 200, event).await;

    let event = mock.client().get_event(3).await.unwrap();

    assert_eq!(event.description, "");
    assert_eq!(event.location, "");
    assert_eq!(event.max_participants, None);
}

#[tokio::test]
async fn test_get_missing_event_is_not_found() {
    let mock = ApiMockServer::new().await;
    mock.fail("GET", "/events/99", 404, "Not found").await;

    let error = mock.client().get_event(99).await.unwrap_err();

    assert_eq!(error, ApiError::NotFound { resource: Resource::Event, id: 99 });
    assert!(!error.is_retryable());
}

#[tokio::test]
async fn test_delete_missing_participant_is_request_failed() {
    let mock = ApiMockServer::new().await;
    mock.fail("DELETE", "/participants/5", 404, "Not found").await;

    let error = mock.client().delete_participant(5).await.unwrap_err();

    assert_matches!(
        error,
        ApiError::RequestFailed {
            resource: Resource::Participant,
            operation: Operation::Delete,
            status: Some(404),
            ..
        }
    );
}

#[tokio::test]
async fn test_server_message_becomes_reason() {
    let mock = ApiMockServer::new().await;
    mock.fail("POST", "/participants", 400, "Event has reached maximum participants").await;

    let payload = ParticipantPayload {
        name: "Ada Lovelace".into(),
        email: "ada@example.com".into(),
        phone: None,
        event_id: 1,
    };
    let error = mock.client().create_participant(&payload).await.unwrap_err();

    assert_eq!(error.reason(), "Event has reached maximum participants");
    assert_eq!(
        error.to_string(),
        "Failed to create participant: Event has reached maximum participants"
    );
}

#[tokio::test]
async fn test_schema_rejection_carries_field_errors() {
    let mock = ApiMockServer::new().await;
    mock.reject("POST", "/events", json!({ "title": ["Shorter than minimum length 3."], "end_date": ["Not a valid datetime."] }))
        .await;

    let payload: EventPayload = valid_event_draft().to_payload().unwrap();
    let error = mock.client().create_event(&payload).await.unwrap_err();

    assert_matches!(&error, ApiError::Rejected { resource: Resource::Event, operation: Operation::Create, errors, .. }
        if errors.get("title") == Some("Shorter than minimum length 3.") && errors.get("date").is_some());
    assert_eq!(error.reason(), "Validation error");
    assert!(!error.is_retryable());
}

#[tokio::test]
async fn test_create_event_sends_full_payload() {
    let mock = ApiMockServer::new().await;
    mock.expect_body("POST", "/events", valid_event_payload(), event_json(7, "Tech Conference", vec![]))
        .await;

    let payload: EventPayload = valid_event_draft().to_payload().unwrap();
    let created = mock.client().create_event(&payload).await.unwrap();

    assert_eq!(created.id, 7);
}

#[tokio::test]
async fn test_update_omits_unset_capacity() {
    let mock = ApiMockServer::new().await;
    let mut expected = valid_event_payload();
    expected.as_object_mut().unwrap().remove("max_participants");
    mock.expect_body("PUT", "/events/7", expected, event_json(7, "Tech Conference", vec![]))
        .await;

    let mut draft = valid_event_draft();
    draft.max_participants = String::new();
    let updated = mock.client().update_event(7, &draft.to_payload().unwrap()).await;

    assert!(updated.is_ok());
}

#[tokio::test]
async fn test_delete_accepts_message_body() {
    let mock = ApiMockServer::new().await;
    mock.respond("DELETE", "/events/1", 200, json!({ "message": "Event deleted successfully" }))
        .await;

    assert!(mock.client().delete_event(1).await.is_ok());
    assert_eq!(mock.requests("DELETE", "/events/1").await, 1);
}

#[tokio::test]
async fn test_undecodable_body_is_request_failed() {
    let mock = ApiMockServer::new().await;
    mock.respond("GET", "/participants", 200, json!({ "unexpected": true })).await;

    let error = mock.client().list_participants().await.unwrap_err();

    assert!(error.reason().starts_with("invalid response"));
    assert_eq!(error.resource(), Resource::Participant);
}

#[tokio::test]
async fn test_event_participants_endpoint() {
    let mock = ApiMockServer::new().await;
    mock.respond("GET", "/events/4/participants", 200, json!([ada(4)])).await;

    let participants = mock.client().list_event_participants(4).await.unwrap();

    assert_eq!(participants.len(), 1);
    assert_eq!(participants[0].event_id, 4);
}

#[tokio::test]
async fn test_slow_server_times_out() {
    let mock = ApiMockServer::new().await;
    mock.respond_delayed("GET", "/events", Duration::from_secs(3), json!([])).await;

    let error = mock.client().list_events().await.unwrap_err();

    assert_eq!(error.reason(), "timeout");
}

#[tokio::test]
async fn test_unreachable_server_is_service_unavailable() {
    let client = ApiClient::new(&ApiConfig {
        base_url: "http://127.0.0.1:9/api".to_string(),
        timeout_seconds: 2,
        user_agent: "event-admin-tests".to_string(),
    })
    .unwrap();

    let error = client.list_events().await.unwrap_err();

    assert_matches!(error, ApiError::RequestFailed { status: None, .. });
    assert_eq!(error.reason(), "service unavailable");
}
