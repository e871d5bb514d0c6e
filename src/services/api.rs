//! Events API client
//!
//! One method per resource operation; each issues exactly one HTTP request
//! and returns the decoded payload or an [`ApiError`]. Retries are left to
//! the query cache.

use std::time::Duration;

use reqwest::{Client, Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::config::settings::ApiConfig;
use crate::models::{Event, EventPayload, Participant, ParticipantPayload};
use crate::state::schema::ValidationErrors;
use crate::utils::errors::{AdminError, ApiError, ApiResult, Operation, Resource, Result};
use crate::utils::logging::{log_api_error, log_api_request};

const API_NAME: &str = "events-api";

/// HTTP adapter for the events API
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// Create a new client from the API settings
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(AdminError::Http)?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn list_events(&self) -> ApiResult<Vec<Event>> {
        let response = self
            .execute::<()>(Method::GET, Resource::Event, Operation::List, "/events", None, None)
            .await?;
        decode(response, Resource::Event, Operation::List).await
    }

    pub async fn get_event(&self, id: i64) -> ApiResult<Event> {
        let path = format!("/events/{}", id);
        let response = self
            .execute::<()>(Method::GET, Resource::Event, Operation::Get, &path, None, Some(id))
            .await?;
        decode(response, Resource::Event, Operation::Get).await
    }

    pub async fn create_event(&self, payload: &EventPayload) -> ApiResult<Event> {
        let response = self
            .execute(Method::POST, Resource::Event, Operation::Create, "/events", Some(payload), None)
            .await?;
        decode(response, Resource::Event, Operation::Create).await
    }

    /// Full replace of an event
    pub async fn update_event(&self, id: i64, payload: &EventPayload) -> ApiResult<Event> {
        let path = format!("/events/{}", id);
        let response = self
            .execute(Method::PUT, Resource::Event, Operation::Update, &path, Some(payload), Some(id))
            .await?;
        decode(response, Resource::Event, Operation::Update).await
    }

    /// Delete an event; the server removes its participants too
    pub async fn delete_event(&self, id: i64) -> ApiResult<()> {
        let path = format!("/events/{}", id);
        self.execute::<()>(Method::DELETE, Resource::Event, Operation::Delete, &path, None, Some(id))
            .await?;
        Ok(())
    }

    pub async fn list_event_participants(&self, event_id: i64) -> ApiResult<Vec<Participant>> {
        let path = format!("/events/{}/participants", event_id);
        let response = self
            .execute::<()>(Method::GET, Resource::Participant, Operation::List, &path, None, None)
            .await?;
        decode(response, Resource::Participant, Operation::List).await
    }

    pub async fn list_participants(&self) -> ApiResult<Vec<Participant>> {
        let response = self
            .execute::<()>(Method::GET, Resource::Participant, Operation::List, "/participants", None, None)
            .await?;
        decode(response, Resource::Participant, Operation::List).await
    }

    pub async fn get_participant(&self, id: i64) -> ApiResult<Participant> {
        let path = format!("/participants/{}", id);
        let response = self
            .execute::<()>(Method::GET, Resource::Participant, Operation::Get, &path, None, Some(id))
            .await?;
        decode(response, Resource::Participant, Operation::Get).await
    }

    pub async fn create_participant(&self, payload: &ParticipantPayload) -> ApiResult<Participant> {
        let response = self
            .execute(
                Method::POST,
                Resource::Participant,
                Operation::Create,
                "/participants",
                Some(payload),
                None,
            )
            .await?;
        decode(response, Resource::Participant, Operation::Create).await
    }

    pub async fn update_participant(&self, id: i64, payload: &ParticipantPayload) -> ApiResult<Participant> {
        let path = format!("/participants/{}", id);
        let response = self
            .execute(Method::PUT, Resource::Participant, Operation::Update, &path, Some(payload), Some(id))
            .await?;
        decode(response, Resource::Participant, Operation::Update).await
    }

    pub async fn delete_participant(&self, id: i64) -> ApiResult<()> {
        let path = format!("/participants/{}", id);
        self.execute::<()>(Method::DELETE, Resource::Participant, Operation::Delete, &path, None, Some(id))
            .await?;
        Ok(())
    }

    /// Send one request and map any failure to an [`ApiError`]
    async fn execute<B: Serialize + ?Sized>(
        &self,
        method: Method,
        resource: Resource,
        operation: Operation,
        path: &str,
        body: Option<&B>,
        id: Option<i64>,
    ) -> ApiResult<Response> {
        let url = format!("{}{}", self.base_url, path);
        log_api_request(method.as_str(), &url, &resource.to_string(), &operation.to_string());

        let mut request = self.client.request(method, &url);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| {
            let error = transport_error(resource, operation, &e);
            log_api_error(API_NAME, &error.to_string(), Some(&url));
            error
        })?;

        let status = response.status();
        if status.is_success() {
            debug!(url = %url, status = status.as_u16(), "API request succeeded");
            return Ok(response);
        }

        if status == StatusCode::NOT_FOUND && operation == Operation::Get {
            if let Some(id) = id {
                debug!(url = %url, "Resource not found");
                return Err(ApiError::NotFound { resource, id });
            }
        }

        let body = response.text().await.unwrap_or_default();
        let reason = error_reason(status, &body);
        let field_errors = rejected_fields(&body);
        let error = if field_errors.is_empty() {
            ApiError::RequestFailed {
                resource,
                operation,
                status: Some(status.as_u16()),
                reason,
            }
        } else {
            ApiError::Rejected {
                resource,
                operation,
                reason,
                errors: field_errors,
            }
        };
        log_api_error(API_NAME, &error.to_string(), Some(&url));
        Err(error)
    }
}

async fn decode<T: DeserializeOwned>(response: Response, resource: Resource, operation: Operation) -> ApiResult<T> {
    response.json::<T>().await.map_err(|e| {
        let error = ApiError::request_failed(resource, operation, format!("invalid response: {}", e));
        log_api_error(API_NAME, &error.to_string(), None);
        error
    })
}

fn transport_error(resource: Resource, operation: Operation, error: &reqwest::Error) -> ApiError {
    let reason = if error.is_timeout() {
        "timeout".to_string()
    } else if error.is_connect() {
        "service unavailable".to_string()
    } else {
        error.to_string()
    };
    ApiError::request_failed(resource, operation, reason)
}

/// The server's `{"message": ...}` text, or the bare status
fn error_reason(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| value.get("message").and_then(|m| m.as_str()).map(str::to_string))
        .unwrap_or_else(|| format!("HTTP {}", status.as_u16()))
}

/// Per-field messages from an `{"errors": {field: [messages]}}` body
///
/// Only the first message of each field is kept. The schedule is sent as
/// `start_date`/`end_date` but edited as `date`.
fn rejected_fields(body: &str) -> ValidationErrors {
    let mut errors = ValidationErrors::default();
    let value = match serde_json::from_str::<serde_json::Value>(body) {
        Ok(value) => value,
        Err(_) => return errors,
    };

    if let Some(fields) = value.get("errors").and_then(|e| e.as_object()) {
        for (field, messages) in fields {
            let message = match messages {
                serde_json::Value::String(message) => Some(message.as_str()),
                serde_json::Value::Array(list) => list.iter().find_map(|m| m.as_str()),
                _ => None,
            };
            let field = match field.as_str() {
                "start_date" | "end_date" => "date",
                other => other,
            };
            if let Some(message) = message {
                if errors.get(field).is_none() {
                    errors.insert(field, message);
                }
            }
        }
    }
    errors
}
