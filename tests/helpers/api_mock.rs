//! Mock events API server for testing
//!
//! Wraps a wiremock server with one helper per endpoint. Responses are JSON
//! values from `test_data`; failures use the server's `{"message": ...}` body.

use std::time::Duration;

use serde_json::{json, Value};
use wiremock::{
    matchers::{body_json, method, path},
    Mock, MockServer, ResponseTemplate,
};

use event_admin::config::{ApiConfig, CacheConfig};
use event_admin::services::{ApiClient, ServiceFactory};
use event_admin::state::QueryCache;

/// Mock events API server
pub struct ApiMockServer {
    pub server: MockServer,
    pub base_url: String,
}

impl ApiMockServer {
    /// Start a new mock server
    pub async fn new() -> Self {
        let server = MockServer::start().await;
        let base_url = format!("{}/api", server.uri());

        Self { server, base_url }
    }

    pub fn api_config(&self) -> ApiConfig {
        ApiConfig {
            base_url: self.base_url.clone(),
            timeout_seconds: 1,
            user_agent: "event-admin-tests".to_string(),
        }
    }

    pub fn client(&self) -> ApiClient {
        ApiClient::new(&self.api_config()).expect("client builds")
    }

    /// Services over this server with a long stale time and one retry
    pub fn services(&self) -> ServiceFactory {
        self.services_with(test_cache_config())
    }

    pub fn services_with(&self, cache: CacheConfig) -> ServiceFactory {
        ServiceFactory::with_parts(self.client(), QueryCache::new(cache))
    }

    /// Respond to `verb path` with `status` and `body`
    pub async fn respond(&self, verb: &str, route: &str, status: u16, body: Value) {
        Mock::given(method(verb))
            .and(path(format!("/api{}", route)))
            .respond_with(ResponseTemplate::new(status).set_body_json(body))
            .mount(&self.server)
            .await;
    }

    /// Like `respond`, but only for the first `times` matching requests
    pub async fn respond_times(&self, verb: &str, route: &str, times: u64, body: Value) {
        Mock::given(method(verb))
            .and(path(format!("/api{}", route)))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .up_to_n_times(times)
            .mount(&self.server)
            .await;
    }

    /// Respond after `delay`
    pub async fn respond_delayed(&self, verb: &str, route: &str, delay: Duration, body: Value) {
        Mock::given(method(verb))
            .and(path(format!("/api{}", route)))
            .respond_with(ResponseTemplate::new(200).set_body_json(body).set_delay(delay))
            .mount(&self.server)
            .await;
    }

    /// Fail `verb path` with the server's error body
    pub async fn fail(&self, verb: &str, route: &str, status: u16, message: &str) {
        self.respond(verb, route, status, json!({ "message": message })).await;
    }

    /// Reject `verb path` with 400 and per-field `errors`, as the server's schema validation does
    pub async fn reject(&self, verb: &str, route: &str, errors: Value) {
        self.respond(verb, route, 400, json!({ "message": "Validation error", "errors": errors }))
            .await;
    }

    /// Expect `verb path` never to be called
    pub async fn forbid(&self, verb: &str, route: &str) {
        Mock::given(method(verb))
            .and(path(format!("/api{}", route)))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&self.server)
            .await;
    }

    /// Respond to `verb path` only when the request body equals `expected`
    pub async fn expect_body(&self, verb: &str, route: &str, expected: Value, response: Value) {
        Mock::given(method(verb))
            .and(path(format!("/api{}", route)))
            .and(body_json(expected))
            .respond_with(ResponseTemplate::new(200).set_body_json(response))
            .expect(1)
            .mount(&self.server)
            .await;
    }

    /// Number of received requests matching `verb path`
    pub async fn requests(&self, verb: &str, route: &str) -> usize {
        let full_path = format!("/api{}", route);
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter(|request| request.method.to_string() == verb && request.url.path() == full_path)
            .count()
    }

    /// Clear all mounted mocks and recorded requests
    pub async fn reset(&self) {
        self.server.reset().await;
    }
}

pub fn test_cache_config() -> CacheConfig {
    CacheConfig {
        stale_time_seconds: 300,
        retry: 1,
        retry_delay_ms: 0,
        refetch_on_focus: false,
    }
}
