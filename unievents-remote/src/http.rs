//! HTTP client for the events REST API.
//!
//! Endpoints:
//! - `GET    /api/events?page&category&search&sort`
//! - `GET    /api/admin/events?page&search&category&status`
//! - `GET    /api/events/{id}`
//! - `POST   /api/events`
//! - `PUT    /api/events/{id}`
//! - `DELETE /api/events/{id}`
//! - `POST   /api/events/{id}/duplicate`

use crate::config::RemoteConfig;
use crate::error::{RemoteError, RemoteResult};
use crate::service::EventService;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;
use unievents_model::{AdminQuery, DeleteAck, Event, EventId, EventPage, EventQuery};

/// [`EventService`] backed by the events REST API.
pub struct HttpEventService {
    client: Client,
    config: RemoteConfig,
}

impl HttpEventService {
    pub fn new(config: RemoteConfig) -> RemoteResult<Self> {
        config.validate()?;
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| RemoteError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &RemoteConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    fn event_path(id: &EventId) -> String {
        format!("/api/events/{}", urlencoding::encode(id.as_str()))
    }

    /// Sends a request, mapping transport failures and error statuses.
    async fn send(&self, request: RequestBuilder, target: &str) -> RemoteResult<Response> {
        let resp = request.send().await.map_err(transport_error)?;
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }

        let body = resp.text().await.unwrap_or_default();
        debug!("{target}: HTTP {status}");
        Err(match status {
            StatusCode::NOT_FOUND => RemoteError::NotFound(target.to_string()),
            StatusCode::BAD_REQUEST | StatusCode::CONFLICT | StatusCode::UNPROCESSABLE_ENTITY => {
                RemoteError::Rejected(error_message(&body, status))
            }
            _ => RemoteError::Server {
                status: status.as_u16(),
                message: error_message(&body, status),
            },
        })
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        target: &str,
    ) -> RemoteResult<T> {
        let resp = self.send(request, target).await?;
        let bytes = resp.bytes().await.map_err(transport_error)?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

/// Connection failures and timeouts are outages, not protocol errors.
fn transport_error(e: reqwest::Error) -> RemoteError {
    if e.is_connect() || e.is_timeout() {
        RemoteError::Unreachable(e.to_string())
    } else {
        RemoteError::Http(e)
    }
}

/// Pulls `error` or `message` out of a JSON error body, else the raw body.
fn error_message(body: &str, status: StatusCode) -> String {
    let parsed = serde_json::from_str::<serde_json::Value>(body).ok();
    let field = parsed.as_ref().and_then(|v| {
        v.get("error")
            .or_else(|| v.get("message"))
            .and_then(|m| m.as_str())
            .map(str::to_string)
    });
    match field {
        Some(msg) => msg,
        None if body.trim().is_empty() => status.to_string(),
        None => body.trim().to_string(),
    }
}

fn query_string(pairs: &[(&str, Option<&str>)]) -> String {
    let encoded: Vec<String> = pairs
        .iter()
        .filter_map(|(k, v)| v.map(|v| format!("{k}={}", urlencoding::encode(v))))
        .collect();
    if encoded.is_empty() {
        String::new()
    } else {
        format!("?{}", encoded.join("&"))
    }
}

#[async_trait]
impl EventService for HttpEventService {
    async fn list(&self, query: &EventQuery) -> RemoteResult<EventPage> {
        let page = query.page.max(1).to_string();
        let qs = query_string(&[
            ("page", Some(page.as_str())),
            ("category", query.category.as_deref()),
            ("search", query.search.as_deref()),
            ("sort", Some(query.sort.as_str())),
        ]);
        let url = self.url(&format!("/api/events{qs}"));
        self.send_json(self.client.get(&url), "event listing").await
    }

    async fn list_admin(&self, query: &AdminQuery) -> RemoteResult<EventPage> {
        let page = query.page.max(1).to_string();
        let status = Some(query.status.as_str()).filter(|s| !s.is_empty());
        let qs = query_string(&[
            ("page", Some(page.as_str())),
            ("search", query.search.as_deref()),
            ("category", query.category.as_deref()),
            ("status", status),
        ]);
        let url = self.url(&format!("/api/admin/events{qs}"));
        self.send_json(self.client.get(&url), "admin event listing").await
    }

    async fn get(&self, id: &EventId) -> RemoteResult<Option<Event>> {
        let url = self.url(&Self::event_path(id));
        match self.send_json(self.client.get(&url), id.as_str()).await {
            Ok(event) => Ok(Some(event)),
            Err(RemoteError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn create(&self, event: Event) -> RemoteResult<Event> {
        let url = self.url("/api/events");
        self.send_json(self.client.post(&url).json(&event), event.id.as_str())
            .await
    }

    async fn update(&self, id: &EventId, event: Event) -> RemoteResult<Event> {
        let url = self.url(&Self::event_path(id));
        self.send_json(self.client.put(&url).json(&event), id.as_str())
            .await
    }

    async fn delete(&self, id: &EventId) -> RemoteResult<DeleteAck> {
        let url = self.url(&Self::event_path(id));
        let resp = self.send(self.client.delete(&url), id.as_str()).await?;
        // 204 has no body; treat it as a plain success.
        let bytes = resp.bytes().await.map_err(transport_error)?;
        if bytes.is_empty() {
            return Ok(DeleteAck {
                success: true,
                id: Some(id.clone()),
            });
        }
        let ack: DeleteAck = serde_json::from_slice(&bytes)?;
        if !ack.success {
            return Err(RemoteError::Rejected(format!(
                "server declined to delete event {id}"
            )));
        }
        Ok(ack)
    }

    async fn duplicate(&self, id: &EventId) -> RemoteResult<Event> {
        let url = self.url(&format!("{}/duplicate", Self::event_path(id)));
        self.send_json(self.client.post(&url), id.as_str()).await
    }
}
