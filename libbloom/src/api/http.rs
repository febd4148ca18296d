//! HTTP implementation of the backend boundary

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};

use super::{ApiResult, AuthGrant, Backend, PostReceipt, Suggestion};
use crate::config::ApiConfig;
use crate::error::ApiError;
use crate::types::{Item, ItemId, OwnProfile, Profile};

/// Backend speaking JSON over HTTP with bearer authentication
#[derive(Debug, Clone)]
pub struct HttpBackend {
    base_url: String,
    base: Url,
    http_client: Client,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> ApiResult<Self> {
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let base = Url::parse(&base_url)
            .map_err(|e| ApiError::Network(format!("Invalid base URL {}: {}", base_url, e)))?;
        Ok(Self {
            base_url,
            base,
            http_client,
        })
    }

    pub fn from_config(config: &ApiConfig) -> ApiResult<Self> {
        Self::new(config.base_url.clone(), config.timeout())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Endpoint URL; every segment is percent-encoded, `/` included
    fn url(&self, segments: &[&str]) -> ApiResult<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::Network(format!("Base URL {} cannot take a path", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get<T: DeserializeOwned>(&self, segments: &[&str], token: Option<&str>) -> ApiResult<T> {
        let request = self.http_client.get(self.url(segments)?);
        self.send(request, token).await
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        segments: &[&str],
        body: &B,
        token: Option<&str>,
    ) -> ApiResult<T> {
        let request = self.http_client.post(self.url(segments)?).json(body);
        self.send(request, token).await
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        token: Option<&str>,
    ) -> ApiResult<T> {
        let request = match token {
            Some(token) => request.bearer_auth(token),
            None => request,
        };

        let response = request
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        tracing::debug!(status = status.as_u16(), bytes = body.len(), "backend response");

        let value = classify_response(status.as_u16(), &body)?;
        serde_json::from_value(value).map_err(|e| ApiError::Decode(e.to_string()))
    }
}

/// Map a raw response onto the error taxonomy
///
/// Success statuses yield the parsed body; an empty success body becomes
/// `{"success": true}`.
pub(crate) fn classify_response(status: u16, body: &str) -> ApiResult<Value> {
    if !(200..300).contains(&status) {
        let detail = failure_detail(status, body);
        return Err(if status == 401 {
            ApiError::Authentication(detail)
        } else {
            ApiError::Server { status, detail }
        });
    }

    if body.trim().is_empty() {
        return Ok(json!({ "success": true }));
    }

    let value: Value =
        serde_json::from_str(body).map_err(|e| ApiError::Decode(e.to_string()))?;

    if value.get("success").and_then(Value::as_bool) == Some(false) {
        return Err(ApiError::Rejected(
            message_field(&value).unwrap_or_else(|| "Request was rejected".to_string()),
        ));
    }

    Ok(value)
}

fn failure_detail(status: u16, body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<Value>(body) {
        if let Some(message) = message_field(&value) {
            return message;
        }
    }

    let text = body.trim();
    if !text.is_empty() && !text.starts_with('<') {
        return text.to_string();
    }

    reqwest::StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .map(str::to_string)
        .unwrap_or_else(|| format!("HTTP {}", status))
}

fn message_field(value: &Value) -> Option<String> {
    ["reason", "message", "detail", "msg"]
        .iter()
        .find_map(|key| value.get(*key).and_then(Value::as_str))
        .map(str::to_string)
}

#[async_trait(?Send)]
impl Backend for HttpBackend {
    async fn login(&self, username: &str, password: &str) -> ApiResult<AuthGrant> {
        let body = json!({ "username": username, "password": password });
        self.post(&["login"], &body, None).await
    }

    async fn register(&self, username: &str, password: &str) -> ApiResult<AuthGrant> {
        let body = json!({ "username": username, "password": password });
        self.post(&["register"], &body, None).await
    }

    async fn own_profile(&self, token: &str) -> ApiResult<OwnProfile> {
        self.get(&["profile"], Some(token)).await
    }

    async fn profile(&self, username: &str, token: Option<&str>) -> ApiResult<Profile> {
        self.get(&["profile", username], token).await
    }

    async fn post_item(&self, content: &str, token: &str) -> ApiResult<PostReceipt> {
        let body = json!({ "content": content });
        self.post(&["bloom"], &body, Some(token)).await
    }

    async fn like(&self, id: ItemId, token: &str) -> ApiResult<()> {
        let id = id.to_string();
        let _: Value = self
            .post(&["blooms", id.as_str(), "like"], &json!({}), Some(token))
            .await?;
        Ok(())
    }

    async fn follow(&self, username: &str, token: &str) -> ApiResult<()> {
        let body = json!({ "follow_username": username });
        let _: Value = self.post(&["follow"], &body, Some(token)).await?;
        Ok(())
    }

    async fn feed(&self, token: &str) -> ApiResult<Vec<Item>> {
        self.get(&["home"], Some(token)).await
    }

    async fn items_by_user(&self, username: &str) -> ApiResult<Vec<Item>> {
        self.get(&["blooms", username], None).await
    }

    async fn items_by_hashtag(&self, tag: &str) -> ApiResult<Vec<Item>> {
        self.get(&["hashtag", tag.trim_start_matches('#')], None)
            .await
    }

    async fn item(&self, id: ItemId) -> ApiResult<Item> {
        self.get(&["bloom", id.to_string().as_str()], None).await
    }

    async fn suggested_follows(&self, limit: usize, token: &str) -> ApiResult<Vec<Suggestion>> {
        let limit = limit.to_string();
        self.get(&["suggested-follows", limit.as_str()], Some(token))
            .await
    }
}
