//! HTTP client for the real backend and the remote tier built on it.
//!
//! Every request carries the bearer token from the [`TokenStore`] and is
//! bounded by the configured timeout. A 401 clears the stored session;
//! any other non-2xx, network error or timeout is a transport failure.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method, RequestBuilder, StatusCode, Url};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::{ConfigError, TierError, TierResult};
use crate::models::entity::EntityKind;
use crate::models::file::FileUpload;
use crate::services::tier::Tier;
use crate::services::token_store::TokenStore;

#[derive(Clone)]
pub struct RemoteClient {
    client: Client,
    base_url: Url,
    tokens: Arc<TokenStore>,
}

/// Backends may answer either with the bare payload or with `{ "data": … }`
fn unwrap_envelope(value: Value) -> Value {
    match value {
        Value::Object(mut map)
            if map.contains_key("data") && !map.contains_key("id") && !map.contains_key("_id") =>
        {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    }
}

impl RemoteClient {
    pub fn new(
        base_url: &str,
        timeout: Duration,
        tokens: Arc<TokenStore>,
    ) -> Result<Self, ConfigError> {
        let base_url = Url::parse(base_url).map_err(|e| ConfigError::InvalidUrl {
            value: base_url.to_string(),
            reason: e.to_string(),
        })?;
        if base_url.cannot_be_a_base() {
            return Err(ConfigError::InvalidUrl {
                value: base_url.to_string(),
                reason: "URL cannot be used as a base".to_string(),
            });
        }
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url,
            tokens,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn tokens(&self) -> &Arc<TokenStore> {
        &self.tokens
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.client
            .request(method, url)
            .header("accept", "application/json")
    }

    /// Issue one request and return the (unwrapped) JSON body, `Null` when
    /// the body is empty
    pub async fn call(&self, method: Method, segments: &[&str], body: Option<&Value>) -> TierResult<Value> {
        let url = self.endpoint(segments);
        let mut request = self.request(method.clone(), url.clone());
        if let Some(body) = body {
            request = request.json(body);
        }
        self.send(method, url, request).await
    }

    /// POST a multipart form
    pub async fn call_multipart(&self, segments: &[&str], form: Form) -> TierResult<Value> {
        let url = self.endpoint(segments);
        let request = self.request(Method::POST, url.clone()).multipart(form);
        self.send(Method::POST, url, request).await
    }

    async fn send(&self, method: Method, url: Url, mut request: RequestBuilder) -> TierResult<Value> {
        if let Some(token) = self.tokens.token().await {
            request = request.bearer_auth(token);
        }

        debug!(method = %method, url = %url, "Remote request");

        let response = request.send().await.map_err(|e| {
            let reason = if e.is_timeout() { "timed out" } else { "request failed" };
            TierError::Transport(format!("{} {} {}: {}", method, url, reason, e))
        })?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            warn!(url = %url, "Remote API rejected credentials");
            self.tokens.expire().await;
            return Err(TierError::Unauthorized);
        }
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(TierError::Transport(format!(
                "Remote API error {}: {}",
                status, error_text
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| TierError::Transport(format!("failed to read body from {}: {}", url, e)))?;
        if bytes.is_empty() {
            return Ok(Value::Null);
        }
        let value: Value = serde_json::from_slice(&bytes)
            .map_err(|e| TierError::Transport(format!("invalid JSON from {}: {}", url, e)))?;
        Ok(unwrap_envelope(value))
    }
}

/// First tier: the configured HTTP backend
pub struct RemoteTier {
    client: RemoteClient,
}

impl RemoteTier {
    pub fn new(client: RemoteClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Tier for RemoteTier {
    fn name(&self) -> &'static str {
        "remote"
    }

    async fn list(&self, kind: EntityKind) -> TierResult<Vec<Value>> {
        match self.client.call(Method::GET, &[kind.collection()], None).await? {
            Value::Array(records) => Ok(records),
            other => Err(TierError::Transport(format!(
                "expected a {} list, got {}",
                kind,
                other
            ))),
        }
    }

    async fn get(&self, kind: EntityKind, id: &str) -> TierResult<Value> {
        self.client
            .call(Method::GET, &[kind.collection(), id], None)
            .await
    }

    async fn insert(&self, kind: EntityKind, record: Value) -> TierResult<Value> {
        self.client
            .call(Method::POST, &[kind.collection()], Some(&record))
            .await
    }

    async fn update(&self, kind: EntityKind, id: &str, patch: Value) -> TierResult<Value> {
        self.client
            .call(Method::PATCH, &[kind.collection(), id], Some(&patch))
            .await
    }

    async fn delete(&self, kind: EntityKind, id: &str) -> TierResult<()> {
        self.client
            .call(Method::DELETE, &[kind.collection(), id], None)
            .await?;
        Ok(())
    }

    async fn set_status(&self, kind: EntityKind, id: &str, status: &str) -> TierResult<Value> {
        let body = json!({ "status": status });
        self.client
            .call(Method::PATCH, &[kind.collection(), id, "status"], Some(&body))
            .await
    }

    async fn increment_views(&self, id: &str) -> TierResult<Value> {
        self.client
            .call(Method::PATCH, &[EntityKind::File.collection(), id, "views"], None)
            .await
    }

    /// The backend assigns its own id to uploads
    async fn upload_file(&self, upload: &FileUpload, _id: &str) -> TierResult<Value> {
        let part = Part::bytes(upload.content.clone()).file_name(upload.file_name.clone());
        let mut form = Form::new().part("file", part);
        if let Some(trader_id) = &upload.trader_id {
            form = form.text("traderId", trader_id.clone());
        }
        self.client
            .call_multipart(&[EntityKind::File.collection(), "upload"], form)
            .await
    }

    async fn extract_products(&self, id: &str) -> TierResult<Value> {
        self.client
            .call(Method::POST, &[EntityKind::File.collection(), "extract", id], None)
            .await
    }
}
