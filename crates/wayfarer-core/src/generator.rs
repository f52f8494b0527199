//! Text generation collaborators.
//!
//! The orchestrator only sees [`TextGenerator`]; which backend answers is
//! decided by whoever wires it up (config for the CLI, canned responses for
//! offline runs and tests).

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use crate::error::{CoreError, Result};

/// Something that turns a prompt into free text.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Short identifier used in logs and errors.
    fn name(&self) -> &str;

    /// Complete `prompt`. Transport failures map to
    /// [`CoreError::UpstreamUnavailable`].
    async fn generate(&self, prompt: &str) -> Result<String>;
}

/// Generator behind a plain JSON endpoint.
///
/// Sends `{"model": ..., "prompt": ...}` and expects `{"text": ...}` back.
pub struct HttpTextGenerator {
    client: Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
}

#[derive(Deserialize)]
struct GenerateResponse {
    text: String,
}

impl HttpTextGenerator {
    pub fn new(endpoint: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
            model: model.into(),
            api_key: None,
        }
    }

    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key.filter(|k| !k.is_empty());
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn unavailable(&self, message: impl Into<String>) -> CoreError {
        CoreError::upstream(self.name(), message)
    }
}

#[async_trait]
impl TextGenerator for HttpTextGenerator {
    fn name(&self) -> &str {
        "generator"
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        let body = json!({ "model": self.model, "prompt": prompt });
        let mut request = self.client.post(&self.endpoint).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let resp = request
            .send()
            .await
            .map_err(|e| self.unavailable(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(self.unavailable(format!("HTTP {status}: {text}")));
        }

        let parsed: GenerateResponse = resp
            .json()
            .await
            .map_err(|e| self.unavailable(format!("unexpected response body: {e}")))?;
        Ok(parsed.text)
    }
}

/// Answers every prompt with the same text and counts the calls.
#[derive(Debug, Default)]
pub struct CannedGenerator {
    response: String,
    calls: AtomicUsize,
}

impl CannedGenerator {
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TextGenerator for CannedGenerator {
    fn name(&self) -> &str {
        "canned"
    }

    async fn generate(&self, _prompt: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.response.clone())
    }
}
