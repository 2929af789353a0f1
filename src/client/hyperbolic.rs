//! Hyperbolic completion and embedding client.
//!
//! Chat turns are flattened into a single text prompt and sent to the
//! plain `/completions` endpoint. Request-time failures never reach the
//! caller: completions resolve to [`FALLBACK_RESPONSE`] and embeddings to
//! `None`.

use crate::client::{ModelProvider, Throttle, ThrottleStats, flatten_prompt};
use crate::models::{
    KeySource, ProviderConfig, ProviderError, Result, StrictAlternation, Turn, TurnNormalizer,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Returned by [`HyperbolicClient::generate`] when no completion could be obtained.
pub const FALLBACK_RESPONSE: &str = "My brain disconnected, try again.";

/// Completion request payload.
#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    prompt: String,
    model: &'a str,
    temperature: f64,
    max_tokens: u32,
    stream: bool,
}

/// Completion response.
#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    text: String,
}

/// Embedding request payload.
#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    input: &'a str,
    model: &'a str,
}

/// Embedding response.
#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f64>,
}

/// Client bound to one Hyperbolic model.
///
/// Features:
/// - Minimum spacing between requests, per instance
/// - Up to `max_attempts` tries on HTTP 429 for completions
/// - No retry for embeddings; any failure yields `None`
pub struct HyperbolicClient {
    client: reqwest::Client,
    /// Model name with the provider tag stripped
    model_name: String,
    /// API key, read once at construction
    api_key: String,
    /// Base URL without trailing slash
    base_url: String,
    throttle: Throttle,
    normalizer: Arc<dyn TurnNormalizer>,
    max_attempts: u32,
    retry_backoff: Duration,
    temperature: f64,
    max_tokens: u32,
    embedding_model: String,
}

impl HyperbolicClient {
    /// Create a client for a `hyperbolic/`-prefixed model identifier.
    ///
    /// `base_url` defaults to the public Hyperbolic endpoint.
    pub fn new(model: &str, base_url: Option<String>, keys: &dyn KeySource) -> Result<Self> {
        let mut config = ProviderConfig::new(model);
        if let Some(base_url) = base_url {
            config.base_url = base_url;
        }
        Self::from_config(&config, keys)
    }

    /// Create a client from a full configuration.
    ///
    /// The model identifier is validated before the key source is
    /// consulted; neither step touches the network.
    pub fn from_config(config: &ProviderConfig, keys: &dyn KeySource) -> Result<Self> {
        let model_name = config.model_name()?.to_string();
        let api_key = keys.get_key(&config.api_key_name)?;

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(ProviderError::Network)?;

        debug!(
            model = %model_name,
            base_url = %config.base_url,
            min_interval_ms = config.min_interval_ms,
            "Created Hyperbolic client"
        );

        Ok(Self {
            client,
            model_name,
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            throttle: Throttle::new(config.min_interval()),
            normalizer: Arc::new(StrictAlternation),
            max_attempts: config.max_attempts.max(1),
            retry_backoff: config.retry_backoff(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            embedding_model: config.embedding_model.clone(),
        })
    }

    /// Replace the turn normalizer.
    pub fn with_normalizer(mut self, normalizer: Arc<dyn TurnNormalizer>) -> Self {
        self.normalizer = normalizer;
        self
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn min_interval(&self) -> Duration {
        self.throttle.min_interval()
    }

    pub fn throttle_stats(&self) -> ThrottleStats {
        self.throttle.stats()
    }

    /// Generate a completion for `turns`.
    ///
    /// Never fails: any unrecoverable error yields [`FALLBACK_RESPONSE`].
    pub async fn generate(&self, turns: &[Turn], system_message: Option<&str>) -> String {
        self.throttle.acquire().await;

        let mut messages = self.normalizer.normalize(turns);
        if let Some(system) = system_message.filter(|s| !s.is_empty()) {
            messages.insert(0, Turn::system(system));
        }

        let request = CompletionRequest {
            prompt: flatten_prompt(&messages),
            model: &self.model_name,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            stream: false,
        };

        match self.complete_with_retry(&request).await {
            Ok(text) => text,
            Err(e) => {
                error!(model = %self.model_name, error = %e, "Completion failed");
                FALLBACK_RESPONSE.to_string()
            }
        }
    }

    /// Run a completion, retrying only on rate limits.
    ///
    /// The throttle is not consulted again between attempts.
    async fn complete_with_retry(&self, request: &CompletionRequest<'_>) -> Result<String> {
        let mut attempts_left = self.max_attempts;

        loop {
            attempts_left -= 1;
            debug!(
                model = %self.model_name,
                attempts_left = attempts_left,
                prompt_len = request.prompt.len(),
                "Sending completion request"
            );

            match self.complete_once(request).await {
                Ok(text) => return Ok(text),
                Err(e) if e.is_rate_limited() && attempts_left > 0 => {
                    warn!(
                        model = %self.model_name,
                        attempts_left = attempts_left,
                        backoff_ms = self.retry_backoff.as_millis() as u64,
                        "Rate limited, retrying"
                    );
                    tokio::time::sleep(self.retry_backoff).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn complete_once(&self, request: &CompletionRequest<'_>) -> Result<String> {
        let url = format!("{}/completions", self.base_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::from_status(status.as_u16(), body));
        }

        let body: CompletionResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Parse(format!("Failed to parse response: {e}")))?;

        let text = body
            .choices
            .into_iter()
            .next()
            .map(|c| c.text.trim().to_string())
            .ok_or_else(|| ProviderError::Parse("No choices in response".to_string()))?;

        debug!(model = %self.model_name, response_len = text.len(), "Received completion");
        Ok(text)
    }

    /// Embed `text`.
    ///
    /// A 429 yields `None` straight away, without retrying.
    pub async fn embed(&self, text: &str) -> Option<Vec<f64>> {
        self.throttle.acquire().await;

        match self.embed_once(text).await {
            Ok(embedding) => Some(embedding),
            Err(e) if e.is_rate_limited() => {
                info!(model = %self.embedding_model, "Rate limited on embeddings, falling back");
                None
            }
            Err(e) => {
                error!(model = %self.embedding_model, error = %e, "Embedding failed, falling back");
                None
            }
        }
    }

    async fn embed_once(&self, text: &str) -> Result<Vec<f64>> {
        let url = format!("{}/embeddings", self.base_url);
        let request = EmbeddingRequest {
            input: text,
            model: &self.embedding_model,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::from_status(status.as_u16(), body));
        }

        let body: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Parse(format!("Failed to parse embedding: {e}")))?;

        body.data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| ProviderError::Parse("No data in embedding response".to_string()))
    }
}

impl std::fmt::Debug for HyperbolicClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HyperbolicClient")
            .field("model_name", &self.model_name)
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("min_interval", &self.throttle.min_interval())
            .field("max_attempts", &self.max_attempts)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl ModelProvider for HyperbolicClient {
    fn model_name(&self) -> &str {
        &self.model_name
    }

    async fn generate(&self, turns: &[Turn], system_message: Option<&str>) -> String {
        HyperbolicClient::generate(self, turns, system_message).await
    }

    async fn embed(&self, text: &str) -> Option<Vec<f64>> {
        HyperbolicClient::embed(self, text).await
    }
}
