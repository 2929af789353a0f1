#![allow(dead_code)]

use hyperbolic_adapter::{HyperbolicClient, ProviderConfig, StaticKeys};
use serde_json::{Value, json};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const API_KEY: &str = "sk-test-123";
pub const MODEL: &str = "hyperbolic/meta-llama/Meta-Llama-3.1-70B-Instruct";

pub fn keys() -> StaticKeys {
    StaticKeys::new().with("HYPERBOLIC_API_KEY", API_KEY)
}

/// Config pointed at the mock server, with short delays.
pub fn config(server: &MockServer) -> ProviderConfig {
    let mut config = ProviderConfig::new(MODEL);
    config.base_url = format!("{}/v1", server.uri());
    config.min_interval_ms = 0;
    config.retry_backoff_ms = 10;
    config
}

pub fn client(server: &MockServer) -> HyperbolicClient {
    HyperbolicClient::from_config(&config(server), &keys()).unwrap()
}

pub fn completion_body(text: &str) -> Value {
    json!({
        "id": "cmpl-1",
        "object": "text_completion",
        "model": "meta-llama/Meta-Llama-3.1-70B-Instruct",
        "choices": [{ "index": 0, "text": text, "finish_reason": "stop" }],
        "usage": { "prompt_tokens": 5, "completion_tokens": 2, "total_tokens": 7 }
    })
}

pub fn embedding_body(embedding: &[f64]) -> Value {
    json!({
        "object": "list",
        "model": "text-embedding-3-small",
        "data": [{ "object": "embedding", "index": 0, "embedding": embedding }]
    })
}

pub async fn mount_completion(server: &MockServer, template: ResponseTemplate) {
    Mock::given(method("POST"))
        .and(path("/v1/completions"))
        .and(header("authorization", format!("Bearer {API_KEY}").as_str()))
        .respond_with(template)
        .mount(server)
        .await;
}

pub async fn mount_embedding(server: &MockServer, template: ResponseTemplate) {
    Mock::given(method("POST"))
        .and(path("/v1/embeddings"))
        .and(header("authorization", format!("Bearer {API_KEY}").as_str()))
        .respond_with(template)
        .mount(server)
        .await;
}

/// JSON bodies of every request the server has seen.
pub async fn request_bodies(server: &MockServer) -> Vec<Value> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .map(|r| serde_json::from_slice(&r.body).unwrap())
        .collect()
}
