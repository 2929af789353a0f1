use crate::models::Turn;
use async_trait::async_trait;

/// Interface an agent loop uses to talk to a model backend.
///
/// Implementations absorb request-time failures: `generate` always yields
/// text and `embed` yields `None` when no embedding could be obtained, in
/// which case callers fall back to a non-embedding similarity measure.
#[async_trait]
pub trait ModelProvider: Send + Sync {
    /// Model name as sent to the backend.
    fn model_name(&self) -> &str;

    /// Produce the assistant's next message for `turns`.
    async fn generate(&self, turns: &[Turn], system_message: Option<&str>) -> String;

    /// Embed `text`, or `None` if embeddings are unavailable.
    async fn embed(&self, text: &str) -> Option<Vec<f64>>;
}
