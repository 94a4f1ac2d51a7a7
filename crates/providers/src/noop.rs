//! No-op embedder — stands in when no embedding backend is configured.

use async_trait::async_trait;
use stickermatch_core::embedder::Embedder;
use stickermatch_core::error::EmbedderError;

/// An embedder that refuses every request with a reason.
pub struct NoopEmbedder {
    reason: String,
}

impl NoopEmbedder {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl Embedder for NoopEmbedder {
    fn name(&self) -> &str {
        "none"
    }

    async fn embed(&self, _text: &str) -> Result<Vec<f32>, EmbedderError> {
        Err(EmbedderError::NotConfigured(self.reason.clone()))
    }
}
