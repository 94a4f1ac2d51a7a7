//! Embedder trait — turns text into a fixed-length vector.
//!
//! Implementations live in `stickermatch-providers` (OpenAI-compatible,
//! Cloudflare Workers AI, and a no-op placeholder).

use async_trait::async_trait;

use crate::error::EmbedderError;

/// The core Embedder trait.
///
/// Calls are single-shot: no retry happens here, transient failure handling
/// is the implementation's concern.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// The embedder name (e.g., "openai", "workers_ai", "none").
    fn name(&self) -> &str;

    /// Embed a single piece of text.
    async fn embed(&self, text: &str) -> std::result::Result<Vec<f32>, EmbedderError>;
}
