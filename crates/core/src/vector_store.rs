//! Vector store trait — nearest-neighbour queries over sticker embeddings.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::VectorStoreError;

/// One nearest-neighbour candidate returned by a store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorMatch {
    /// Sticker identifier (`assetbundleName`).
    pub id: String,

    /// Similarity score as reported by the store, higher is closer.
    pub score: f32,

    /// Stored metadata; `name` holds the display label.
    #[serde(default)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

impl VectorMatch {
    /// The display name from metadata, if present as a string.
    pub fn name(&self) -> Option<&str> {
        self.metadata.get("name").and_then(|v| v.as_str())
    }
}

/// The core VectorStore trait.
///
/// Implementations: Cloudflare Vectorize, in-memory catalog.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// The store name (e.g., "vectorize", "in_memory").
    fn name(&self) -> &str;

    /// Largest `limit` a single query may ask for.
    fn max_query_limit(&self) -> usize;

    /// Return up to `limit` candidates ordered by descending similarity.
    async fn query(
        &self,
        vector: &[f32],
        limit: usize,
    ) -> std::result::Result<Vec<VectorMatch>, VectorStoreError>;
}
