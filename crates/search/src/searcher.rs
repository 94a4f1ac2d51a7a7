//! Similarity search — prompt in, ranked stickers out.
//!
//! Embeds the prompt, asks the vector store for enough candidates to cover
//! the exclusions, drops excluded identifiers, and keeps the first `top_k`
//! survivors in the store's order.

use std::collections::HashSet;
use std::sync::Arc;

use stickermatch_core::embedder::Embedder;
use stickermatch_core::error::Result;
use stickermatch_core::sticker::{ScoredSticker, TopK};
use stickermatch_core::vector_store::{VectorMatch, VectorStore};
use tracing::debug;

pub struct SimilaritySearcher {
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn VectorStore>,
}

impl SimilaritySearcher {
    pub fn new(embedder: Arc<dyn Embedder>, store: Arc<dyn VectorStore>) -> Self {
        Self { embedder, store }
    }

    /// Number of candidates to request so that `top_k` survive exclusion,
    /// capped by what the store accepts.
    pub fn candidate_limit(&self, top_k: TopK, excluded: usize) -> usize {
        (top_k.get() + excluded).min(self.store.max_query_limit()).max(1)
    }

    /// Rank stickers for `prompt`, never returning an identifier in `exclude`.
    ///
    /// A short list is not an error. Embedder and store failures propagate
    /// unchanged; nothing is retried.
    pub async fn search(
        &self,
        prompt: &str,
        top_k: TopK,
        exclude: &HashSet<String>,
    ) -> Result<Vec<ScoredSticker>> {
        let vector = self.embedder.embed(prompt).await?;

        let limit = self.candidate_limit(top_k, exclude.len());
        debug!(
            embedder = self.embedder.name(),
            store = self.store.name(),
            dimension = vector.len(),
            limit,
            "Querying vector store"
        );

        let candidates = self.store.query(&vector, limit).await?;
        let returned = candidates.len();

        let stickers: Vec<ScoredSticker> = candidates
            .into_iter()
            .filter(|m| !exclude.contains(&m.id))
            .take(top_k.get())
            .map(to_scored)
            .collect();

        debug!(
            candidates = returned,
            kept = stickers.len(),
            "Similarity search complete"
        );
        Ok(stickers)
    }
}

fn to_scored(candidate: VectorMatch) -> ScoredSticker {
    let name = candidate
        .name()
        .map(str::to_string)
        .unwrap_or_else(|| candidate.id.clone());
    ScoredSticker {
        assetbundle_name: candidate.id,
        name,
        score: clamp_score(candidate.score),
    }
}

/// Clamp into [0, 1]; monotonic, so store order stays non-increasing.
fn clamp_score(score: f32) -> f32 {
    if score.is_nan() {
        0.0
    } else {
        score.clamp(0.0, 1.0)
    }
}
