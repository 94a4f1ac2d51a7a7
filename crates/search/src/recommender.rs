//! The recommendation pipeline.
//!
//! A validated request goes through exclusion derivation and similarity
//! search, and comes back as a result carrying the normalized prompt.

use std::collections::HashSet;

use stickermatch_core::error::Result;
use stickermatch_core::request::{RecentUsage, RecommendationRequest};
use stickermatch_core::sticker::{MAX_RECENT_EXCLUSIONS, RecommendationResult};
use tracing::info;

use crate::recency::RecencyExtractor;
use crate::searcher::SimilaritySearcher;

pub struct Recommender {
    searcher: SimilaritySearcher,
    extractor: RecencyExtractor,
}

impl Recommender {
    pub fn new(searcher: SimilaritySearcher, extractor: RecencyExtractor) -> Self {
        Self {
            searcher,
            extractor,
        }
    }

    /// Identifiers to exclude for this request, in first-seen order.
    ///
    /// Query-form identifiers are already distinct and bounded; message
    /// texts go through the extractor. No recent usage means no exclusion.
    pub fn exclusions(&self, recent: Option<&RecentUsage>) -> Vec<String> {
        match recent {
            None => Vec::new(),
            Some(RecentUsage::Identifiers(ids)) => ids.clone(),
            Some(RecentUsage::Messages(messages)) => {
                self.extractor.extract(messages, MAX_RECENT_EXCLUSIONS)
            }
        }
    }

    pub async fn recommend(&self, request: &RecommendationRequest) -> Result<RecommendationResult> {
        let excluded = self.exclusions(request.recent());

        info!(
            prompt_len = request.prompt().len(),
            top_k = request.top_k().get(),
            excluded = excluded.len(),
            "Recommending stickers"
        );

        let exclude: HashSet<String> = excluded.into_iter().collect();
        let stickers = self
            .searcher
            .search(request.prompt(), request.top_k(), &exclude)
            .await?;

        Ok(RecommendationResult {
            stickers,
            query: request.prompt().to_string(),
        })
    }
}
