//! In-memory vector store — a pre-embedded sticker catalog held in a Vec.
//!
//! Useful for tests, local development, and small catalogs that fit in
//! memory. The catalog is loaded once and never mutated.

use async_trait::async_trait;
use std::collections::HashSet;
use std::path::Path;
use stickermatch_core::error::VectorStoreError;
use stickermatch_core::sticker::StickerRecord;
use stickermatch_core::vector_store::{VectorMatch, VectorStore};
use tracing::{info, warn};

use crate::vector::rank_by_similarity;

/// Default cap on candidates per query.
const DEFAULT_MAX_QUERY_LIMIT: usize = 100;

/// An in-memory store answering queries by brute-force cosine similarity.
pub struct InMemoryStore {
    records: Vec<StickerRecord>,
    max_query_limit: usize,
}

impl InMemoryStore {
    /// Build a store from catalog records.
    ///
    /// The first record with a non-empty embedding fixes the dimensionality;
    /// records without an embedding, with another dimension, or whose
    /// identifier was already seen are skipped.
    pub fn new(records: Vec<StickerRecord>) -> Self {
        let dimension = records
            .iter()
            .map(|r| r.embedding.len())
            .find(|&len| len > 0)
            .unwrap_or(0);

        let mut seen: HashSet<String> = HashSet::new();
        let mut kept: Vec<StickerRecord> = Vec::with_capacity(records.len());
        for record in records {
            if record.embedding.is_empty() || record.embedding.len() != dimension {
                warn!(
                    id = %record.assetbundle_name,
                    dimension = record.embedding.len(),
                    expected = dimension,
                    "Skipping catalog record with unusable embedding"
                );
                continue;
            }
            if !seen.insert(record.assetbundle_name.clone()) {
                warn!(id = %record.assetbundle_name, "Skipping duplicate catalog record");
                continue;
            }
            kept.push(record);
        }

        Self {
            records: kept,
            max_query_limit: DEFAULT_MAX_QUERY_LIMIT,
        }
    }

    /// Load a JSON catalog: an array of `{assetbundleName, name, embedding}`.
    pub fn from_file(path: &Path) -> Result<Self, VectorStoreError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            VectorStoreError::Catalog(format!("failed to read {}: {e}", path.display()))
        })?;
        let records: Vec<StickerRecord> = serde_json::from_str(&content).map_err(|e| {
            VectorStoreError::Catalog(format!("failed to parse {}: {e}", path.display()))
        })?;

        let store = Self::new(records);
        info!(
            path = %path.display(),
            records = store.len(),
            "Loaded sticker catalog"
        );
        Ok(store)
    }

    pub fn with_max_query_limit(mut self, limit: usize) -> Self {
        self.max_query_limit = limit;
        self
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl VectorStore for InMemoryStore {
    fn name(&self) -> &str {
        "in_memory"
    }

    fn max_query_limit(&self) -> usize {
        self.max_query_limit
    }

    async fn query(&self, vector: &[f32], limit: usize) -> Result<Vec<VectorMatch>, VectorStoreError> {
        if let Some(first) = self.records.first()
            && first.embedding.len() != vector.len()
        {
            return Err(VectorStoreError::QueryFailed(format!(
                "query dimension {} does not match catalog dimension {}",
                vector.len(),
                first.embedding.len()
            )));
        }

        let limit = limit.min(self.max_query_limit);
        let matches = rank_by_similarity(&self.records, vector, limit)
            .into_iter()
            .map(|(i, score)| {
                let record = &self.records[i];
                let mut metadata = record.metadata.clone();
                metadata.insert(
                    "name".into(),
                    serde_json::Value::String(record.name.clone()),
                );
                VectorMatch {
                    id: record.assetbundle_name.clone(),
                    score,
                    metadata,
                }
            })
            .collect();

        Ok(matches)
    }
}
