//! Sticker domain types — catalog records, scored results, and the
//! bounded result-size type.

use serde::{Deserialize, Serialize};

/// Result count used when the caller supplies none, or an invalid one.
pub const DEFAULT_TOP_K: usize = 5;

/// Largest result count a caller may request.
pub const MAX_TOP_K: usize = 20;

/// Upper bound on the number of recently-used identifiers excluded per request.
pub const MAX_RECENT_EXCLUSIONS: usize = 10;

/// A result count guaranteed to lie in `[1, MAX_TOP_K]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct TopK(usize);

impl TopK {
    /// Accept `value` if it is in range, otherwise fall back to the default.
    pub fn or_default(value: Option<i64>) -> Self {
        match value {
            Some(v) if v >= 1 && v <= MAX_TOP_K as i64 => Self(v as usize),
            _ => Self::default(),
        }
    }

    pub fn get(&self) -> usize {
        self.0
    }
}

impl Default for TopK {
    fn default() -> Self {
        Self(DEFAULT_TOP_K)
    }
}

impl std::fmt::Display for TopK {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A catalog entry as held by a vector store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StickerRecord {
    /// Stable unique identifier of the sticker asset.
    #[serde(rename = "assetbundleName")]
    pub assetbundle_name: String,

    /// Display label
    #[serde(default)]
    pub name: String,

    /// Embedding vector; dimensionality is fixed per catalog.
    #[serde(default)]
    pub embedding: Vec<f32>,

    /// Any additional metadata carried alongside the record.
    #[serde(flatten)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

/// One ranked recommendation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredSticker {
    #[serde(rename = "assetbundleName")]
    pub assetbundle_name: String,
    pub name: String,
    /// Similarity in [0, 1], higher is closer.
    pub score: f32,
}

/// The ranked stickers for one prompt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationResult {
    pub stickers: Vec<ScoredSticker>,
    /// The normalized prompt, echoed back to the caller.
    pub query: String,
}
