//! Recommendation pipeline for StickerMatch.
//!
//! - [`vector`] — cosine similarity and ranking
//! - [`in_memory`] — a pre-embedded catalog served from memory
//! - [`recency`] — recently-used sticker extraction from message texts
//! - [`searcher`] — embed, query, exclude, truncate
//! - [`recommender`] — the full request → result pipeline

pub mod in_memory;
pub mod recency;
pub mod recommender;
pub mod searcher;
pub mod vector;

pub use in_memory::InMemoryStore;
pub use recency::RecencyExtractor;
pub use recommender::Recommender;
pub use searcher::SimilaritySearcher;
pub use vector::{cosine_similarity, rank_by_similarity};
