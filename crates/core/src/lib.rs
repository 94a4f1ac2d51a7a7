//! # StickerMatch Core
//!
//! Domain types, traits, and error definitions for the StickerMatch
//! sticker recommendation service. This crate has **no framework
//! dependencies**: it defines the domain model and the capability traits
//! that the other crates implement against.
//!
//! The embedder and the vector store are external capabilities, so they
//! are traits here and implementations live elsewhere. Request
//! normalization is pure and lives here too, so every entry point (HTTP,
//! CLI) validates input the same way.

pub mod embedder;
pub mod error;
pub mod request;
pub mod sticker;
pub mod vector_store;

// Re-export key types at crate root for ergonomics
pub use embedder::Embedder;
pub use error::{EmbedderError, Error, ErrorCode, RequestError, Result, VectorStoreError};
pub use request::{RawRequest, RecentUsage, RecommendationRequest};
pub use sticker::{RecommendationResult, ScoredSticker, StickerRecord, TopK};
pub use vector_store::{VectorMatch, VectorStore};
