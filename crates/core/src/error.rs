//! Error types for the StickerMatch domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant.

use thiserror::Error;

/// The top-level error type for all StickerMatch operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Request validation ---
    #[error("Request error: {0}")]
    Request(#[from] RequestError),

    // --- Embedder errors ---
    #[error("Embedder error: {0}")]
    Embedder(#[from] EmbedderError),

    // --- Vector store errors ---
    #[error("Vector store error: {0}")]
    VectorStore(#[from] VectorStoreError),

    /// The vector-search capability is not configured at all.
    #[error("Vector search unavailable: {0}")]
    Unavailable(String),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// The stable wire code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            Error::Request(RequestError::InvalidRequest(_)) => ErrorCode::InvalidRequest,
            Error::Request(RequestError::InvalidJson(_)) => ErrorCode::InvalidJson,
            Error::Request(RequestError::MethodNotAllowed(_)) => ErrorCode::MethodNotAllowed,
            Error::Unavailable(_) => ErrorCode::VectorizeUnavailable,
            _ => ErrorCode::InternalError,
        }
    }
}

/// Stable error codes surfaced to API callers for programmatic branching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    InvalidRequest,
    InvalidJson,
    MethodNotAllowed,
    VectorizeUnavailable,
    InternalError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::InvalidRequest => "INVALID_REQUEST",
            ErrorCode::InvalidJson => "INVALID_JSON",
            ErrorCode::MethodNotAllowed => "METHOD_NOT_ALLOWED",
            ErrorCode::VectorizeUnavailable => "VECTORIZE_UNAVAILABLE",
            ErrorCode::InternalError => "INTERNAL_ERROR",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// --- Bounded context errors ---

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    #[error("{0}")]
    InvalidRequest(String),

    #[error("Invalid JSON body: {0}")]
    InvalidJson(String),

    #[error("Method {0} not allowed")]
    MethodNotAllowed(String),
}

#[derive(Debug, Clone, Error)]
pub enum EmbedderError {
    #[error("Embedding API request failed: {message} (status: {status_code})")]
    Api { status_code: u16, message: String },

    #[error("Rate limited by embedder, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Embedder not configured: {0}")]
    NotConfigured(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid embedding response: {0}")]
    InvalidResponse(String),
}

#[derive(Debug, Clone, Error)]
pub enum VectorStoreError {
    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid query response: {0}")]
    InvalidResponse(String),

    #[error("Catalog error: {0}")]
    Catalog(String),
}
