//! Capability implementations for StickerMatch.
//!
//! Embedders implement `stickermatch_core::Embedder`, stores implement
//! `stickermatch_core::VectorStore`. The router builds both from
//! configuration.

pub mod noop;
pub mod openai_compat;
pub mod router;
pub mod vectorize;
pub mod workers_ai;

pub use noop::NoopEmbedder;
pub use openai_compat::OpenAiCompatEmbedder;
pub use router::{build_embedder, build_store};
pub use vectorize::VectorizeStore;
pub use workers_ai::WorkersAiEmbedder;

use serde::Deserialize;
use stickermatch_core::error::EmbedderError;
use tracing::warn;

/// Root of the Cloudflare REST API.
pub(crate) const CLOUDFLARE_API_BASE: &str = "https://api.cloudflare.com/client/v4";

/// Build an HTTP client with a request timeout.
pub(crate) fn http_client(timeout_secs: u64) -> reqwest::Client {
    client_or_default(
        reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build(),
    )
}

fn client_or_default(built: reqwest::Result<reqwest::Client>) -> reqwest::Client {
    built.unwrap_or_else(|e| {
        warn!(error = %e, "Failed to build HTTP client; falling back to defaults without a timeout");
        reqwest::Client::new()
    })
}

/// Map a non-success HTTP status from an embedding API to an error.
pub(crate) fn status_error(status: u16, body: String) -> EmbedderError {
    match status {
        401 | 403 => EmbedderError::AuthenticationFailed(
            "Invalid API key or insufficient permissions".into(),
        ),
        429 => EmbedderError::RateLimited {
            retry_after_secs: 5,
        },
        _ => EmbedderError::Api {
            status_code: status,
            message: body,
        },
    }
}

/// An entry of the `errors` array in Cloudflare API envelopes.
#[derive(Debug, Deserialize)]
pub(crate) struct CloudflareMessage {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub message: String,
}

pub(crate) fn join_errors(errors: &[CloudflareMessage]) -> String {
    if errors.is_empty() {
        return "unknown error".into();
    }
    errors
        .iter()
        .map(|e| format!("{} ({})", e.message, e.code))
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_errors() {
        assert!(matches!(
            status_error(403, String::new()),
            EmbedderError::AuthenticationFailed(_)
        ));
        assert!(matches!(
            status_error(429, String::new()),
            EmbedderError::RateLimited { .. }
        ));
        assert!(matches!(
            status_error(500, "boom".into()),
            EmbedderError::Api { status_code: 500, .. }
        ));
    }

    #[test]
    fn client_falls_back_when_the_builder_fails() {
        let built = reqwest::Client::builder()
            .user_agent("bad\nagent")
            .build();
        assert!(built.is_err());

        let client = client_or_default(built);
        assert!(client.get("http://localhost/").build().is_ok());
    }

    #[test]
    fn configured_client_builds() {
        let client = http_client(5);
        assert!(client.get("http://localhost/").build().is_ok());
    }

    #[test]
    fn joins_cloudflare_errors() {
        assert_eq!(join_errors(&[]), "unknown error");
        let errors = vec![
            CloudflareMessage {
                code: 10000,
                message: "Authentication error".into(),
            },
            CloudflareMessage {
                code: 7003,
                message: "Could not route".into(),
            },
        ];
        assert_eq!(
            join_errors(&errors),
            "Authentication error (10000); Could not route (7003)"
        );
    }
}
