//! OpenAI-compatible embedding provider.
//!
//! Works with: OpenAI, OpenRouter, Ollama, vLLM, Together AI, and any
//! endpoint exposing `POST /embeddings` in the OpenAI format.

use async_trait::async_trait;
use serde::Deserialize;
use stickermatch_core::embedder::Embedder;
use stickermatch_core::error::EmbedderError;
use tracing::{debug, warn};

/// Model used when the config does not name one.
pub const DEFAULT_MODEL: &str = "text-embedding-3-small";

/// An OpenAI-compatible embedder.
pub struct OpenAiCompatEmbedder {
    name: String,
    base_url: String,
    api_key: String,
    model: String,
    client: reqwest::Client,
}

impl OpenAiCompatEmbedder {
    /// Create a new OpenAI-compatible embedder.
    pub fn new(
        name: impl Into<String>,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        timeout_secs: u64,
    ) -> Self {
        Self {
            name: name.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: model.into(),
            client: crate::http_client(timeout_secs),
        }
    }

    /// Create an OpenAI embedder (convenience constructor).
    pub fn openai(api_key: impl Into<String>) -> Self {
        Self::new("openai", "https://api.openai.com/v1", api_key, DEFAULT_MODEL, 30)
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl Embedder for OpenAiCompatEmbedder {
    fn name(&self) -> &str {
        &self.name
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedderError> {
        let url = format!("{}/embeddings", self.base_url);

        let body = serde_json::json!({
            "model": self.model,
            "input": [text],
            "encoding_format": "float",
        });

        debug!(provider = %self.name, model = %self.model, "Sending embedding request");

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| EmbedderError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        if status != 200 {
            let error_body = response.text().await.unwrap_or_default();
            warn!(provider = %self.name, status, "Embedding request rejected");
            return Err(crate::status_error(status, error_body));
        }

        let api_resp: EmbeddingApiResponse = response
            .json()
            .await
            .map_err(|e| EmbedderError::InvalidResponse(e.to_string()))?;

        first_embedding(api_resp)
    }
}

fn first_embedding(resp: EmbeddingApiResponse) -> Result<Vec<f32>, EmbedderError> {
    resp.data
        .into_iter()
        .next()
        .map(|d| d.embedding)
        .filter(|e| !e.is_empty())
        .ok_or_else(|| EmbedderError::InvalidResponse("no embedding in response".into()))
}

// --- OpenAI API types ---

#[derive(Deserialize)]
struct EmbeddingApiResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}
