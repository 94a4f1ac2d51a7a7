//! Cloudflare Vectorize vector store.
//!
//! Queries `POST /accounts/{account}/vectorize/v2/indexes/{index}/query`
//! and maps `result.matches` to [`VectorMatch`]es. Metadata is requested in
//! full so the sticker display name comes back with each match.

use async_trait::async_trait;
use serde::Deserialize;
use stickermatch_core::error::VectorStoreError;
use stickermatch_core::vector_store::{VectorMatch, VectorStore};
use tracing::{debug, warn};

use crate::CLOUDFLARE_API_BASE;

pub struct VectorizeStore {
    base_url: String,
    account_id: String,
    api_token: String,
    index_name: String,
    max_query_limit: usize,
    client: reqwest::Client,
}

impl VectorizeStore {
    pub fn new(
        account_id: impl Into<String>,
        api_token: impl Into<String>,
        index_name: impl Into<String>,
        max_query_limit: usize,
        timeout_secs: u64,
    ) -> Self {
        Self {
            base_url: CLOUDFLARE_API_BASE.to_string(),
            account_id: account_id.into(),
            api_token: api_token.into(),
            index_name: index_name.into(),
            max_query_limit,
            client: crate::http_client(timeout_secs),
        }
    }

    /// Point the client at another API root (proxies, tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn query_url(&self) -> String {
        format!(
            "{}/accounts/{}/vectorize/v2/indexes/{}/query",
            self.base_url, self.account_id, self.index_name
        )
    }
}

#[async_trait]
impl VectorStore for VectorizeStore {
    fn name(&self) -> &str {
        "vectorize"
    }

    fn max_query_limit(&self) -> usize {
        self.max_query_limit
    }

    async fn query(&self, vector: &[f32], limit: usize) -> Result<Vec<VectorMatch>, VectorStoreError> {
        let top_k = limit.min(self.max_query_limit);
        debug!(index = %self.index_name, top_k, "Querying Vectorize");

        let response = self
            .client
            .post(self.query_url())
            .bearer_auth(&self.api_token)
            .json(&serde_json::json!({
                "vector": vector,
                "topK": top_k,
                "returnValues": false,
                "returnMetadata": "all",
            }))
            .send()
            .await
            .map_err(|e| VectorStoreError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        if !(200..300).contains(&status) {
            let error_body = response.text().await.unwrap_or_default();
            warn!(status, index = %self.index_name, "Vectorize query rejected");
            return Err(VectorStoreError::QueryFailed(format!(
                "status {status}: {error_body}"
            )));
        }

        let body: QueryResponse = response
            .json()
            .await
            .map_err(|e| VectorStoreError::InvalidResponse(e.to_string()))?;

        into_matches(body)
    }
}

fn into_matches(body: QueryResponse) -> Result<Vec<VectorMatch>, VectorStoreError> {
    if !body.success {
        return Err(VectorStoreError::QueryFailed(crate::join_errors(&body.errors)));
    }
    let result = body
        .result
        .ok_or_else(|| VectorStoreError::InvalidResponse("missing result".into()))?;

    Ok(result
        .matches
        .into_iter()
        .map(|m| VectorMatch {
            id: m.id,
            score: m.score,
            metadata: m.metadata.unwrap_or_default(),
        })
        .collect())
}

#[derive(Deserialize)]
struct QueryResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    result: Option<QueryResult>,
    #[serde(default)]
    errors: Vec<crate::CloudflareMessage>,
}

#[derive(Deserialize)]
struct QueryResult {
    #[serde(default)]
    matches: Vec<ApiMatch>,
}

#[derive(Deserialize)]
struct ApiMatch {
    id: String,
    score: f32,
    #[serde(default)]
    metadata: Option<serde_json::Map<String, serde_json::Value>>,
}
