//! Cloudflare Workers AI embedding provider.
//!
//! Calls `POST /accounts/{account}/ai/run/{model}` on the Cloudflare REST
//! API with `{"text": [...]}` and reads `result.data[0]`.

use async_trait::async_trait;
use serde::Deserialize;
use stickermatch_core::embedder::Embedder;
use stickermatch_core::error::EmbedderError;
use tracing::{debug, warn};

use crate::CLOUDFLARE_API_BASE;

/// Model used when the config does not name one.
pub const DEFAULT_MODEL: &str = "@cf/baai/bge-base-en-v1.5";

pub struct WorkersAiEmbedder {
    base_url: String,
    account_id: String,
    api_token: String,
    model: String,
    client: reqwest::Client,
}

impl WorkersAiEmbedder {
    pub fn new(
        account_id: impl Into<String>,
        api_token: impl Into<String>,
        model: impl Into<String>,
        timeout_secs: u64,
    ) -> Self {
        Self {
            base_url: CLOUDFLARE_API_BASE.to_string(),
            account_id: account_id.into(),
            api_token: api_token.into(),
            model: model.into(),
            client: crate::http_client(timeout_secs),
        }
    }

    /// Point the client at another API root (proxies, tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn run_url(&self) -> String {
        format!(
            "{}/accounts/{}/ai/run/{}",
            self.base_url, self.account_id, self.model
        )
    }
}

#[async_trait]
impl Embedder for WorkersAiEmbedder {
    fn name(&self) -> &str {
        "workers_ai"
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedderError> {
        debug!(model = %self.model, "Sending Workers AI embedding request");

        let response = self
            .client
            .post(self.run_url())
            .bearer_auth(&self.api_token)
            .json(&serde_json::json!({ "text": [text] }))
            .send()
            .await
            .map_err(|e| EmbedderError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        if !(200..300).contains(&status) {
            let error_body = response.text().await.unwrap_or_default();
            warn!(status, "Workers AI rejected embedding request");
            return Err(crate::status_error(status, error_body));
        }

        let body: RunResponse = response
            .json()
            .await
            .map_err(|e| EmbedderError::InvalidResponse(e.to_string()))?;

        first_vector(body)
    }
}

fn first_vector(body: RunResponse) -> Result<Vec<f32>, EmbedderError> {
    if !body.success {
        return Err(EmbedderError::InvalidResponse(format!(
            "Workers AI reported failure: {}",
            crate::join_errors(&body.errors)
        )));
    }
    body.result
        .and_then(|r| r.data.into_iter().next())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| EmbedderError::InvalidResponse("no embedding in response".into()))
}

#[derive(Deserialize)]
struct RunResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    result: Option<RunResult>,
    #[serde(default)]
    errors: Vec<crate::CloudflareMessage>,
}

#[derive(Deserialize)]
struct RunResult {
    #[serde(default)]
    data: Vec<Vec<f32>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Json, Router, extract::Path, routing::post};

    #[test]
    fn run_url_includes_account_and_model() {
        let embedder = WorkersAiEmbedder::new("acct123", "tok", DEFAULT_MODEL, 30);
        assert_eq!(
            embedder.run_url(),
            "https://api.cloudflare.com/client/v4/accounts/acct123/ai/run/@cf/baai/bge-base-en-v1.5"
        );
    }

    #[test]
    fn parses_run_response() {
        let body: RunResponse = serde_json::from_str(
            r#"{"result":{"shape":[1,3],"data":[[0.1,0.2,0.3]]},"success":true,"errors":[],"messages":[]}"#,
        )
        .unwrap();
        assert_eq!(first_vector(body).unwrap(), vec![0.1, 0.2, 0.3]);
    }

    #[test]
    fn unsuccessful_response_is_invalid() {
        let body: RunResponse = serde_json::from_str(
            r#"{"result":null,"success":false,"errors":[{"code":5007,"message":"No such model"}]}"#,
        )
        .unwrap();
        match first_vector(body) {
            Err(EmbedderError::InvalidResponse(msg)) => assert!(msg.contains("No such model")),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn embeds_through_http() {
        let app = Router::new().route(
            "/accounts/{account}/ai/run/{*model}",
            post(
                |Path((account, model)): Path<(String, String)>,
                 Json(body): Json<serde_json::Value>| async move {
                    assert_eq!(account, "acct");
                    assert_eq!(model, "@cf/baai/bge-base-en-v1.5");
                    assert_eq!(body["text"][0], "good night");
                    Json(serde_json::json!({
                        "success": true,
                        "result": {"shape": [1, 2], "data": [[0.25, 0.75]]}
                    }))
                },
            ),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let embedder = WorkersAiEmbedder::new("acct", "tok", DEFAULT_MODEL, 5)
            .with_base_url(format!("http://{addr}"));
        assert_eq!(embedder.embed("good night").await.unwrap(), vec![0.25, 0.75]);
    }
}
