//! Capability router — builds the embedder and vector store named in config.

use std::path::Path;
use std::sync::Arc;

use stickermatch_config::AppConfig;
use stickermatch_core::embedder::Embedder;
use stickermatch_core::error::Result;
use stickermatch_core::vector_store::VectorStore;
use stickermatch_search::InMemoryStore;
use tracing::{info, warn};

use crate::noop::NoopEmbedder;
use crate::openai_compat::{self, OpenAiCompatEmbedder};
use crate::vectorize::VectorizeStore;
use crate::workers_ai::{self, WorkersAiEmbedder};

const OPENAI_API_URL: &str = "https://api.openai.com/v1";

/// Build the configured embedder.
///
/// Missing credentials do not fail startup: the embedder is replaced by a
/// [`NoopEmbedder`] and each request reports the reason.
pub fn build_embedder(config: &AppConfig) -> Arc<dyn Embedder> {
    let embedder = &config.embedder;
    let provider = embedder.provider.as_str();

    match provider {
        "none" => Arc::new(NoopEmbedder::new("embedder.provider is \"none\"")),
        "workers_ai" => {
            let (Some(account), Some(token)) = (
                config.cloudflare.account_id.as_deref(),
                config.cloudflare.api_token.as_deref(),
            ) else {
                warn!("Workers AI embedder selected without Cloudflare credentials");
                return Arc::new(NoopEmbedder::new(
                    "Workers AI needs cloudflare.account_id and cloudflare.api_token",
                ));
            };
            let model = embedder.model.as_deref().unwrap_or(workers_ai::DEFAULT_MODEL);
            info!(model, "Using Workers AI embedder");
            let mut built = WorkersAiEmbedder::new(account, token, model, embedder.timeout_secs);
            if let Some(url) = &embedder.api_url {
                built = built.with_base_url(url.as_str());
            }
            Arc::new(built)
        }
        _ => {
            let base_url = embedder
                .api_url
                .as_deref()
                .unwrap_or(OPENAI_API_URL);
            let model = embedder.model.as_deref().unwrap_or(openai_compat::DEFAULT_MODEL);
            let api_key = embedder.api_key.clone().unwrap_or_default();
            if api_key.is_empty() && provider == "openai" {
                warn!("OpenAI embedder selected without an API key");
            }
            info!(provider, model, base_url, "Using OpenAI-compatible embedder");
            Arc::new(OpenAiCompatEmbedder::new(
                provider,
                base_url,
                api_key,
                model,
                embedder.timeout_secs,
            ))
        }
    }
}

/// Build the configured vector store.
///
/// `Ok(None)` means no store is available (backend `none`, or Vectorize
/// without credentials); the gateway answers with `VECTORIZE_UNAVAILABLE`.
/// A catalog that cannot be loaded is an error.
pub fn build_store(config: &AppConfig) -> Result<Option<Arc<dyn VectorStore>>> {
    let store = &config.vector_store;

    match store.backend.as_str() {
        "vectorize" => {
            let (Some(account), Some(token)) = (
                config.cloudflare.account_id.as_deref(),
                config.cloudflare.api_token.as_deref(),
            ) else {
                warn!("Vectorize backend selected without Cloudflare credentials; store unavailable");
                return Ok(None);
            };
            info!(index = %store.index_name, "Using Vectorize store");
            let vectorize: Arc<dyn VectorStore> = Arc::new(VectorizeStore::new(
                account,
                token,
                store.index_name.as_str(),
                store.max_query_limit,
                store.timeout_secs,
            ));
            Ok(Some(vectorize))
        }
        "in_memory" => {
            let Some(path) = store.catalog_path.as_deref() else {
                warn!("in_memory backend selected without a catalog path; store unavailable");
                return Ok(None);
            };
            let catalog = InMemoryStore::from_file(Path::new(path))?
                .with_max_query_limit(store.max_query_limit);
            info!(path, stickers = catalog.len(), "Using in-memory store");
            let catalog: Arc<dyn VectorStore> = Arc::new(catalog);
            Ok(Some(catalog))
        }
        other => {
            if other != "none" {
                warn!(backend = other, "Unknown vector store backend; store unavailable");
            }
            Ok(None)
        }
    }
}
