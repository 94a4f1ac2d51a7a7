//! HTTP API gateway for StickerMatch.
//!
//! Exposes the recommendation endpoint (`/recommend`, `/api/recommend`)
//! and a health check.
//!
//! Built on Axum for high performance async HTTP.

pub mod recommend;

use axum::extract::DefaultBodyLimit;
use axum::{
    Router,
    extract::State,
    http::{HeaderValue, Method, StatusCode, header},
    middleware::{self, Next},
    response::{Json, Response},
    routing::{any, get},
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tracing::{info, warn};

use stickermatch_config::{AppConfig, GatewayConfig};
use stickermatch_search::{RecencyExtractor, Recommender, SimilaritySearcher};

/// Shared application state for the gateway.
///
/// `recommender` is `None` when no vector store is available; every
/// recommendation then answers `VECTORIZE_UNAVAILABLE`.
pub struct GatewayState {
    pub recommender: Option<Arc<Recommender>>,
    pub started_at: chrono::DateTime<chrono::Utc>,
}

impl GatewayState {
    pub fn new(recommender: Option<Arc<Recommender>>) -> Self {
        Self {
            recommender,
            started_at: chrono::Utc::now(),
        }
    }
}

pub type SharedState = Arc<GatewayState>;

/// Wire the recommendation pipeline from configuration.
///
/// Builds the embedder, the store and the recency extractor once; the
/// result is shared by every request.
pub fn build_state(config: &AppConfig) -> Result<SharedState, Box<dyn std::error::Error>> {
    let extractor = RecencyExtractor::new(
        config.recency.builtin_patterns,
        &config.recency.extra_patterns,
    )?;
    let embedder = stickermatch_providers::build_embedder(config);
    let recommender = stickermatch_providers::build_store(config)?.map(|store| {
        Arc::new(Recommender::new(
            SimilaritySearcher::new(embedder, store),
            extractor,
        ))
    });

    if recommender.is_none() {
        warn!(
            backend = %config.vector_store.backend,
            "No vector store available; /recommend will answer 503"
        );
    }

    Ok(Arc::new(GatewayState::new(recommender)))
}

/// Build the Axum router with all gateway routes.
///
/// Layers applied:
/// - CORS (origins from `gateway.cors_allowed_origins`)
/// - Allowed methods and headers on every response
/// - Request body size limit
/// - HTTP trace logging
pub fn build_router(state: SharedState, config: &GatewayConfig) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/recommend", any(recommend::recommend_handler))
        .route("/api/recommend", any(recommend::recommend_handler))
        .with_state(state)
        .layer(DefaultBodyLimit::max(config.body_limit_bytes))
        .layer(cors_layer(&config.cors_allowed_origins))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(ALLOWED_METHODS),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static(ALLOWED_HEADERS),
        ))
        .layer(middleware::from_fn(preflight_no_content))
        .layer(tower_http::trace::TraceLayer::new_for_http())
}

const ALLOWED_METHODS: &str = "GET, POST, OPTIONS";
const ALLOWED_HEADERS: &str = "Content-Type";

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allow_origin = if origins.is_empty() || origins.iter().any(|o| o == "*") {
        AllowOrigin::any()
    } else {
        let parsed: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|origin| match origin.parse::<HeaderValue>() {
                Ok(value) => Some(value),
                Err(_) => {
                    warn!(origin = %origin, "Ignoring invalid CORS origin");
                    None
                }
            })
            .collect();
        AllowOrigin::list(parsed)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
        .max_age(std::time::Duration::from_secs(86400))
}

/// Preflights answered by the CORS layer carry no body; report them as 204.
async fn preflight_no_content(req: axum::extract::Request, next: Next) -> Response {
    let is_options = req.method() == Method::OPTIONS;
    let mut response = next.run(req).await;
    if is_options && response.status() == StatusCode::OK {
        *response.status_mut() = StatusCode::NO_CONTENT;
    }
    response
}

/// Start the gateway HTTP server.
pub async fn start(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let host = config.gateway.host.clone();
    let port = config.gateway.port;
    let addr = format!("{host}:{port}");

    let state = build_state(&config)?;
    let app = build_router(state, &config.gateway);

    info!(addr = %addr, "Gateway starting");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// --- Handlers ---

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    vector_search: &'static str,
    uptime_secs: i64,
}

async fn health_handler(State(state): State<SharedState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        vector_search: if state.recommender.is_some() {
            "available"
        } else {
            "unavailable"
        },
        uptime_secs: (chrono::Utc::now() - state.started_at).num_seconds(),
    })
}
