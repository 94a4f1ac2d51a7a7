//! `stickermatch recommend` — One recommendation from the command line.
//!
//! Runs the same pipeline as the gateway and prints the same envelope.

use tracing::{debug, warn};

use stickermatch_config::AppConfig;
use stickermatch_core::request::RecommendationRequest;
use stickermatch_core::sticker::RecommendationResult;
use stickermatch_gateway::GatewayState;
use stickermatch_gateway::recommend::{ApiError, SuccessEnvelope, recommend_with};

pub async fn run(
    prompt: String,
    top_k: Option<i64>,
    exclude: Option<Vec<String>>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let state = stickermatch_gateway::build_state(&config)?;

    match recommend(&state, &prompt, top_k, exclude).await {
        Ok(result) => {
            debug!(count = result.stickers.len(), "Recommendation complete");
            println!("{}", serde_json::to_string_pretty(&SuccessEnvelope::from(result))?);
            Ok(())
        }
        Err(err) => {
            warn!(code = %err.code, "Recommendation failed");
            println!("{}", serde_json::to_string_pretty(&err.envelope())?);
            Err(format!("{}: {}", err.code, err.message).into())
        }
    }
}

async fn recommend(
    state: &GatewayState,
    prompt: &str,
    top_k: Option<i64>,
    exclude: Option<Vec<String>>,
) -> Result<RecommendationResult, ApiError> {
    recommend_with(state, || {
        RecommendationRequest::from_parts(prompt, top_k, exclude)
    })
    .await
}
