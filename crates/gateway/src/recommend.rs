//! `/recommend` — the recommendation endpoint.
//!
//! Every method reaches the same handler. The method picks a request
//! adapter from [`normalizer_for`]; checks run in a fixed order:
//! method, store availability, input, pipeline.

use std::collections::HashMap;

use axum::{
    Json,
    body::Bytes,
    extract::{
        Query, State,
        rejection::{BytesRejection, QueryRejection},
    },
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::{Instrument, error, info_span, warn};

use stickermatch_core::error::{Error, ErrorCode, RequestError};
use stickermatch_core::request::{
    Normalizer, RawRequest, RecommendationRequest, from_json, from_query,
};
use stickermatch_core::sticker::RecommendationResult;

use crate::{GatewayState, SharedState};

/// Message sent for pipeline failures; the cause is only logged.
const INTERNAL_MESSAGE: &str = "Failed to generate recommendations";

const UNAVAILABLE_MESSAGE: &str = "Vector search is not configured";

/// Request adapter for each accepted method.
pub fn normalizer_for(method: &Method) -> Option<Normalizer> {
    match *method {
        Method::GET => Some(from_query),
        Method::POST => Some(from_json),
        _ => None,
    }
}

/// HTTP status carried by each error code.
pub fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::InvalidRequest | ErrorCode::InvalidJson => StatusCode::BAD_REQUEST,
        ErrorCode::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
        ErrorCode::VectorizeUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

// ── Envelopes ────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct SuccessEnvelope {
    pub success: bool,
    #[serde(flatten)]
    pub result: RecommendationResult,
}

impl From<RecommendationResult> for SuccessEnvelope {
    fn from(result: RecommendationResult) -> Self {
        Self {
            success: true,
            result,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorEnvelope {
    pub success: bool,
    pub error: ErrorBody,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
}

/// A failed recommendation, ready to be rendered as an error envelope.
#[derive(Debug)]
pub struct ApiError {
    pub code: ErrorCode,
    pub message: String,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        status_for(self.code)
    }

    pub fn envelope(&self) -> ErrorEnvelope {
        ErrorEnvelope {
            success: false,
            error: ErrorBody {
                code: self.code.as_str(),
                message: self.message.clone(),
            },
        }
    }
}

impl From<RequestError> for ApiError {
    fn from(err: RequestError) -> Self {
        let code = Error::Request(err.clone()).code();
        let message = match err {
            RequestError::InvalidRequest(m)
            | RequestError::InvalidJson(m)
            | RequestError::MethodNotAllowed(m) => m,
        };
        Self::new(code, message)
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        match err {
            Error::Request(request) => request.into(),
            Error::Unavailable(reason) => Self::new(ErrorCode::VectorizeUnavailable, reason),
            other => {
                error!(error = %other, "Recommendation pipeline failed");
                Self::new(ErrorCode::InternalError, INTERNAL_MESSAGE)
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(self.envelope())).into_response()
    }
}

// ── Handler ──────────────────────────────────────────────────────────────

/// `ANY /recommend`, `ANY /api/recommend`
pub async fn recommend_handler(
    State(state): State<SharedState>,
    method: Method,
    query: Result<Query<HashMap<String, String>>, QueryRejection>,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    if method == Method::OPTIONS {
        return StatusCode::NO_CONTENT.into_response();
    }

    let request_id = uuid::Uuid::new_v4();
    let span = info_span!("recommend", %request_id, %method);

    match recommend(&state, &method, query, body).instrument(span).await {
        Ok(result) => (StatusCode::OK, Json(SuccessEnvelope::from(result))).into_response(),
        Err(err) => err.into_response(),
    }
}

/// Run one HTTP request through the checks and the pipeline.
pub async fn recommend(
    state: &GatewayState,
    method: &Method,
    query: Result<Query<HashMap<String, String>>, QueryRejection>,
    body: Result<Bytes, BytesRejection>,
) -> Result<RecommendationResult, ApiError> {
    let Some(normalize) = normalizer_for(method) else {
        warn!("Rejected unsupported method");
        return Err(RequestError::MethodNotAllowed(format!(
            "Method {method} not allowed; use GET or POST"
        ))
        .into());
    };

    recommend_with(state, || {
        let body = body.map_err(|rejection| {
            warn!(status = %rejection.status(), "Request body rejected");
            RequestError::InvalidRequest(rejection.body_text())
        })?;
        let params = match query {
            Ok(Query(params)) => params,
            Err(rejection) if *method == Method::GET => {
                return Err(RequestError::InvalidRequest(rejection.body_text()));
            }
            Err(_) => HashMap::new(),
        };
        normalize(&RawRequest {
            query: &params,
            body: &body,
        })
    })
    .await
}

/// Store availability, then input, then the pipeline.
///
/// `normalize` only runs once a store is known to be available. Shared by
/// the HTTP handler and the CLI.
pub async fn recommend_with<F>(
    state: &GatewayState,
    normalize: F,
) -> Result<RecommendationResult, ApiError>
where
    F: FnOnce() -> Result<RecommendationRequest, RequestError>,
{
    let recommender = state
        .recommender
        .as_ref()
        .ok_or_else(|| Error::Unavailable(UNAVAILABLE_MESSAGE.into()))?;

    let request = normalize()?;

    Ok(recommender.recommend(&request).await?)
}
