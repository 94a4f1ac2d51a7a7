//! Request normalization.
//!
//! Both transport shapes (query string and JSON body) converge on a single
//! validated [`RecommendationRequest`]. The request can only be built through
//! the parse functions here, so a value of that type is always valid:
//! trimmed non-empty prompt, in-range `top_k`, bounded distinct exclusions.
//!
//! An unusable `topK` is replaced by the default; an unusable `prompt` is
//! rejected.

use std::collections::HashMap;

use serde_json::Value;

use crate::error::RequestError;
use crate::sticker::{MAX_RECENT_EXCLUSIONS, TopK};

/// Recently used stickers, in the shape the transport delivered them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecentUsage {
    /// Sticker identifiers, already distinct and bounded (query form).
    Identifiers(Vec<String>),
    /// Raw message texts that may embed sticker references (JSON form).
    Messages(Vec<String>),
}

/// A validated recommendation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecommendationRequest {
    prompt: String,
    top_k: TopK,
    recent: Option<RecentUsage>,
}

/// Raw transport input handed to a normalizer.
#[derive(Debug, Clone, Copy)]
pub struct RawRequest<'a> {
    pub query: &'a HashMap<String, String>,
    pub body: &'a [u8],
}

/// Signature shared by both transport adapters.
pub type Normalizer = fn(&RawRequest<'_>) -> Result<RecommendationRequest, RequestError>;

impl RecommendationRequest {
    /// Build a request from already-separated parts.
    ///
    /// `exclude` is treated as sticker identifiers: trimmed, empties dropped,
    /// de-duplicated in first-seen order and capped at
    /// [`MAX_RECENT_EXCLUSIONS`]. `None` means no exclusion at all.
    pub fn from_parts<I>(
        prompt: &str,
        top_k: Option<i64>,
        exclude: Option<I>,
    ) -> Result<Self, RequestError>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let prompt = normalize_prompt(Some(prompt))?;
        let recent = exclude.map(|ids| {
            RecentUsage::Identifiers(distinct_bounded(
                ids.into_iter().map(|s| s.as_ref().trim().to_string()),
                MAX_RECENT_EXCLUSIONS,
            ))
        });
        Ok(Self {
            prompt,
            top_k: TopK::or_default(top_k),
            recent,
        })
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn top_k(&self) -> TopK {
        self.top_k
    }

    pub fn recent(&self) -> Option<&RecentUsage> {
        self.recent.as_ref()
    }
}

/// Query-string adapter (`?prompt=...&topK=...&excludeRecent=a,b`).
pub fn from_query(raw: &RawRequest<'_>) -> Result<RecommendationRequest, RequestError> {
    let prompt = normalize_prompt(raw.query.get("prompt").map(String::as_str))?;

    let top_k = TopK::or_default(
        raw.query
            .get("topK")
            .and_then(|v| v.trim().parse::<i64>().ok()),
    );

    let recent = raw.query.get("excludeRecent").map(|list| {
        RecentUsage::Identifiers(distinct_bounded(
            list.split(',').map(|s| s.trim().to_string()),
            MAX_RECENT_EXCLUSIONS,
        ))
    });

    Ok(RecommendationRequest {
        prompt,
        top_k,
        recent,
    })
}

/// JSON-body adapter (`{"prompt": "...", "topK": 5, "excludeRecent": [...]}`).
pub fn from_json(raw: &RawRequest<'_>) -> Result<RecommendationRequest, RequestError> {
    let body: Value =
        serde_json::from_slice(raw.body).map_err(|e| RequestError::InvalidJson(e.to_string()))?;

    let Value::Object(fields) = body else {
        return Err(RequestError::InvalidRequest(
            "Request body must be a JSON object".into(),
        ));
    };

    let prompt = normalize_prompt(fields.get("prompt").and_then(Value::as_str))?;

    let top_k = TopK::or_default(fields.get("topK").and_then(json_integer));

    let recent = match fields.get("excludeRecent") {
        None | Some(Value::Null) => None,
        Some(Value::Array(items)) => {
            let messages = items
                .iter()
                .map(|item| {
                    item.as_str().map(str::to_string).ok_or_else(|| {
                        RequestError::InvalidRequest(
                            "excludeRecent must be an array of strings".into(),
                        )
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            Some(RecentUsage::Messages(messages))
        }
        Some(_) => {
            return Err(RequestError::InvalidRequest(
                "excludeRecent must be an array of strings".into(),
            ));
        }
    };

    Ok(RecommendationRequest {
        prompt,
        top_k,
        recent,
    })
}

/// Collect distinct non-empty strings in first-seen order, stopping at `max`.
pub fn distinct_bounded<I>(items: I, max: usize) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut out: Vec<String> = Vec::new();
    for item in items {
        if out.len() >= max {
            break;
        }
        if !item.is_empty() && !out.contains(&item) {
            out.push(item);
        }
    }
    out
}

fn normalize_prompt(prompt: Option<&str>) -> Result<String, RequestError> {
    match prompt.map(str::trim) {
        Some(p) if !p.is_empty() => Ok(p.to_string()),
        _ => Err(RequestError::InvalidRequest(
            "prompt is required and must be a non-empty string".into(),
        )),
    }
}

/// Integral JSON numbers only; `5.0` counts, `5.5` and `"5"` do not.
fn json_integer(value: &Value) -> Option<i64> {
    if let Some(i) = value.as_i64() {
        return Some(i);
    }
    let f = value.as_f64()?;
    (f.fract() == 0.0 && f.abs() <= i64::MAX as f64).then_some(f as i64)
}
