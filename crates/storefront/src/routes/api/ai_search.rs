//! `POST /api/search/ai`: image or text search over product embeddings.

use axum::{Json, extract::State};
use serde::Serialize;

use crate::error::Result;
use crate::models::{Product, ProductMatch};
use crate::services::ai::{AiSearch, AiSearchOutcome, AiSearchRequest};
use crate::state::AppState;

const FALLBACK_MESSAGE: &str = "AI service currently at capacity. Showing keyword matches.";

#[derive(Debug, Serialize)]
#[serde(untagged, rename_all_fields = "camelCase")]
pub enum AiSearchResponse {
    Matches {
        results: Vec<ProductMatch>,
        count: usize,
        category: String,
    },
    Fallback {
        results: Vec<Product>,
        is_fallback: bool,
        message: &'static str,
    },
}

impl From<AiSearchOutcome> for AiSearchResponse {
    fn from(outcome: AiSearchOutcome) -> Self {
        match outcome {
            AiSearchOutcome::Matches { results, category } => Self::Matches {
                count: results.len(),
                results,
                category,
            },
            AiSearchOutcome::Fallback { results } => Self::Fallback {
                results,
                is_fallback: true,
                message: FALLBACK_MESSAGE,
            },
        }
    }
}

pub async fn search(
    State(state): State<AppState>,
    Json(request): Json<AiSearchRequest>,
) -> Result<Json<AiSearchResponse>> {
    let outcome = AiSearch::new(state.embedder(), state.vision(), state.pool())
        .run(&request)
        .await?;
    Ok(Json(outcome.into()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_response_shape() {
        let response = AiSearchResponse::from(AiSearchOutcome::Fallback {
            results: Vec::new(),
        });
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["isFallback"], true);
        assert_eq!(json["message"], FALLBACK_MESSAGE);
        assert!(json["results"].as_array().unwrap().is_empty());
        assert!(json.get("count").is_none());
    }

    #[test]
    fn test_matches_response_counts_results() {
        let response = AiSearchResponse::from(AiSearchOutcome::Matches {
            results: Vec::new(),
            category: "rings".to_owned(),
        });
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["count"], 0);
        assert_eq!(json["category"], "rings");
    }
}
