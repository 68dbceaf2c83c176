//! Prediction History Routes

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;

use crate::AppState;
use storage::PredictionRecord;

/// Query parameters for predictions endpoint
#[derive(Debug, Deserialize)]
pub struct PredictionQuery {
    /// Filter by label (`Phishing` or `Legitimate`)
    pub label: Option<String>,
    /// Maximum number of records
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    50
}

/// Response for predictions endpoint
#[derive(Debug, Serialize)]
pub struct PredictionResponse {
    pub data: Vec<PredictionRecord>,
    pub count: usize,
}

/// Get recent predictions, newest first
pub async fn get_predictions(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PredictionQuery>,
) -> Json<PredictionResponse> {
    let limit = params.limit.min(500);

    let data = state
        .repository
        .get_predictions(params.label.as_deref(), limit)
        .unwrap_or_else(|e| {
            warn!("Failed to read prediction history: {}", e);
            Vec::new()
        });

    Json(PredictionResponse {
        count: data.len(),
        data,
    })
}
