//! Prediction Routes

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use inference_engine::InferenceResult;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};
use url_features::extract_features;

use crate::{ApiError, AppState};
use storage::PredictionRecord;

/// Body carrying a URL to classify
#[derive(Debug, Deserialize)]
pub struct UrlRequest {
    pub url: Option<String>,
}

impl UrlRequest {
    /// The URL, rejecting absent or empty values
    pub fn into_url(self) -> Result<String, ApiError> {
        match self.url {
            Some(url) if !url.is_empty() => Ok(url),
            _ => Err(ApiError::MissingUrl),
        }
    }
}

/// Body carrying a pre-extracted feature array
#[derive(Debug, Deserialize)]
pub struct FeaturesRequest {
    pub features: Vec<f64>,
}

/// Classification response
#[derive(Debug, Serialize)]
pub struct PredictResponse {
    /// Phishing probability rounded to two decimals
    pub probability: f64,
    pub label: &'static str,
}

impl From<&InferenceResult> for PredictResponse {
    fn from(result: &InferenceResult) -> Self {
        Self {
            probability: (result.prediction.probability * 100.0).round() / 100.0,
            label: result.prediction.verdict.as_str(),
        }
    }
}

fn observe(result: &InferenceResult) {
    let label = result.prediction.verdict.as_str();
    metrics::counter!("phishing_predictions_total", "label" => label).increment(1);
    metrics::histogram!("phishing_inference_latency_us").record(result.latency_us as f64);
}

/// Classify a URL
pub async fn predict_url(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<UrlRequest>, JsonRejection>,
) -> Result<Json<PredictResponse>, ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let url = request.into_url()?;
    let engine = state.engine()?;

    let features = extract_features(&url);
    debug!("Extracted features: {}", features);

    let result = engine.predict(features.values())?;
    observe(&result);
    info!(
        "Prediction for {}: {} (p={:.2})",
        url,
        result.prediction.verdict.as_str(),
        result.prediction.probability
    );

    let record = PredictionRecord {
        id: 0,
        timestamp_ms: result.prediction.timestamp_ms as i64,
        url,
        label: result.prediction.verdict.as_str().to_string(),
        probability: result.prediction.probability,
    };
    if let Err(e) = state.repository.insert_prediction(record) {
        warn!("Failed to record prediction: {}", e);
    }

    Ok(Json(PredictResponse::from(&result)))
}

/// Classify a feature array extracted by the caller
pub async fn predict_features(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<FeaturesRequest>, JsonRejection>,
) -> Result<Json<PredictResponse>, ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let engine = state.engine()?;

    let result = engine.predict(&request.features)?;
    observe(&result);

    Ok(Json(PredictResponse::from(&result)))
}
