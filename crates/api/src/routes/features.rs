//! Feature Extraction Route

use axum::{extract::rejection::JsonRejection, Json};
use serde::Serialize;
use url_features::{extract_features, FeatureVector, FEATURE_DIMENSION};

use super::predict::UrlRequest;
use crate::ApiError;

/// Extracted features for a URL
#[derive(Debug, Serialize)]
pub struct FeaturesResponse {
    pub url: String,
    pub dimension: usize,
    pub features: FeatureVector,
}

/// Return the feature vector the classifier would see for a URL
pub async fn extract(
    payload: Result<Json<UrlRequest>, JsonRejection>,
) -> Result<Json<FeaturesResponse>, ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let url = request.into_url()?;
    let features = extract_features(&url);

    Ok(Json(FeaturesResponse {
        url,
        dimension: FEATURE_DIMENSION,
        features,
    }))
}
