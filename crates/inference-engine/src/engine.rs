//! Inference Engine Implementation

use crate::classifier::{Classifier, LinearClassifier, OnnxClassifier};
use crate::InferenceError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};
use url_features::{extract_features, StandardScaler, FEATURE_DIMENSION};

/// Classification outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    Legitimate,
    Phishing,
}

impl Verdict {
    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Legitimate => "Legitimate",
            Verdict::Phishing => "Phishing",
        }
    }

    /// Verdict for a probability at the given threshold
    pub fn from_probability(probability: f64, threshold: f64) -> Self {
        if probability >= threshold {
            Verdict::Phishing
        } else {
            Verdict::Legitimate
        }
    }
}

/// Model artifact locations
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// `.onnx` model, or `.json` linear weights
    pub model_path: String,
    /// StandardScaler JSON applied before the classifier
    pub scaler_path: Option<String>,
    /// Probability at or above which a URL is phishing
    pub threshold: f64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model_path: "ml-model/Trained-Model/final_30_features_model.onnx".to_string(),
            scaler_path: Some("ml-model/Trained-Model/standard_scaler.json".to_string()),
            threshold: 0.5,
        }
    }
}

/// Prediction result from inference
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prediction {
    pub verdict: Verdict,
    /// Phishing probability (0.0 to 1.0)
    pub probability: f64,
    /// Timestamp when prediction was made
    pub timestamp_ms: u64,
}

/// Result of inference operation
#[derive(Debug, Clone)]
pub struct InferenceResult {
    pub prediction: Prediction,
    /// Inference latency in microseconds
    pub latency_us: u64,
}

/// Classifier plus the scaler it was trained behind
pub struct InferenceEngine {
    classifier: Box<dyn Classifier>,
    scaler: Option<StandardScaler>,
    threshold: f64,
}

impl InferenceEngine {
    /// Create an engine, checking the scaler matches the classifier width
    pub fn new(
        classifier: Box<dyn Classifier>,
        scaler: Option<StandardScaler>,
        threshold: f64,
    ) -> Result<Self, InferenceError> {
        if let Some(scaler) = &scaler {
            if scaler.dimension() != classifier.input_dimension() {
                return Err(InferenceError::ScalerLoadError(format!(
                    "scaler has {} features, model expects {}",
                    scaler.dimension(),
                    classifier.input_dimension()
                )));
            }
        }

        Ok(Self {
            classifier,
            scaler,
            threshold,
        })
    }

    /// Load model and scaler artifacts
    pub fn load(config: &ModelConfig) -> Result<Self, InferenceError> {
        info!("Creating inference engine with model: {}", config.model_path);

        let model_path = Path::new(&config.model_path);
        let classifier: Box<dyn Classifier> =
            match model_path.extension().and_then(|ext| ext.to_str()) {
                Some("json") => Box::new(LinearClassifier::load(model_path)?),
                _ => Box::new(OnnxClassifier::load(model_path, FEATURE_DIMENSION)?),
            };

        let scaler = match &config.scaler_path {
            Some(path) => Some(
                StandardScaler::load(path)
                    .map_err(|e| InferenceError::ScalerLoadError(format!("{}: {}", path, e)))?,
            ),
            None => None,
        };

        Self::new(classifier, scaler, config.threshold)
    }

    /// Feature count the classifier was trained on
    pub fn input_dimension(&self) -> usize {
        self.classifier.input_dimension()
    }

    pub fn classifier_name(&self) -> &'static str {
        self.classifier.name()
    }

    pub fn has_scaler(&self) -> bool {
        self.scaler.is_some()
    }

    /// Run inference on a raw feature array.
    ///
    /// The array length must match the model input; a mismatch is rejected
    /// before the classifier runs.
    pub fn predict(&self, features: &[f64]) -> Result<InferenceResult, InferenceError> {
        let start = std::time::Instant::now();

        let expected = self.input_dimension();
        if features.len() != expected {
            return Err(InferenceError::InvalidInputShape {
                expected,
                actual: features.len(),
            });
        }

        let probability = match &self.scaler {
            Some(scaler) => {
                let scaled = scaler
                    .transform(features)
                    .map_err(|e| InferenceError::InferenceFailed(e.to_string()))?;
                self.classifier.predict_proba(&scaled)?
            }
            None => self.classifier.predict_proba(features)?,
        };

        let timestamp_ms = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);

        let latency_us = start.elapsed().as_micros() as u64;
        debug!("Inference completed in {}us (p={:.4})", latency_us, probability);

        Ok(InferenceResult {
            prediction: Prediction {
                verdict: Verdict::from_probability(probability, self.threshold),
                probability,
                timestamp_ms,
            },
            latency_us,
        })
    }

    /// Extract features from a URL and classify them
    pub fn predict_url(&self, url: &str) -> Result<InferenceResult, InferenceError> {
        let features = extract_features(url);
        self.predict(features.values())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Weights that fire on `suspicious_tld` and `num_hyphens`
    fn engine() -> InferenceEngine {
        let mut weights = vec![0.0; FEATURE_DIMENSION];
        weights[6] = 1.0;
        weights[29] = 6.0;
        let classifier = LinearClassifier::new(weights, -3.0);
        InferenceEngine::new(Box::new(classifier), None, 0.5).unwrap()
    }

    #[test]
    fn test_legitimate_url() {
        let result = engine().predict_url("https://example.com/").unwrap();
        assert_eq!(result.prediction.verdict, Verdict::Legitimate);
        assert!(result.prediction.probability < 0.5);
    }

    #[test]
    fn test_phishing_url() {
        let result = engine()
            .predict_url("http://secure-login-verify.xyz/update")
            .unwrap();
        assert_eq!(result.prediction.verdict, Verdict::Phishing);
        assert!(result.prediction.probability > 0.9);
    }

    #[test]
    fn test_shape_mismatch_is_rejected() {
        let err = engine().predict(&[0.0; 84]).unwrap_err();
        assert!(matches!(
            err,
            InferenceError::InvalidInputShape { expected: 30, actual: 84 }
        ));
        assert_eq!(err.to_string(), "Expected 30 features, got 84");
    }

    #[test]
    fn test_scaler_is_applied() {
        let classifier = LinearClassifier::new(vec![1.0], 0.0);
        let scaler = StandardScaler {
            mean: vec![10.0],
            scale: vec![2.0],
        };
        let engine = InferenceEngine::new(Box::new(classifier), Some(scaler), 0.5).unwrap();
        // (10 - 10) / 2 = 0 -> sigmoid(0) = 0.5
        let result = engine.predict(&[10.0]).unwrap();
        assert!((result.prediction.probability - 0.5).abs() < 1e-12);
        assert_eq!(result.prediction.verdict, Verdict::Phishing);
    }

    #[test]
    fn test_scaler_width_must_match_model() {
        let classifier = LinearClassifier::new(vec![1.0, 1.0], 0.0);
        let scaler = StandardScaler {
            mean: vec![0.0],
            scale: vec![1.0],
        };
        assert!(matches!(
            InferenceEngine::new(Box::new(classifier), Some(scaler), 0.5),
            Err(InferenceError::ScalerLoadError(_))
        ));
    }

    #[test]
    fn test_load_linear_model_from_config() {
        let dir = tempfile::tempdir().unwrap();
        let model_path = dir.path().join("model.json");
        let model = LinearClassifier::new(vec![0.0; FEATURE_DIMENSION], 0.0);
        std::fs::write(&model_path, serde_json::to_vec(&model).unwrap()).unwrap();

        let config = ModelConfig {
            model_path: model_path.to_string_lossy().into_owned(),
            scaler_path: None,
            threshold: 0.5,
        };
        let engine = InferenceEngine::load(&config).unwrap();
        assert_eq!(engine.input_dimension(), FEATURE_DIMENSION);
        assert_eq!(engine.classifier_name(), "linear");
        assert!(!engine.has_scaler());
    }

    #[test]
    fn test_missing_scaler_fails_load() {
        let dir = tempfile::tempdir().unwrap();
        let model_path = dir.path().join("model.json");
        let model = LinearClassifier::new(vec![0.0; FEATURE_DIMENSION], 0.0);
        std::fs::write(&model_path, serde_json::to_vec(&model).unwrap()).unwrap();

        let config = ModelConfig {
            model_path: model_path.to_string_lossy().into_owned(),
            scaler_path: Some("/nonexistent/scaler.json".into()),
            threshold: 0.5,
        };
        assert!(matches!(
            InferenceEngine::load(&config),
            Err(InferenceError::ScalerLoadError(_))
        ));
    }
}
