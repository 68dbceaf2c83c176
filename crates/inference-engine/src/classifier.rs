//! Classifier Backends

use crate::InferenceError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{debug, info};
use tract_onnx::prelude::*;

/// A trained binary classifier over fixed-length feature arrays
pub trait Classifier: Send + Sync {
    /// Number of features the model was trained on
    fn input_dimension(&self) -> usize;

    /// Probability in [0, 1] that the input is phishing.
    ///
    /// Callers guarantee `input.len() == self.input_dimension()`.
    fn predict_proba(&self, input: &[f64]) -> Result<f64, InferenceError>;

    /// Short backend name for logs and health output
    fn name(&self) -> &'static str;
}

/// ONNX model executed with tract
pub struct OnnxClassifier {
    plan: TypedRunnableModel<TypedModel>,
    dimension: usize,
}

impl OnnxClassifier {
    /// Load and optimize an ONNX model with a `[1, dimension]` f32 input
    pub fn load(path: impl AsRef<Path>, dimension: usize) -> Result<Self, InferenceError> {
        let path = path.as_ref();
        info!("Loading ONNX model from {}", path.display());

        let plan = tract_onnx::onnx()
            .model_for_path(path)
            .and_then(|model| model.with_input_fact(0, f32::fact([1, dimension]).into()))
            .and_then(|model| model.into_optimized())
            .and_then(|model| model.into_runnable())
            .map_err(|e| InferenceError::ModelLoadError(format!("{}: {}", path.display(), e)))?;

        info!("Model loaded successfully ({} inputs)", dimension);
        Ok(Self { plan, dimension })
    }
}

impl Classifier for OnnxClassifier {
    fn input_dimension(&self) -> usize {
        self.dimension
    }

    fn predict_proba(&self, input: &[f64]) -> Result<f64, InferenceError> {
        let data: Vec<f32> = input.iter().map(|&v| v as f32).collect();
        let tensor = Tensor::from_shape(&[1, self.dimension], &data)
            .map_err(|e| InferenceError::InferenceFailed(e.to_string()))?;

        let outputs = self
            .plan
            .run(tvec!(tensor.into()))
            .map_err(|e| InferenceError::InferenceFailed(e.to_string()))?;

        let output = outputs
            .first()
            .ok_or_else(|| InferenceError::InferenceFailed("model produced no output".into()))?;
        let probability = output
            .to_array_view::<f32>()
            .map_err(|e| InferenceError::InferenceFailed(e.to_string()))?
            .iter()
            .next()
            .copied()
            .ok_or_else(|| InferenceError::InferenceFailed("empty output tensor".into()))?;

        debug!("ONNX output: {}", probability);
        Ok(f64::from(probability).clamp(0.0, 1.0))
    }

    fn name(&self) -> &'static str {
        "onnx"
    }
}

/// Logistic regression stored as JSON weights
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearClassifier {
    pub weights: Vec<f64>,
    pub bias: f64,
}

impl LinearClassifier {
    pub fn new(weights: Vec<f64>, bias: f64) -> Self {
        Self { weights, bias }
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, InferenceError> {
        let path = path.as_ref();
        let bytes = fs::read(path)
            .map_err(|e| InferenceError::ModelLoadError(format!("{}: {}", path.display(), e)))?;
        let model: Self = serde_json::from_slice(&bytes)
            .map_err(|e| InferenceError::ModelLoadError(format!("{}: {}", path.display(), e)))?;
        info!(
            "Loaded linear model ({} weights) from {}",
            model.weights.len(),
            path.display()
        );
        Ok(model)
    }
}

impl Classifier for LinearClassifier {
    fn input_dimension(&self) -> usize {
        self.weights.len()
    }

    fn predict_proba(&self, input: &[f64]) -> Result<f64, InferenceError> {
        let z: f64 = self
            .weights
            .iter()
            .zip(input)
            .map(|(w, x)| w * x)
            .sum::<f64>()
            + self.bias;
        Ok(1.0 / (1.0 + (-z).exp()))
    }

    fn name(&self) -> &'static str {
        "linear"
    }
}
