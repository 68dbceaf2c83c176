//! Phishing Inference Engine
//!
//! Runs a pre-trained classifier over URL feature vectors using tract-onnx,
//! rejecting inputs whose shape differs from what the model was trained on.

mod classifier;
mod engine;

pub use classifier::{Classifier, LinearClassifier, OnnxClassifier};
pub use engine::{InferenceEngine, InferenceResult, ModelConfig, Prediction, Verdict};

use thiserror::Error;

/// Errors during inference
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("Model load failed: {0}")]
    ModelLoadError(String),
    #[error("Scaler load failed: {0}")]
    ScalerLoadError(String),
    #[error("Inference failed: {0}")]
    InferenceFailed(String),
    #[error("Expected {expected} features, got {actual}")]
    InvalidInputShape { expected: usize, actual: usize },
}
