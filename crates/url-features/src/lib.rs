//! URL Feature Engine
//!
//! Turns raw, possibly malformed URL strings into the fixed 30-field numeric
//! vector the phishing classifier is trained on, and standardizes those
//! vectors before inference.

mod components;
mod error;
mod features;
mod scaler;

pub use components::UrlComponents;
pub use error::{ParseError, ScalerError};
pub use features::{
    extract_features, FeatureExtractor, FeatureKind, FeatureVector, FEATURE_DIMENSION,
    FEATURE_NAMES, SUSPICIOUS_TLDS,
};
pub use scaler::StandardScaler;
