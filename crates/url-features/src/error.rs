//! Feature Engine Error Types

use thiserror::Error;

/// Structural URL failures that force the all-zero feature vector
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Unbalanced brackets or a bracketed host that is not IPv6/IPvFuture
    #[error("Invalid IPv6 URL: {0}")]
    InvalidIpv6(String),

    /// Non-ASCII authority whose NFKC form contains `/`, `?`, `#`, `@` or `:`
    #[error("netloc {0:?} contains invalid characters under NFKC normalization")]
    InvalidNetloc(String),

    /// Port is not ASCII digits or lies outside 0-65535
    #[error("Port could not be cast to integer value as {0:?}")]
    InvalidPort(String),
}

/// Errors raised by the feature scaler
#[derive(Debug, Error)]
pub enum ScalerError {
    #[error("Scaler dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Cannot fit scaler on an empty dataset")]
    EmptyDataset,

    #[error("Scaler I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Scaler serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
