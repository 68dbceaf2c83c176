//! Storage Layer
//!
//! Keeps a bounded history of served predictions behind a repository.

mod repository;

pub use repository::{PredictionRecord, Repository};

use thiserror::Error;

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Lock poisoned: {0}")]
    LockPoisoned(String),
}
