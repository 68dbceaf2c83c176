//! Dataset Error Types

use thiserror::Error;

/// Errors during dataset preprocessing
#[derive(Debug, Error)]
pub enum DatasetError {
    /// No column holds a value containing `http`
    #[error("Could not find URL column in dataset (columns: {columns:?})")]
    ColumnNotFound { columns: Vec<String> },

    /// Table has no columns at all
    #[error("Dataset has no columns")]
    EmptyTable,

    /// Invalid client slice request
    #[error("Invalid partition: client {client_id} of {total_clients}")]
    InvalidPartition { client_id: usize, total_clients: usize },

    /// Non-numeric cell in a processed feature table
    #[error("Invalid feature value {value:?} at row {row}, column {column}")]
    InvalidFeature {
        row: usize,
        column: String,
        value: String,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
