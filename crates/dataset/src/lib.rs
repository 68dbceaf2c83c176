//! Dataset Preprocessing
//!
//! Reads raw URL/label tables, maps every URL through the feature extractor
//! and prepares the per-client slices that federated participants train on.

mod error;
mod partition;
mod preprocessor;
mod table;

pub use error::DatasetError;
pub use partition::{partition_range, LabeledDataset};
pub use preprocessor::{
    detect_label_column, detect_url_column, preprocess_file, ProcessedRow, ProcessedTable,
    Preprocessor, LABEL_COLUMN,
};
pub use table::Table;
