//! URL table to feature table

use crate::{DatasetError, Table};
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::{debug, info};
use url_features::{FeatureExtractor, FeatureVector, FEATURE_DIMENSION, FEATURE_NAMES};

/// Name of the label column in processed output
pub const LABEL_COLUMN: &str = "label";

/// Alternate label column name accepted on input
const PHISHING_COLUMN: &str = "phishing";

/// One processed row: features plus the untouched label cell
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedRow {
    pub features: FeatureVector,
    pub label: String,
}

/// Feature table in schema order followed by the label column
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProcessedTable {
    pub rows: Vec<ProcessedRow>,
}

impl ProcessedTable {
    /// Header row: feature names then `label`
    pub fn headers() -> Vec<&'static str> {
        let mut headers = Vec::with_capacity(FEATURE_DIMENSION + 1);
        headers.extend_from_slice(&FEATURE_NAMES);
        headers.push(LABEL_COLUMN);
        headers
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Write the table as CSV
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), DatasetError> {
        let mut wtr = csv::Writer::from_writer(writer);
        wtr.write_record(Self::headers())?;

        let mut record = Vec::with_capacity(FEATURE_DIMENSION + 1);
        for row in &self.rows {
            record.clear();
            record.extend((0..FEATURE_DIMENSION).map(|i| row.features.format_value(i)));
            record.push(row.label.clone());
            wtr.write_record(&record)?;
        }

        wtr.flush()?;
        Ok(())
    }

    /// Write the table to `path`, replacing it only once every row is on disk
    pub fn write_to_path(&self, path: impl AsRef<Path>) -> Result<(), DatasetError> {
        let path = path.as_ref();
        write_staged(path, |file| self.write_csv(file))?;
        debug!("Wrote {} rows to {}", self.len(), path.display());
        Ok(())
    }
}

/// Write into a temporary file next to `path` and rename it into place, so
/// a failure partway through never leaves a truncated table behind.
pub(crate) fn write_staged<F>(path: &Path, write: F) -> Result<(), DatasetError>
where
    F: FnOnce(&mut NamedTempFile) -> Result<(), DatasetError>,
{
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut staged = NamedTempFile::new_in(dir)?;
    write(&mut staged)?;
    staged.as_file().sync_all()?;
    staged.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// First column, left to right, with a value containing `http`
pub fn detect_url_column(table: &Table) -> Result<usize, DatasetError> {
    (0..table.headers().len())
        .find(|&index| table.column(index).any(|cell| cell.contains("http")))
        .ok_or_else(|| DatasetError::ColumnNotFound {
            columns: table.headers().to_vec(),
        })
}

/// `label`, else `phishing`, else the last column
pub fn detect_label_column(table: &Table) -> Result<usize, DatasetError> {
    table
        .column_index(LABEL_COLUMN)
        .or_else(|| table.column_index(PHISHING_COLUMN))
        .or_else(|| table.headers().len().checked_sub(1))
        .ok_or(DatasetError::EmptyTable)
}

/// Row-wise feature extraction over a URL table
#[derive(Debug, Clone, Default)]
pub struct Preprocessor {
    extractor: FeatureExtractor,
}

impl Preprocessor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process every row in input order.
    ///
    /// Unparsable URLs become all-zero rows, so the output always has as many
    /// rows as the input.
    pub fn process(&self, table: &Table) -> Result<ProcessedTable, DatasetError> {
        let url_column = detect_url_column(table)?;
        let label_column = detect_label_column(table)?;

        info!(
            "Extracting features from {} URLs (url column '{}', label column '{}')",
            table.len(),
            table.headers()[url_column],
            table.headers()[label_column]
        );

        let rows: Vec<ProcessedRow> = table
            .rows()
            .iter()
            .map(|row| ProcessedRow {
                features: self.extractor.extract(&row[url_column]),
                label: row[label_column].clone(),
            })
            .collect();

        let degraded = rows.iter().filter(|r| r.features.is_zero()).count();
        debug!("{} of {} rows fell back to zero features", degraded, rows.len());

        Ok(ProcessedTable { rows })
    }
}

/// Read `input`, extract features, and write `output` once the whole table
/// has been processed. Nothing is written if processing fails.
pub fn preprocess_file(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
) -> Result<ProcessedTable, DatasetError> {
    let input = input.as_ref();
    let output = output.as_ref();

    info!("Loading dataset from {}", input.display());
    let table = Table::from_path(input)?;
    let processed = Preprocessor::new().process(&table)?;

    processed.write_to_path(output)?;
    info!(
        "Preprocessing complete: {} rows x {} columns written to {}",
        processed.len(),
        FEATURE_DIMENSION + 1,
        output.display()
    );

    Ok(processed)
}
