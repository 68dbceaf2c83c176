//! In-memory CSV table

use crate::DatasetError;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// Header plus string cells, every row padded to the header width
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Build a table from headers and rows, padding or truncating rows to fit
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let width = headers.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, String::new());
                row
            })
            .collect();
        Self { headers, rows }
    }

    /// Read CSV with a header row.
    ///
    /// Ragged rows are tolerated and invalid UTF-8 is replaced rather than
    /// rejected, so one bad cell never drops a row.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, DatasetError> {
        let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(reader);

        let headers: Vec<String> = rdr
            .byte_headers()?
            .iter()
            .map(|field| String::from_utf8_lossy(field).into_owned())
            .collect();

        let mut rows = Vec::new();
        for record in rdr.byte_records() {
            let record = record?;
            rows.push(
                record
                    .iter()
                    .map(|field| String::from_utf8_lossy(field).into_owned())
                    .collect(),
            );
        }

        debug!("Read table with {} columns and {} rows", headers.len(), rows.len());
        Ok(Self::new(headers, rows))
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, DatasetError> {
        Self::from_reader(File::open(path)?)
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of the first column named `name`
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Cells of column `index`, in row order
    pub fn column(&self, index: usize) -> impl Iterator<Item = &str> {
        self.rows.iter().map(move |row| row[index].as_str())
    }
}
