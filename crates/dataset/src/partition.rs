//! Per-client slices of a processed dataset
//!
//! Each federated participant trains on a contiguous slice of the processed
//! table. Slices are equal-sized except the last, which also takes the
//! remainder, so every row belongs to exactly one client.

use crate::preprocessor::write_staged;
use crate::{DatasetError, Table};
use std::ops::Range;
use std::path::Path;
use tracing::info;
use url_features::StandardScaler;

/// Row range owned by `client_id` out of `total_clients`
pub fn partition_range(
    rows: usize,
    client_id: usize,
    total_clients: usize,
) -> Result<Range<usize>, DatasetError> {
    if total_clients == 0 || client_id >= total_clients {
        return Err(DatasetError::InvalidPartition {
            client_id,
            total_clients,
        });
    }

    let per_client = rows / total_clients;
    let start = client_id * per_client;
    let end = if client_id + 1 < total_clients {
        start + per_client
    } else {
        rows
    };
    Ok(start..end)
}

/// Numeric features with binary labels, read back from a processed table
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LabeledDataset {
    pub feature_names: Vec<String>,
    pub features: Vec<Vec<f64>>,
    /// 1 when the source label equals 1, otherwise 0
    pub labels: Vec<u8>,
}

impl LabeledDataset {
    /// Every column but the last is a feature; the last is the label
    pub fn from_table(table: &Table) -> Result<Self, DatasetError> {
        let width = table.headers().len();
        if width == 0 {
            return Err(DatasetError::EmptyTable);
        }
        let feature_names = table.headers()[..width - 1].to_vec();

        let mut features = Vec::with_capacity(table.len());
        let mut labels = Vec::with_capacity(table.len());
        for (row_idx, row) in table.rows().iter().enumerate() {
            let values = row[..width - 1]
                .iter()
                .zip(&feature_names)
                .map(|(cell, column)| {
                    cell.trim().parse::<f64>().map_err(|_| DatasetError::InvalidFeature {
                        row: row_idx,
                        column: column.clone(),
                        value: cell.clone(),
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            features.push(values);
            labels.push(binarize(&row[width - 1]));
        }

        Ok(Self {
            feature_names,
            features,
            labels,
        })
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, DatasetError> {
        Self::from_table(&Table::from_path(path)?)
    }

    /// Load only the slice belonging to one client
    pub fn load_partition(
        path: impl AsRef<Path>,
        client_id: usize,
        total_clients: usize,
    ) -> Result<Self, DatasetError> {
        let dataset = Self::load(path)?;
        let part = dataset.partition(client_id, total_clients)?;
        info!(
            "Client {} of {} holds {} of {} rows",
            client_id,
            total_clients,
            part.len(),
            dataset.len()
        );
        Ok(part)
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn partition(&self, client_id: usize, total_clients: usize) -> Result<Self, DatasetError> {
        let range = partition_range(self.len(), client_id, total_clients)?;
        Ok(Self {
            feature_names: self.feature_names.clone(),
            features: self.features[range.clone()].to_vec(),
            labels: self.labels[range].to_vec(),
        })
    }

    /// Fit a scaler on this dataset's features
    pub fn fit_scaler(&self) -> Result<StandardScaler, url_features::ScalerError> {
        StandardScaler::fit(&self.features)
    }

    /// Number of rows labeled 1
    pub fn positives(&self) -> usize {
        self.labels.iter().filter(|&&l| l == 1).count()
    }

    /// Write back as CSV with the label column last
    pub fn write_to_path(&self, path: impl AsRef<Path>) -> Result<(), DatasetError> {
        write_staged(path.as_ref(), |file| {
            let mut wtr = csv::Writer::from_writer(file);
            let mut header: Vec<&str> = self.feature_names.iter().map(String::as_str).collect();
            header.push(crate::LABEL_COLUMN);
            wtr.write_record(&header)?;

            for (values, label) in self.features.iter().zip(&self.labels) {
                let mut record: Vec<String> = values.iter().map(|v| v.to_string()).collect();
                record.push(label.to_string());
                wtr.write_record(&record)?;
            }
            wtr.flush()?;
            Ok(())
        })
    }
}

fn binarize(label: &str) -> u8 {
    match label.trim().parse::<f64>() {
        Ok(value) if value == 1.0 => 1,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_last_client_takes_remainder() {
        assert_eq!(partition_range(10, 0, 3).unwrap(), 0..3);
        assert_eq!(partition_range(10, 1, 3).unwrap(), 3..6);
        assert_eq!(partition_range(10, 2, 3).unwrap(), 6..10);
    }

    #[test]
    fn test_invalid_partition() {
        assert!(partition_range(10, 3, 3).is_err());
        assert!(partition_range(10, 0, 0).is_err());
    }

    #[test]
    fn test_fewer_rows_than_clients() {
        assert_eq!(partition_range(2, 0, 3).unwrap(), 0..0);
        assert_eq!(partition_range(2, 2, 3).unwrap(), 0..2);
    }

    #[test]
    fn test_labels_are_binarized() {
        let table = Table::from_reader("a,b,label\n1,2.5,1\n3,4,0\n5,6,-1\n7,8,1.0\n".as_bytes())
            .unwrap();
        let dataset = LabeledDataset::from_table(&table).unwrap();
        assert_eq!(dataset.labels, vec![1, 0, 0, 1]);
        assert_eq!(dataset.features[0], vec![1.0, 2.5]);
        assert_eq!(dataset.positives(), 2);
    }

    #[test]
    fn test_non_numeric_feature_is_rejected() {
        let table = Table::from_reader("a,label\nx,1\n".as_bytes()).unwrap();
        assert!(matches!(
            LabeledDataset::from_table(&table),
            Err(DatasetError::InvalidFeature { row: 0, .. })
        ));
    }

    proptest! {
        #[test]
        fn prop_partitions_cover_every_row(rows in 0usize..500, total in 1usize..12) {
            let mut next = 0;
            for client in 0..total {
                let range = partition_range(rows, client, total).unwrap();
                prop_assert_eq!(range.start, next);
                next = range.end;
            }
            prop_assert_eq!(next, rows);
        }
    }
}
