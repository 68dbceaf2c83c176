//! Z-score standardization of feature vectors

use crate::error::ScalerError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Per-feature standardization fitted on a training table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    /// Column means
    pub mean: Vec<f64>,
    /// Column standard deviations (population), 1.0 for constant columns
    pub scale: Vec<f64>,
}

impl StandardScaler {
    /// Fit on rows of equal width
    pub fn fit<R: AsRef<[f64]>>(rows: &[R]) -> Result<Self, ScalerError> {
        let first = rows.first().ok_or(ScalerError::EmptyDataset)?;
        let width = first.as_ref().len();
        let n = rows.len() as f64;

        let mut mean = vec![0.0; width];
        for row in rows {
            let row = row.as_ref();
            if row.len() != width {
                return Err(ScalerError::DimensionMismatch {
                    expected: width,
                    actual: row.len(),
                });
            }
            for (m, v) in mean.iter_mut().zip(row) {
                *m += v;
            }
        }
        mean.iter_mut().for_each(|m| *m /= n);

        let mut variance = vec![0.0; width];
        for row in rows {
            for ((acc, v), m) in variance.iter_mut().zip(row.as_ref()).zip(&mean) {
                let d = v - m;
                *acc += d * d;
            }
        }

        let scale = variance
            .into_iter()
            .map(|var| {
                let std_dev = (var / n).sqrt();
                if std_dev > 0.0 { std_dev } else { 1.0 }
            })
            .collect();

        debug!("Fitted scaler on {} rows x {} columns", rows.len(), width);
        Ok(Self { mean, scale })
    }

    /// Number of features this scaler expects
    pub fn dimension(&self) -> usize {
        self.mean.len()
    }

    /// Standardize a single row
    pub fn transform(&self, row: &[f64]) -> Result<Vec<f64>, ScalerError> {
        if row.len() != self.dimension() {
            return Err(ScalerError::DimensionMismatch {
                expected: self.dimension(),
                actual: row.len(),
            });
        }
        Ok(row
            .iter()
            .zip(&self.mean)
            .zip(&self.scale)
            .map(|((v, m), s)| (v - m) / s)
            .collect())
    }

    /// Load a scaler saved with [`StandardScaler::save`]
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ScalerError> {
        let path = path.as_ref();
        let scaler: Self = serde_json::from_slice(&fs::read(path)?)?;
        if scaler.mean.len() != scaler.scale.len() {
            return Err(ScalerError::DimensionMismatch {
                expected: scaler.mean.len(),
                actual: scaler.scale.len(),
            });
        }
        info!("Loaded scaler ({} features) from {}", scaler.dimension(), path.display());
        Ok(scaler)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ScalerError> {
        fs::write(path, serde_json::to_vec_pretty(self)?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_mean_and_scale() {
        let rows = vec![vec![1.0, 5.0], vec![3.0, 5.0]];
        let scaler = StandardScaler::fit(&rows).unwrap();
        assert_eq!(scaler.mean, vec![2.0, 5.0]);
        // Constant column falls back to unit scale
        assert_eq!(scaler.scale, vec![1.0, 1.0]);
    }

    #[test]
    fn test_transformed_columns_are_centered() {
        let rows = vec![vec![2.0, 10.0], vec![4.0, 20.0], vec![9.0, 60.0]];
        let scaler = StandardScaler::fit(&rows).unwrap();
        let transformed: Vec<Vec<f64>> = rows
            .iter()
            .map(|r| scaler.transform(r).unwrap())
            .collect();
        for col in 0..2 {
            let mean: f64 = transformed.iter().map(|r| r[col]).sum::<f64>() / 3.0;
            assert!(mean.abs() < 1e-9);
        }
    }

    #[test]
    fn test_dimension_mismatch() {
        let scaler = StandardScaler::fit(&[vec![1.0, 2.0]]).unwrap();
        assert!(matches!(
            scaler.transform(&[1.0]),
            Err(ScalerError::DimensionMismatch { expected: 2, actual: 1 })
        ));
        assert!(StandardScaler::fit(&[vec![1.0], vec![1.0, 2.0]]).is_err());
    }

    #[test]
    fn test_empty_dataset() {
        let rows: Vec<Vec<f64>> = vec![];
        assert!(matches!(StandardScaler::fit(&rows), Err(ScalerError::EmptyDataset)));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scaler.json");
        let scaler = StandardScaler::fit(&[vec![1.0, 2.0], vec![3.0, 6.0]]).unwrap();
        scaler.save(&path).unwrap();
        assert_eq!(StandardScaler::load(&path).unwrap(), scaler);
    }
}
