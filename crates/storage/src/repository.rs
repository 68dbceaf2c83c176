//! Repository Implementation

use crate::StorageError;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};
use tracing::debug;

/// Prediction record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRecord {
    pub id: i64,
    pub timestamp_ms: i64,
    pub url: String,
    pub label: String,
    pub probability: f64,
}

struct PredictionLog {
    records: VecDeque<PredictionRecord>,
    next_id: i64,
}

/// Repository for served predictions (in-memory, oldest evicted first)
pub struct Repository {
    log: Mutex<PredictionLog>,
    max_records: usize,
}

impl Default for Repository {
    fn default() -> Self {
        Self::new()
    }
}

impl Repository {
    /// Create a repository holding up to 10,000 predictions
    pub fn new() -> Self {
        Self::with_capacity(10_000)
    }

    pub fn with_capacity(max_records: usize) -> Self {
        debug!("Creating in-memory prediction log (max {} records)", max_records);
        Self {
            log: Mutex::new(PredictionLog {
                records: VecDeque::with_capacity(max_records.min(1024)),
                next_id: 1,
            }),
            max_records: max_records.max(1),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, PredictionLog>, StorageError> {
        self.log
            .lock()
            .map_err(|e| StorageError::LockPoisoned(e.to_string()))
    }

    /// Insert a prediction record, assigning its ID
    pub fn insert_prediction(&self, mut record: PredictionRecord) -> Result<i64, StorageError> {
        let mut log = self.lock()?;

        record.id = log.next_id;
        log.next_id += 1;

        // Enforce retention
        while log.records.len() >= self.max_records {
            log.records.pop_front();
        }

        let id = record.id;
        log.records.push_back(record);
        debug!("Inserted prediction with ID {}", id);

        Ok(id)
    }

    /// Most recent predictions first, optionally filtered by label
    pub fn get_predictions(
        &self,
        label: Option<&str>,
        limit: usize,
    ) -> Result<Vec<PredictionRecord>, StorageError> {
        let log = self.lock()?;

        Ok(log
            .records
            .iter()
            .rev()
            .filter(|p| label.map_or(true, |l| p.label.eq_ignore_ascii_case(l)))
            .take(limit)
            .cloned()
            .collect())
    }

    /// Get total prediction count
    pub fn prediction_count(&self) -> usize {
        self.lock().map(|log| log.records.len()).unwrap_or(0)
    }
}
