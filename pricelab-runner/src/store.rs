//! Single active dataset, replaced wholesale on every upload.
//!
//! Parsing happens before the lock is taken; the write lock only swaps the
//! `Arc`. Readers clone the `Arc` under a short read lock and work without
//! holding it, so they always see one complete dataset, never a partial one.

use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use pricelab_core::composer::{AnalysisReport, DateRange};
use pricelab_core::data::SeriesLoader;
use pricelab_core::domain::{DatasetHash, Series};

use crate::config::AnalysisConfig;
use crate::runner::{analyze_series, RunError};

/// A loaded dataset plus its identity.
#[derive(Debug, Clone)]
pub struct StoredDataset {
    /// Increases by one with every successful upload.
    pub version: u64,
    pub fingerprint: DatasetHash,
    pub series: Series,
    pub columns: Vec<String>,
    pub warnings: Vec<String>,
    pub reordered: bool,
    pub uploaded_at: DateTime<Utc>,
}

impl StoredDataset {
    pub fn receipt(&self) -> UploadReceipt {
        let (start, end) = self.series.date_range();
        UploadReceipt {
            version: self.version,
            fingerprint: self.fingerprint.clone(),
            rows: self.series.len(),
            columns: self.columns.clone(),
            date_range: DateRange { start, end },
            warnings: self.warnings.clone(),
            reordered: self.reordered,
        }
    }
}

/// Acknowledgement returned for an upload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadReceipt {
    pub version: u64,
    pub fingerprint: DatasetHash,
    pub rows: usize,
    pub columns: Vec<String>,
    pub date_range: DateRange,
    pub warnings: Vec<String>,
    pub reordered: bool,
}

#[derive(Debug, Default)]
struct Slot {
    last_version: u64,
    current: Option<Arc<StoredDataset>>,
}

#[derive(Debug, Default)]
pub struct DatasetStore {
    slot: RwLock<Slot>,
}

impl DatasetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `text` and make it the active dataset.
    ///
    /// A failed parse leaves the previous dataset in place.
    pub fn upload(&self, text: &str) -> Result<UploadReceipt, RunError> {
        let loaded = SeriesLoader::new().load(text)?;
        let fingerprint = loaded.series.fingerprint();

        let mut slot = self.slot.write().unwrap_or_else(PoisonError::into_inner);
        slot.last_version += 1;
        let dataset = Arc::new(StoredDataset {
            version: slot.last_version,
            fingerprint,
            series: loaded.series,
            columns: loaded.columns,
            warnings: loaded.warnings,
            reordered: loaded.reordered,
            uploaded_at: Utc::now(),
        });
        slot.current = Some(Arc::clone(&dataset));
        drop(slot);

        tracing::info!(
            version = dataset.version,
            fingerprint = %dataset.fingerprint.short(),
            rows = dataset.series.len(),
            "dataset uploaded"
        );
        Ok(dataset.receipt())
    }

    /// The active dataset, if any.
    pub fn current(&self) -> Option<Arc<StoredDataset>> {
        self.slot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .current
            .clone()
    }

    pub fn version(&self) -> Option<u64> {
        self.current().map(|d| d.version)
    }

    /// Analyze the active dataset without holding the lock.
    pub fn analyze_current(&self, config: &AnalysisConfig) -> Result<AnalysisReport, RunError> {
        let dataset = self.current().ok_or(RunError::NoDataset)?;
        analyze_series(&dataset.series, config)
    }

    pub fn clear(&self) {
        self.slot.write().unwrap_or_else(PoisonError::into_inner).current = None;
    }
}
