//! PriceLab Runner: analysis orchestration on top of `pricelab-core`.
//!
//! This crate provides:
//! - TOML configuration with validated defaults
//! - Parallel (or sequential) execution of the four engines
//! - The single-active-dataset store with version stamps
//! - JSON and CSV artifact export

pub mod config;
pub mod export;
pub mod runner;
pub mod store;

pub use config::{AnalysisConfig, ConfigError, PricelabConfig, ValidationConfig};
pub use export::{
    export_chart_csv, export_json, export_transactions_csv, export_validation_json, import_json,
    save_artifacts,
};
pub use runner::{analyze_csv, analyze_path, analyze_series, validate, AnalysisRun, RunError};
pub use store::{DatasetStore, StoredDataset, UploadReceipt};

#[cfg(test)]
mod send_sync_checks {
    use super::*;

    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}

    #[test]
    fn config_types_are_send_sync() {
        assert_send::<PricelabConfig>();
        assert_sync::<PricelabConfig>();
        assert_send::<AnalysisConfig>();
        assert_sync::<AnalysisConfig>();
    }

    #[test]
    fn store_is_send_sync() {
        assert_send::<DatasetStore>();
        assert_sync::<DatasetStore>();
        assert_send::<StoredDataset>();
        assert_sync::<StoredDataset>();
    }

    #[test]
    fn run_outputs_are_send_sync() {
        assert_send::<AnalysisRun>();
        assert_sync::<AnalysisRun>();
        assert_send::<UploadReceipt>();
        assert_sync::<UploadReceipt>();
        assert_send::<RunError>();
        assert_sync::<RunError>();
    }
}
