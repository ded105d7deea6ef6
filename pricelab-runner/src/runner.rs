//! Analysis runner: series in, composed report out.
//!
//! The four engines share nothing but the immutable series, so the parallel
//! path fans them out with nested `rayon::join` and joins before composing.
//! Sequential and parallel runs produce identical reports.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use pricelab_core::analysis::{
    analyze_runs, compute_daily_returns, compute_max_profit, compute_sma, AnalysisError,
};
use pricelab_core::composer::{compose, AnalysisReport};
use pricelab_core::data::{LoadError, LoadedSeries, SeriesLoader};
use pricelab_core::domain::Series;
use pricelab_core::validation::{run_validation_with, ValidationReport};

use crate::config::{AnalysisConfig, ConfigError, ValidationConfig};

/// Errors from the runner.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("load error: {0}")]
    Load(#[from] LoadError),
    #[error("analysis error: {0}")]
    Analysis(#[from] AnalysisError),
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("no dataset has been uploaded")]
    NoDataset,
}

/// A report plus what the loader noticed about the input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisRun {
    pub report: AnalysisReport,
    pub warnings: Vec<String>,
    pub reordered: bool,
}

/// Run all four engines over `series` and compose the report.
pub fn analyze_series(series: &Series, config: &AnalysisConfig) -> Result<AnalysisReport, RunError> {
    config.validate()?;
    let window = config.sma_window;

    let (sma, returns, runs, profit) = if config.parallel {
        let ((sma, returns), (runs, profit)) = rayon::join(
            || rayon::join(|| compute_sma(series, window), || compute_daily_returns(series)),
            || rayon::join(|| analyze_runs(series), || compute_max_profit(series)),
        );
        (sma, returns, runs, profit)
    } else {
        (
            compute_sma(series, window),
            compute_daily_returns(series),
            analyze_runs(series),
            compute_max_profit(series),
        )
    };

    let report = compose(series, sma?, returns, runs, profit);
    tracing::info!(
        dataset = %report.dataset.short(),
        days = report.summary.total_days,
        sma_window = window,
        parallel = config.parallel,
        "analysis complete"
    );
    Ok(report)
}

/// Load CSV text and analyze it.
pub fn analyze_csv(text: &str, config: &AnalysisConfig) -> Result<AnalysisRun, RunError> {
    let loaded = SeriesLoader::new().load(text)?;
    analyze_loaded(loaded, config)
}

/// Load a CSV file and analyze it.
pub fn analyze_path(path: &Path, config: &AnalysisConfig) -> Result<AnalysisRun, RunError> {
    let loaded = SeriesLoader::new().load_path(path)?;
    analyze_loaded(loaded, config)
}

fn analyze_loaded(loaded: LoadedSeries, config: &AnalysisConfig) -> Result<AnalysisRun, RunError> {
    let report = analyze_series(&loaded.series, config)?;
    Ok(AnalysisRun {
        report,
        warnings: loaded.warnings,
        reordered: loaded.reordered,
    })
}

/// Run the validation harness with a configured tolerance.
pub fn validate(config: &ValidationConfig) -> Result<ValidationReport, RunError> {
    config.validate()?;
    Ok(run_validation_with(config.tolerance))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn series(closes: &[f64]) -> Series {
        Series::from_closes(NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(), closes).unwrap()
    }

    #[test]
    fn parallel_and_sequential_agree() {
        let s = series(&[3.0, 1.0, 4.0, 1.0, 5.0, 9.0, 2.0, 6.0, 5.0, 3.0, 5.0]);
        let parallel = analyze_series(&s, &AnalysisConfig::with_window(3)).unwrap();
        let sequential = analyze_series(
            &s,
            &AnalysisConfig {
                sma_window: 3,
                parallel: false,
            },
        )
        .unwrap();
        assert_eq!(parallel, sequential);
    }

    #[test]
    fn window_outside_config_range_is_config_error() {
        let s = series(&[1.0, 2.0]);
        let err = analyze_series(&s, &AnalysisConfig::with_window(0)).unwrap_err();
        assert!(matches!(err, RunError::Config(ConfigError::WindowOutOfRange { .. })));
    }

    #[test]
    fn window_longer_than_series_is_analysis_error() {
        let s = series(&[1.0, 2.0, 3.0]);
        let err = analyze_series(&s, &AnalysisConfig::with_window(5)).unwrap_err();
        assert!(matches!(
            err,
            RunError::Analysis(AnalysisError::InvalidWindow { window: 5, len: 3 })
        ));
    }

    #[test]
    fn csv_warnings_are_carried() {
        let text = "date,open,high,low,close,volume\n\
                    2023-01-03,10,9,11,10,100\n\
                    2023-01-02,10,11,9,10,100\n";
        let run = analyze_csv(text, &AnalysisConfig::with_window(1)).unwrap();
        assert!(run.reordered);
        assert_eq!(run.warnings.len(), 1);
        assert_eq!(run.report.summary.total_days, 2);
    }

    #[test]
    fn validate_rejects_bad_tolerance() {
        let err = validate(&ValidationConfig { tolerance: f64::NAN }).unwrap_err();
        assert!(matches!(err, RunError::Config(ConfigError::InvalidTolerance(_))));
        assert!(validate(&ValidationConfig::default()).unwrap().all_passed());
    }
}
