//! PriceLab Core: daily OHLCV series analysis.
//!
//! This crate contains everything that is a pure function of a price series:
//! - Domain types (price points, the validated series, dataset fingerprints)
//! - CSV loading and writing, plus seeded synthetic series
//! - The four analysis engines (SMA, daily returns, runs, max profit)
//! - The result composer with per-day chart records and summary statistics
//! - The validation harness with hand-computed fixtures

pub mod analysis;
pub mod composer;
pub mod data;
pub mod domain;
pub mod validation;

pub use analysis::{
    analyze_runs, compute_daily_returns, compute_max_profit, compute_sma, AnalysisError,
};
pub use composer::{compose, AnalysisReport};
pub use data::{load_series, LoadError, SeriesLoader};
pub use domain::{DatasetHash, PricePoint, Series};
pub use validation::{run_validation, run_validation_with, ValidationReport};
