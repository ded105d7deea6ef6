//! The four analysis engines.
//!
//! Every engine is a pure function of an immutable [`Series`]: no hidden
//! state, no I/O, one left-to-right pass. They share no data with each
//! other, so callers may run them in any order or in parallel.

pub mod profit;
pub mod returns;
pub mod runs;
pub mod sma;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::Series;

pub use profit::{compute_max_profit, MaxProfit, MaxProfitEngine, Transaction};
pub use returns::{compute_daily_returns, DailyReturns, ReturnFlag, ReturnPoint, ReturnsResult};
pub use runs::{analyze_runs, segment_runs, Direction, Run, RunsAnalysis, RunsAnalyzer};
pub use sma::{compute_sma, Sma, SmaResult};

/// Fatal analysis errors. Per-point numeric conditions are not errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
    #[error("invalid SMA window {window}: must be between 1 and the series length ({len})")]
    InvalidWindow { window: usize, len: usize },
}

/// Trait for analysis engines.
///
/// An engine takes the full series and produces its own result type.
/// Implementations must be deterministic: the same series always yields
/// the same output.
pub trait Analysis: Send + Sync {
    type Output: Send;

    /// Human-readable name (e.g., "sma_5", "daily_returns").
    fn name(&self) -> &str;

    /// Run the engine over the entire series.
    fn analyze(&self, series: &Series) -> Result<Self::Output, AnalysisError>;
}

/// A per-day value that may be absent (warmup, no prior close, ...).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DatedValue {
    pub date: NaiveDate,
    pub value: Option<f64>,
}

/// Build a series from close prices for testing.
#[cfg(test)]
pub fn make_series(closes: &[f64]) -> Series {
    let start = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    Series::from_closes(start, closes).unwrap()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for engine tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
