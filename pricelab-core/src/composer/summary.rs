//! Dataset-level summary statistics.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::analysis::ReturnsResult;
use crate::domain::Series;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceRange {
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSummary {
    pub total_days: usize,
    pub date_range: DateRange,
    /// Over closing prices.
    pub price_range: PriceRange,
    pub avg_volume: f64,
    /// Population standard deviation of the defined daily returns.
    pub volatility: Option<f64>,
}

pub fn compute_summary(series: &Series, returns: &ReturnsResult) -> AnalysisSummary {
    let (start, end) = series.date_range();
    let closes = series.closes();
    let (min, max) = closes
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &c| {
            (lo.min(c), hi.max(c))
        });
    let volumes: Vec<f64> = series.points().iter().map(|p| p.volume as f64).collect();

    AnalysisSummary {
        total_days: series.len(),
        date_range: DateRange { start, end },
        price_range: PriceRange { min, max },
        avg_volume: mean_f64(&volumes),
        volatility: population_std_dev(&returns.defined_values()),
    }
}

pub(crate) fn mean_f64(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Divides by `n`, not `n - 1`. `None` for an empty slice.
pub(crate) fn population_std_dev(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mean = mean_f64(values);
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
    Some(variance.sqrt())
}
