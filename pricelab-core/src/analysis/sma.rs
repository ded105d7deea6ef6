//! Simple Moving Average (SMA).
//!
//! Rolling mean of close prices over a trailing window.
//! Warmup: the first `window - 1` points carry no value.

use serde::{Deserialize, Serialize};

use super::{Analysis, AnalysisError, DatedValue};
use crate::domain::{PricePoint, Series};

/// SMA output: one entry per day, `None` during warmup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SmaResult {
    pub window: usize,
    pub points: Vec<DatedValue>,
}

impl SmaResult {
    pub fn values(&self) -> Vec<Option<f64>> {
        self.points.iter().map(|p| p.value).collect()
    }

    pub fn get(&self, index: usize) -> Option<f64> {
        self.points.get(index).and_then(|p| p.value)
    }

    /// Number of days with a defined average (`N - window + 1`).
    pub fn defined_count(&self) -> usize {
        self.points.iter().filter(|p| p.value.is_some()).count()
    }
}

#[derive(Debug, Clone)]
pub struct Sma {
    window: usize,
    name: String,
}

impl Sma {
    pub fn new(window: usize) -> Self {
        Self {
            window,
            name: format!("sma_{window}"),
        }
    }

    pub fn window(&self) -> usize {
        self.window
    }
}

impl Analysis for Sma {
    type Output = SmaResult;

    fn name(&self) -> &str {
        &self.name
    }

    fn analyze(&self, series: &Series) -> Result<SmaResult, AnalysisError> {
        compute_sma(series, self.window)
    }
}

/// A running sum that shrinks below this fraction of its previous value is
/// recomputed from the window.
const RESCAN_RATIO: f64 = 1e-9;

fn window_sum(points: &[PricePoint]) -> f64 {
    points.iter().map(|p| p.close).sum()
}

/// Mean of the window given its raw sum. Falls back to summing pre-scaled
/// closes when the raw sum overflowed.
fn window_mean(sum: f64, points: &[PricePoint]) -> f64 {
    let w = points.len() as f64;
    if sum.is_finite() {
        sum / w
    } else {
        points.iter().map(|p| p.close / w).sum()
    }
}

/// Running-sum SMA over closes. O(N) regardless of window.
///
/// Fails with `InvalidWindow` unless `1 <= window <= series.len()`.
pub fn compute_sma(series: &Series, window: usize) -> Result<SmaResult, AnalysisError> {
    let n = series.len();
    if window < 1 || window > n {
        return Err(AnalysisError::InvalidWindow { window, len: n });
    }

    let points = series.points();
    let mut out: Vec<DatedValue> = points
        .iter()
        .map(|p| DatedValue {
            date: p.date,
            value: None,
        })
        .collect();

    let mut sum = window_sum(&points[..window]);
    out[window - 1].value = Some(window_mean(sum, &points[..window]));

    // Roll the window forward
    for i in window..n {
        let prev = sum;
        sum += points[i].close - points[i - window].close;
        // Overflow, or a large value leaving the window, poisons the running sum
        if !sum.is_finite() || prev.abs() * RESCAN_RATIO > sum.abs() {
            sum = window_sum(&points[i + 1 - window..=i]);
        }
        out[i].value = Some(window_mean(sum, &points[i + 1 - window..=i]));
    }

    tracing::debug!(window, defined = n - window + 1, "computed SMA");
    Ok(SmaResult {
        window,
        points: out,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{assert_approx, make_series, DEFAULT_EPSILON};

    #[test]
    fn sma_3_reference_example() {
        let series = make_series(&[10.0, 11.0, 12.0, 13.0, 14.0]);
        let result = compute_sma(&series, 3).unwrap();
        assert_eq!(result.points.len(), 5);
        assert_eq!(result.get(0), None);
        assert_eq!(result.get(1), None);
        assert_approx(result.get(2).unwrap(), 11.0, DEFAULT_EPSILON);
        assert_approx(result.get(3).unwrap(), 12.0, DEFAULT_EPSILON);
        assert_approx(result.get(4).unwrap(), 13.0, DEFAULT_EPSILON);
    }

    #[test]
    fn sma_5_basic() {
        let series = make_series(&[10.0, 11.0, 12.0, 13.0, 14.0, 15.0, 16.0]);
        let result = compute_sma(&series, 5).unwrap();
        for i in 0..4 {
            assert!(result.get(i).is_none(), "expected warmup at index {i}");
        }
        assert_approx(result.get(4).unwrap(), 12.0, DEFAULT_EPSILON);
        assert_approx(result.get(5).unwrap(), 13.0, DEFAULT_EPSILON);
        assert_approx(result.get(6).unwrap(), 14.0, DEFAULT_EPSILON);
    }

    #[test]
    fn sma_1_is_close() {
        let series = make_series(&[100.0, 200.0, 300.0]);
        let result = compute_sma(&series, 1).unwrap();
        assert_eq!(result.values(), vec![Some(100.0), Some(200.0), Some(300.0)]);
    }

    #[test]
    fn window_equal_to_length_has_one_value() {
        let series = make_series(&[2.0, 4.0, 6.0, 8.0]);
        let result = compute_sma(&series, 4).unwrap();
        assert_eq!(result.defined_count(), 1);
        assert_approx(result.get(3).unwrap(), 5.0, DEFAULT_EPSILON);
    }

    #[test]
    fn window_too_large_is_rejected() {
        let series = make_series(&[10.0, 11.0]);
        assert_eq!(
            compute_sma(&series, 3),
            Err(AnalysisError::InvalidWindow { window: 3, len: 2 })
        );
    }

    #[test]
    fn zero_window_is_rejected() {
        let series = make_series(&[10.0]);
        assert_eq!(
            compute_sma(&series, 0),
            Err(AnalysisError::InvalidWindow { window: 0, len: 1 })
        );
    }

    #[test]
    fn dates_follow_series() {
        let series = make_series(&[1.0, 2.0, 3.0]);
        let result = Sma::new(2).analyze(&series).unwrap();
        let dates: Vec<_> = result.points.iter().map(|p| p.date).collect();
        let expected: Vec<_> = series.points().iter().map(|p| p.date).collect();
        assert_eq!(dates, expected);
        assert_eq!(Sma::new(2).name(), "sma_2");
    }

    #[test]
    fn huge_closes_leaving_window_do_not_poison_later_values() {
        let start = chrono::NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let points = [1e308, 1e308, 1.0, 1.0, 1.0]
            .iter()
            .enumerate()
            .map(|(i, &close)| PricePoint {
                date: start + chrono::Duration::days(i as i64),
                open: close,
                high: close,
                low: close,
                close,
                volume: 1,
            })
            .collect();
        let series = Series::new(points).unwrap();
        let result = compute_sma(&series, 2).unwrap();

        assert!(result.values().iter().flatten().all(|v| v.is_finite()));
        assert_approx(result.get(1).unwrap() / 1e308, 1.0, DEFAULT_EPSILON);
        assert_approx(result.get(2).unwrap() / 5e307, 1.0, DEFAULT_EPSILON);
        assert_approx(result.get(3).unwrap(), 1.0, DEFAULT_EPSILON);
        assert_approx(result.get(4).unwrap(), 1.0, DEFAULT_EPSILON);
    }
}
