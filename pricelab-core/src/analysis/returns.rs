//! Daily returns: `(close[i] - close[i-1]) / close[i-1]`.
//!
//! Day 0 has no prior close and carries no value. A zero prior close makes
//! the ratio undefined; that day carries no value and is flagged, and the
//! rest of the series is unaffected. A ratio that overflows (a subnormal
//! prior close, say) is flagged the same way. No infinities or NaNs are
//! emitted.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{Analysis, AnalysisError};
use crate::domain::Series;

/// Why a return that should exist is undefined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReturnFlag {
    ZeroPriorClose,
    NonFiniteRatio,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReturnPoint {
    pub date: NaiveDate,
    pub value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flag: Option<ReturnFlag>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnsResult {
    pub points: Vec<ReturnPoint>,
}

impl ReturnsResult {
    pub fn values(&self) -> Vec<Option<f64>> {
        self.points.iter().map(|p| p.value).collect()
    }

    pub fn get(&self, index: usize) -> Option<f64> {
        self.points.get(index).and_then(|p| p.value)
    }

    /// All defined returns, in date order.
    pub fn defined_values(&self) -> Vec<f64> {
        self.points.iter().filter_map(|p| p.value).collect()
    }

    /// Indices flagged as undefined.
    pub fn undefined_indices(&self) -> Vec<usize> {
        self.points
            .iter()
            .enumerate()
            .filter(|(_, p)| p.flag.is_some())
            .map(|(i, _)| i)
            .collect()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DailyReturns;

impl Analysis for DailyReturns {
    type Output = ReturnsResult;

    fn name(&self) -> &str {
        "daily_returns"
    }

    fn analyze(&self, series: &Series) -> Result<ReturnsResult, AnalysisError> {
        Ok(compute_daily_returns(series))
    }
}

pub fn compute_daily_returns(series: &Series) -> ReturnsResult {
    let points = series.points();
    let mut out = Vec::with_capacity(points.len());
    out.push(ReturnPoint {
        date: points[0].date,
        value: None,
        flag: None,
    });

    for w in points.windows(2) {
        let (prev, curr) = (w[0].close, w[1].close);
        let ratio = (curr - prev) / prev;
        let flag = if prev == 0.0 {
            Some(ReturnFlag::ZeroPriorClose)
        } else if !ratio.is_finite() {
            Some(ReturnFlag::NonFiniteRatio)
        } else {
            None
        };
        if let Some(flag) = flag {
            tracing::warn!(date = %w[1].date, ?flag, "daily return undefined");
        }
        out.push(ReturnPoint {
            date: w[1].date,
            value: flag.is_none().then_some(ratio),
            flag,
        });
    }

    ReturnsResult { points: out }
}
