//! Result Composer: joins the four engine outputs into one report.

pub mod chart;
pub mod summary;

use serde::{Deserialize, Serialize};

use crate::analysis::{MaxProfit, ReturnsResult, RunsAnalysis, SmaResult};
use crate::domain::{DatasetHash, Series};

pub use chart::{enrich, ChartTotals, EnrichedDay, RunMembership, TradeMarker};
pub use summary::{compute_summary, AnalysisSummary, DateRange, PriceRange};

/// The full analysis response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub dataset: DatasetHash,
    pub sma_window: usize,
    pub sma: SmaResult,
    pub daily_returns: ReturnsResult,
    pub runs_analysis: RunsAnalysis,
    pub max_profit: MaxProfit,
    pub chart_data: Vec<EnrichedDay>,
    pub summary: AnalysisSummary,
}

impl AnalysisReport {
    /// Totals re-derived from `chart_data`.
    pub fn chart_totals(&self) -> ChartTotals {
        ChartTotals::from_chart(&self.chart_data)
    }
}

pub fn compose(
    series: &Series,
    sma: SmaResult,
    returns: ReturnsResult,
    runs: RunsAnalysis,
    profit: MaxProfit,
) -> AnalysisReport {
    let chart_data = enrich(series, &sma, &returns, &runs, &profit);
    let summary = compute_summary(series, &returns);
    AnalysisReport {
        dataset: series.fingerprint(),
        sma_window: sma.window,
        sma,
        daily_returns: returns,
        runs_analysis: runs,
        max_profit: profit,
        chart_data,
        summary,
    }
}
